mod abi;
pub mod config;
mod decode;
mod error;
mod event;
mod params;
mod types;
mod values;

pub use abi::*;
pub use decode::*;
pub use error::*;
pub use event::*;
pub use params::*;
pub use types::*;
pub use values::*;
