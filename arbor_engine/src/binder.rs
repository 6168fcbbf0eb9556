mod core;
mod piped;
mod result;

pub(crate) use self::core::*;
pub use result::*;
