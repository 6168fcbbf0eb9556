mod argument;
mod command;
mod convert;
mod core;
mod settings;
mod value;

pub use self::core::*;
pub use argument::{Argument, ArgumentGroup, ArgumentNode};
pub use command::*;
pub use convert::*;
pub use settings::*;
pub use value::*;

pub(crate) use argument::FlatArgument;
pub(crate) use convert::parse_bool;
