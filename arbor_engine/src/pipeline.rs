mod base;
mod context;
mod interface;
mod invocation;
mod middleware;
mod response;
mod usage;

pub use self::base::*;
pub use self::context::*;
pub use self::interface::*;
pub use self::invocation::{ArgumentError, Continuation, Invocation, ValueStream};
pub use self::middleware::{App, MiddlewareHandler, Next, Stage};

pub(crate) use self::middleware::Middleware;
