//! Engine module for `arbor`.
//! See [documentation root](https://docs.rs/arbor/latest/arbor/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod binder;
mod constant;
mod model;
mod pipeline;
#[allow(missing_docs)]
pub mod prelude;
mod tokens;

pub use api::*;
pub use binder::{Binding, ParseResult, PipedTarget, ValueSource};
pub use constant::{EXIT_PARSE_ERROR, EXIT_SUCCESS, EXIT_VALIDATION_ERROR};
pub use model::*;
pub use pipeline::*;
pub use tokens::{Directive, Token, TokenStream};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            match (&$base, &$sub) {
                (base, sub) => assert!(
                    base.contains(*sub),
                    "'{b}' does not contain '{s}'",
                    b = base,
                    s = sub,
                ),
            }
        };
    }

    pub(crate) use assert_contains;
}
