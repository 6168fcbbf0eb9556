mod model;
mod scope;
mod tokenizer;

pub use model::*;
pub(crate) use scope::*;
pub(crate) use tokenizer::*;
