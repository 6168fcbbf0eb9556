//! `arbor` is a command tree framework for Rust.
//!
//! An application is a tree of [`Command`]s.
//! Each command declares options (`--name`/`-n`) and operands (positional), may carry an *interceptor* wrapping itself
//! and every sub-command, and may carry a *target*: the body executed when the command line resolves to it.
//! `arbor` takes care of the rest:
//! * *Tokenizing*: long and short options, clubbed flags (`-xyz`), inline values (`--name=value`, `-n:value`),
//! the `--` separator, directives (`[parse]`), response files (`@args.rsp`) and typo suggestions.
//! * *Binding*: operand assignment in declaration order (interleaved with options), trailing collections,
//! nested argument groups, defaults, arity enforcement and type conversion, with every validation error reported together.
//! * *Piped input*: lines read from standard input are appended to one collection argument, lazily, and with
//! cooperative cancellation.
//! * *Running*: a fixed sequence of stages (tokenize, bind, pre-invoke, invoke, post-invoke) open to middleware,
//! and an "onion" of interceptors around the target.
//!
//! We do not aim to support rich help formatting, shell completions, or declaring commands by reflection.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/calculator.rs")]
//! ```
//!
//! ```console
//! $ calculator add 2 3
//! 5
//!
//! $ calculator -p divide 7 2
//! 3.5
//!
//! $ calculator ad 2 3
//! Parse error: Unrecognized command or argument 'ad'.  Did you mean 'add'?
//! ad 2 3
//! ^
//!
//! $ calculator add two 3
//! Validation error: Argument 'x': cannot convert 'two' to Integer.
//! ```
//!
//! # Commands
//! Configure a [`Command`] by `add`ing [`Argument`]s (or [`ArgumentGroup`]s) and `subcommand`s.
//! Every argument has a [`ValueType`]: a scalar type (booleans, integers, floats, characters, text, enumerations,
//! or a custom type registered with [`AppRunner::converter`]) in one of three shapes: scalar, nullable or collection.
//!
//! The [`Arity`] of an argument follows from its declaration:
//! a scalar without a default is required, everything else is not.
//! Collection operands must come last, and receive every remaining operand.
//!
//! Options marked [`Argument::assign_to_executable_subcommands`] are recognised after descending into sub-commands,
//! but are only visible to the target; interceptors above it never see them.
//!
//! # Running
//! [`AppRunner`] validates the command tree and builds an [`App`].
//! [`App::run`] reads the process arguments (and standard input, when piped) and returns the exit code:
//! * `0` on success, or the code the target returned.
//! * `1` on a parse (or configuration) error, reported with the offending argument.
//! * `2` on validation errors.
//!
//! Faults raised by interceptors or targets are returned as `Err`.
//!
//! ```no_run
#![doc = include_str!("../demos/git_like.rs")]
//! ```
//!
//! # Piped input
//! ```no_run
#![doc = include_str!("../demos/piped_sum.rs")]
//! ```
//!
//! ```console
//! $ seq 1 4 | summer 10
//! Sum: 20
//! ```
pub use arbor_engine::*;
