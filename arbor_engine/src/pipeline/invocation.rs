use std::cell::RefCell;

use thiserror::Error;

use crate::api::{
    Command, ConvertError, ConverterRegistry, Interceptor, Outcome, ScalarType, Target, Value,
};
use crate::binder::{Binding, ParseResult};
use crate::pipeline::{
    CancellationToken, CommandError, ParseError, PipedLines, Services, UserInterface,
};
use crate::prelude::FromValue;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A value could not be extracted from an [`Invocation`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// No visible argument has this name.
    #[error("Unknown argument '{name}' for command '{command}'.")]
    Unknown {
        /// The requested name.
        name: String,
        /// The command invoked.
        command: String,
    },

    /// The bound value does not fit the requested Rust type.
    #[error("Argument '{name}' holds '{value}', which does not fit the requested type.")]
    Mismatch {
        /// The argument name.
        name: String,
        /// The bound value.
        value: String,
    },

    /// The argument was not bound and the requested type has no absent form.
    #[error("Argument '{name}' has no value.")]
    Absent {
        /// The argument name.
        name: String,
    },
}

/// Everything an invocation shares with the rest of its run.
pub(crate) struct Session<'s> {
    pub(crate) result: &'s ParseResult<'s>,
    pub(crate) registry: &'s ConverterRegistry,
    pub(crate) cancellation: &'s CancellationToken,
    pub(crate) services: &'s Services,
    pub(crate) console: &'s dyn UserInterface,
    pub(crate) piped: &'s RefCell<Option<PipedLines>>,
}

/// The view an interceptor or target has of the run.
///
/// A target sees its own arguments plus its ancestors' options assigned to executable sub-commands.
/// An interceptor above the target sees only its own command's arguments, minus those options.
pub struct Invocation<'s> {
    session: &'s Session<'s>,
    command: &'s Command,
    level: usize,
}

impl<'s> Invocation<'s> {
    fn new(session: &'s Session<'s>, command: &'s Command, level: usize) -> Self {
        Self {
            session,
            command,
            level,
        }
    }

    /// The command this handler is declared on.
    pub fn command(&self) -> &'s Command {
        self.command
    }

    /// Whether this is the target command's invocation.
    pub fn is_target(&self) -> bool {
        self.level == self.session.result.target_level()
    }

    /// The visible bindings.
    pub fn arguments(&self) -> Vec<&'s Binding<'s>> {
        self.visible().into_iter().map(|(_, binding)| binding).collect()
    }

    /// The visible binding named `name`.
    pub fn binding(&self, name: &str) -> Option<&'s Binding<'s>> {
        self.lookup(name).map(|(_, binding)| binding)
    }

    /// The explicit, default or implicit value bound to `name` (piped lines excluded).
    pub fn get(&self, name: &str) -> Option<&'s Value> {
        self.binding(name).and_then(Binding::value)
    }

    /// Extract the value bound to `name` as a `T`.
    ///
    /// For the piped input target, this drains the piped lines into the collection.
    pub fn value<T: FromValue>(&self, name: &str) -> Result<T, CommandError> {
        let (level, binding) = self.require(name)?;

        if self.is_piped_target(level, binding) {
            let values = self.values(name)?;
            let value = Value::List(values);
            return T::from_value(&value).ok_or_else(|| mismatch(name, &value));
        }

        match binding.value() {
            Some(value) => T::from_value(value).ok_or_else(|| mismatch(name, value)),
            None => T::absent().ok_or_else(|| {
                ArgumentError::Absent {
                    name: name.to_string(),
                }
                .into()
            }),
        }
    }

    /// Every value of `name`, piped lines included.
    pub fn values(&self, name: &str) -> Result<Vec<Value>, CommandError> {
        let values = self.stream(name)?.collect::<Result<Vec<Value>, ConvertError>>()?;
        Ok(values)
    }

    /// Lazily yield the values of `name`: explicit values first, then (for the piped target) each piped line.
    ///
    /// Piped lines are converted one at a time, and the stream ends early once the run is cancelled.
    /// The piped source is consumed at most once per run.
    pub fn stream(&self, name: &str) -> Result<ValueStream<'s>, CommandError> {
        let (level, binding) = self.require(name)?;
        let explicit = match binding.value() {
            Some(Value::List(items)) => items.clone(),
            Some(value) => vec![value.clone()],
            None => Vec::default(),
        };
        let piped = if self.is_piped_target(level, binding) {
            self.session.piped.borrow_mut().take()
        } else {
            None
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Streaming '{name}' with {} explicit values (piped: {}).",
                explicit.len(),
                piped.is_some()
            );
        }

        Ok(ValueStream {
            explicit: explicit.into_iter(),
            piped,
            scalar: binding.argument().value_type().scalar(),
            registry: self.session.registry,
            cancellation: self.session.cancellation,
        })
    }

    /// Operand tokens tolerated beyond the declared operands.
    pub fn remaining_operands(&self) -> &'s [String] {
        self.session.result.remaining_operands()
    }

    /// Tokens following the `--` separator, verbatim.
    pub fn separated_arguments(&self) -> &'s [String] {
        self.session.result.separated_arguments()
    }

    /// The run's cancellation signal.
    pub fn cancellation(&self) -> &'s CancellationToken {
        self.session.cancellation
    }

    /// The run's ambient services.
    pub fn services(&self) -> &'s Services {
        self.session.services
    }

    /// The console of the run.
    pub fn console(&self) -> &'s dyn UserInterface {
        self.session.console
    }

    /// The whole bound command line.
    pub fn parse_result(&self) -> &'s ParseResult<'s> {
        self.session.result
    }

    fn visible(&self) -> Vec<(usize, &'s Binding<'s>)> {
        let result = self.session.result;
        let target_view = self.is_target();
        let mut visible: Vec<(usize, &'s Binding<'s>)> = result
            .bindings(self.level)
            .iter()
            .filter(|binding| target_view || !binding.argument().is_subcommands_only())
            .map(|binding| (self.level, binding))
            .collect();

        if target_view {
            for level in (0..self.level).rev() {
                visible.extend(
                    result
                        .bindings(level)
                        .iter()
                        .filter(|binding| binding.argument().is_subcommands_only())
                        .map(|binding| (level, binding)),
                );
            }
        }

        visible
    }

    fn lookup(&self, name: &str) -> Option<(usize, &'s Binding<'s>)> {
        self.visible()
            .into_iter()
            .find(|(_, binding)| binding.argument().name() == name)
    }

    fn require(&self, name: &str) -> Result<(usize, &'s Binding<'s>), ArgumentError> {
        self.lookup(name).ok_or_else(|| ArgumentError::Unknown {
            name: name.to_string(),
            command: self.command.name().to_string(),
        })
    }

    fn is_piped_target(&self, level: usize, binding: &Binding<'_>) -> bool {
        match self.session.result.piped_target() {
            Some(target) => target.level() == level && target.name() == binding.argument().name(),
            None => false,
        }
    }
}

fn mismatch(name: &str, value: &Value) -> CommandError {
    ArgumentError::Mismatch {
        name: name.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// The lazily converted values of an argument; see [`Invocation::stream`].
pub struct ValueStream<'s> {
    explicit: std::vec::IntoIter<Value>,
    piped: Option<PipedLines>,
    scalar: &'s ScalarType,
    registry: &'s ConverterRegistry,
    cancellation: &'s CancellationToken,
}

impl<'s> Iterator for ValueStream<'s> {
    type Item = Result<Value, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancellation.is_cancelled() {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Value stream cancelled.");
            }

            return None;
        }

        if let Some(value) = self.explicit.next() {
            return Some(Ok(value));
        }

        let line = self.piped.as_mut()?.next()?;
        Some(self.registry.convert(self.scalar, &line))
    }
}

enum Handler<'s> {
    Intercept(&'s dyn Interceptor),
    Execute(&'s dyn Target),
}

pub(crate) struct Step<'s> {
    command: &'s Command,
    level: usize,
    handler: Handler<'s>,
}

/// The remainder of an invocation pipeline, handed to an interceptor.
pub struct Continuation<'s> {
    session: &'s Session<'s>,
    steps: &'s [Step<'s>],
}

impl<'s> Continuation<'s> {
    /// Run the inner interceptors and the target, returning their outcome.
    pub fn proceed(self) -> Result<Outcome, CommandError> {
        run_steps(self.session, self.steps)
    }
}

fn run_steps<'s>(session: &'s Session<'s>, steps: &'s [Step<'s>]) -> Result<Outcome, CommandError> {
    match steps.split_first() {
        Some((step, rest)) => {
            let invocation = Invocation::new(session, step.command, step.level);

            match step.handler {
                Handler::Intercept(interceptor) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Intercepting at '{}'.", step.command.name());
                    }

                    interceptor.intercept(
                        &invocation,
                        Continuation {
                            session,
                            steps: rest,
                        },
                    )
                }
                Handler::Execute(target) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Executing '{}'.", step.command.name());
                    }

                    target.execute(&invocation)
                }
            }
        }
        None => Ok(Outcome::Unit),
    }
}

/// The interceptors along the command path (outermost first), followed by the target.
pub(crate) struct InvocationPipeline<'t> {
    steps: Vec<Step<'t>>,
}

impl<'t> InvocationPipeline<'t> {
    pub(crate) fn new(result: &ParseResult<'t>) -> Result<Self, ParseError> {
        let mut steps: Vec<Step<'t>> = Vec::default();

        for (level, command) in result.path().iter().copied().enumerate() {
            if let Some(interceptor) = command.interceptor_handler() {
                steps.push(Step {
                    command,
                    level,
                    handler: Handler::Intercept(interceptor),
                });
            }
        }

        let command = result.command();

        match command.target_handler() {
            Some(target) => {
                steps.push(Step {
                    command,
                    level: result.target_level(),
                    handler: Handler::Execute(target),
                });
                Ok(Self { steps })
            }
            None => Err(ParseError::MissingSubcommand {
                command: command.name().to_string(),
            }),
        }
    }

    pub(crate) fn run(&self, session: &Session<'_>) -> Result<Outcome, CommandError> {
        run_steps(session, &self.steps)
    }
}
