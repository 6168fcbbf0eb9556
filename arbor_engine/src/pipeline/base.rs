use thiserror::Error;

use crate::api::ConvertError;

/// A fault raised by an interceptor or target command.
/// The engine never catches these; they propagate to the caller of the run.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// The command tree (or its settings) is declared inconsistently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

impl ConfigError {
    /// The message, without the `Config error:` prefix.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// The command line does not fit the command tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An option-looking token names no visible option.
    #[error("Unrecognized option '{token}'.{}", suggest(.suggestion))]
    UnrecognizedOption {
        /// The offending token.
        token: String,
        /// The closest visible name, if any.
        suggestion: Option<String>,
    },

    /// A token that no argument accepts.
    #[error("Unrecognized command or argument '{token}'.{}", suggest(.suggestion))]
    UnrecognizedArgument {
        /// The offending token.
        token: String,
        /// The closest sub-command name, if any.
        suggestion: Option<String>,
    },

    /// A value-taking option was not followed by its value.
    #[error("Missing value for option '{option}'.")]
    MissingValue {
        /// The option identifier.
        option: String,
    },

    /// An explicit boolean option was followed by a non-boolean.
    #[error("Option '{option}' expects 'true' or 'false', found '{token}'.")]
    InvalidBoolean {
        /// The option identifier.
        option: String,
        /// The offending token.
        token: String,
    },

    /// A clubbed short option, other than the last, takes a value.
    #[error("'{flag}' in '{token}' takes a value and can only be the last option in a clubbed group.")]
    Clubbing {
        /// The offending short name.
        flag: char,
        /// The clubbed token.
        token: String,
    },

    /// A single-valued argument received more than one value.
    #[error("Unrecognized extra value '{token}' for '{argument}', which accepts a single value.")]
    ExtraValue {
        /// The argument identifier.
        argument: String,
        /// The offending value.
        token: String,
    },

    /// A single-valued option was given more than once.
    #[error("Option '{option}' accepts a single value, but was given more than once.")]
    Repeated {
        /// The option identifier.
        option: String,
    },

    /// More than one argument claims the piped input.
    #[error("Piped input can only target one argument, but found: {}.", .arguments.join(", "))]
    PipedTargetConflict {
        /// The competing argument identifiers.
        arguments: Vec<String>,
    },

    /// The resolved command has nothing to execute.
    #[error("Command '{command}' requires a sub-command.")]
    MissingSubcommand {
        /// The command name.
        command: String,
    },

    /// A response file could not be read.
    #[error("Cannot read response file '{path}': {message}.")]
    ResponseFile {
        /// The file path.
        path: String,
        /// The underlying failure.
        message: String,
    },
}

fn suggest(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!("  Did you mean '{name}'?"),
        None => String::default(),
    }
}

/// A bound value violates its declaration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required argument received no value.
    #[error("Required argument '{argument}' is missing.")]
    Required {
        /// The argument identifier.
        argument: String,
    },

    /// A raw value could not be converted.
    #[error("Argument '{argument}': {error}")]
    Conversion {
        /// The argument identifier.
        argument: String,
        /// The conversion failure.
        error: ConvertError,
    },

    /// An external validator rejected the value(s).
    #[error("{0}")]
    Rejected(String),
}

/// Every validation error found on a command line, reported together.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Everything that may stop a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// See [`ConfigError`]; exits with code `1`.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// See [`ParseError`]; exits with code `1`.
    #[error("Parse error: {error}")]
    Parse {
        /// The failure.
        error: ParseError,
        /// The index of the offending argument, when known.
        offset: Option<usize>,
    },

    /// See [`ValidationErrors`]; exits with code `2`.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// See [`CommandError`]; returned to the caller.
    #[error("{0}")]
    Application(CommandError),
}

impl RunError {
    pub(crate) fn parse_at(offset: usize, error: ParseError) -> Self {
        RunError::Parse {
            error,
            offset: Some(offset),
        }
    }
}

impl From<ParseError> for RunError {
    fn from(error: ParseError) -> Self {
        RunError::Parse {
            error,
            offset: None,
        }
    }
}

impl From<ValidationErrors> for RunError {
    fn from(errors: ValidationErrors) -> Self {
        RunError::Validation(errors)
    }
}
