use terminal_size::{terminal_size, Width};

use crate::pipeline::RunError;

/// The console a run prints to.
pub trait UserInterface: Send + Sync {
    /// Print a message to standard output.
    fn print(&self, message: String);

    /// Report an error that stopped the run.
    fn print_error(&self, error: &RunError);

    /// Show where on the command line an error was found.
    fn print_error_context(&self, error_context: ErrorContext);
}

/// A [`UserInterface`] over the process' standard output and error.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: &RunError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        let width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        eprintln!("{}", error_context.render(width));
    }
}

/// The command line, with a caret under the argument at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    offset: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    /// Point at the argument at index `offset`.
    pub fn new(offset: usize, tokens: &[String]) -> Self {
        Self {
            offset,
            tokens: tokens.to_vec(),
        }
    }

    /// The index of the offending argument.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Render, windowed around the caret when wider than `width` characters.
    pub fn render(&self, width: Option<usize>) -> String {
        let projection = self.tokens.join(" ");
        let caret: usize = self
            .tokens
            .iter()
            .take(self.offset)
            .map(|token| token.chars().count() + 1)
            .sum();
        let length = projection.chars().count();
        let caret = std::cmp::min(caret, length.saturating_sub(1));

        match width {
            Some(width) if width > 1 && length >= width => {
                // Keep the caret in view, preferring to show what follows it.
                let start = caret.saturating_sub(width / 4);
                let window: String = projection.chars().skip(start).take(width - 1).collect();
                format!("{window}\n{:width$}^", "", width = caret - start)
            }
            _ => format!("{projection}\n{:width$}^", "", width = caret),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

#[cfg(any(test, feature = "unit_test"))]
pub use self::util::InMemoryInterface;

#[cfg(any(test, feature = "unit_test"))]
mod util {
    use std::sync::Mutex;

    use super::{ErrorContext, UserInterface};
    use crate::pipeline::RunError;

    /// A [`UserInterface`] recording everything printed, for tests.
    #[derive(Debug, Default)]
    pub struct InMemoryInterface {
        messages: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
        error_context: Mutex<Option<ErrorContext>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            // Allows for print() to be called many times, concatenating the messages.
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(message);
            }
        }

        fn print_error(&self, error: &RunError) {
            if let Ok(mut errors) = self.errors.lock() {
                errors.push(error.to_string());
            }
        }

        fn print_error_context(&self, error_context: ErrorContext) {
            // Assumes print_error_context() is only ever called once per run.
            if let Ok(mut context) = self.error_context.lock() {
                context.replace(error_context);
            }
        }
    }

    impl InMemoryInterface {
        /// Everything printed, joined by new lines.
        pub fn message(&self) -> Option<String> {
            let messages = self.messages.lock().ok()?;

            if messages.is_empty() {
                None
            } else {
                Some(messages.join("\n"))
            }
        }

        /// Every error printed, joined by new lines.
        pub fn error(&self) -> Option<String> {
            let errors = self.errors.lock().ok()?;

            if errors.is_empty() {
                None
            } else {
                Some(errors.join("\n"))
            }
        }

        /// The last error context printed.
        pub fn error_context(&self) -> Option<ErrorContext> {
            self.error_context.lock().ok()?.clone()
        }

        /// The printed message, asserting no error was printed.
        pub fn consume_message(&self) -> String {
            assert_eq!(self.error(), None);
            assert_eq!(self.error_context(), None);
            self.message().unwrap_or_default()
        }
    }
}
