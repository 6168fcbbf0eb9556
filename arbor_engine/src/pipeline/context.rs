use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::binder::ParseResult;
use crate::pipeline::App;
use crate::tokens::TokenStream;

/// Lines read from standard input, consumed lazily and at most once.
pub type PipedLines = Box<dyn Iterator<Item = String>>;

/// A cooperative cancellation signal, shared by every clone.
///
/// The engine never blocks on it: commands iterating lazily produced values check it between elements.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every holder of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Make Ctrl-C cancel this token, in place of any token watched before.
    ///
    /// The process handler is installed on first use only.
    /// A handler the application installed itself is left alone.
    pub(crate) fn watch_ctrl_c(&self) -> Result<(), ctrlc::Error> {
        *WATCHED.lock().unwrap_or_else(PoisonError::into_inner) = Some(self.clone());

        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        match ctrlc::set_handler(cancel_watched) {
            Ok(()) | Err(ctrlc::Error::MultipleHandlers) => Ok(()),
            Err(error) => {
                INSTALLED.store(false, Ordering::SeqCst);
                Err(error)
            }
        }
    }
}

static WATCHED: Mutex<Option<CancellationToken>> = Mutex::new(None);
static INSTALLED: AtomicBool = AtomicBool::new(false);

fn cancel_watched() {
    if let Some(token) = WATCHED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        token.cancel();
    }
}

/// Ambient services of a run, keyed by their type.
#[derive(Default)]
pub struct Services {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Services {
    /// Register `service`, replacing any previous service of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, service: T) {
        self.entries.insert(TypeId::of::<T>(), Box::new(service));
    }

    /// The service of type `T`, if registered.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|service| service.downcast_ref::<T>())
    }

    /// Whether a service of type `T` is registered.
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}

/// The state of a single run, handed from stage to stage.
///
/// Each run builds its own context; nothing in it is shared with concurrent runs.
pub struct CommandContext<'a> {
    app: &'a App,
    arguments: Vec<String>,
    tokens: Option<TokenStream>,
    parse_result: Option<ParseResult<'a>>,
    cancellation: CancellationToken,
    services: Services,
    piped: RefCell<Option<PipedLines>>,
    has_piped: bool,
    exit_code: Option<i32>,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(
        app: &'a App,
        arguments: Vec<String>,
        piped: Option<PipedLines>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            app,
            arguments,
            tokens: None,
            parse_result: None,
            cancellation,
            services: Services::default(),
            has_piped: piped.is_some(),
            piped: RefCell::new(piped),
            exit_code: None,
        }
    }

    /// The application being run.
    pub fn app(&self) -> &'a App {
        self.app
    }

    /// The command line arguments (without the program name).
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Rewrite the command line; only meaningful before the `Tokenize` stage's core step.
    pub fn arguments_mut(&mut self) -> &mut Vec<String> {
        &mut self.arguments
    }

    /// The tokenized command line, once tokenization has run.
    pub fn tokens(&self) -> Option<&TokenStream> {
        self.tokens.as_ref()
    }

    pub(crate) fn set_tokens(&mut self, tokens: TokenStream) {
        self.tokens.replace(tokens);
    }

    /// The bound command line, once binding has run.
    pub fn parse_result(&self) -> Option<&ParseResult<'a>> {
        self.parse_result.as_ref()
    }

    pub(crate) fn set_parse_result(&mut self, parse_result: ParseResult<'a>) {
        // Immutable once bound.
        if self.parse_result.is_none() {
            self.parse_result.replace(parse_result);
        }
    }

    /// The run's cancellation signal.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The run's ambient services.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Register ambient services for later stages, interceptors and targets.
    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    /// Whether the run was given piped input.
    pub fn has_piped_input(&self) -> bool {
        self.has_piped
    }

    pub(crate) fn piped(&self) -> &RefCell<Option<PipedLines>> {
        &self.piped
    }

    /// The exit code recorded by the `Invoke` stage.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Override the exit code of the run.
    pub fn set_exit_code(&mut self, exit_code: i32) {
        self.exit_code.replace(exit_code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Greeting(&'static str);

    #[test]
    fn cancellation_shared() {
        // Setup
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());

        // Execute
        clone.cancel();

        // Verify
        assert!(token.is_cancelled());
    }

    #[test]
    fn ctrl_c_cancels_latest_token() {
        // Setup
        let first = CancellationToken::new();
        let second = CancellationToken::new();

        // Execute
        first.watch_ctrl_c().unwrap();
        second.watch_ctrl_c().unwrap();
        cancel_watched();

        // Verify
        assert!(!first.is_cancelled());
        assert!(second.is_cancelled());
    }

    #[test]
    fn services() {
        // Setup
        let mut services = Services::default();
        assert!(!services.contains::<Greeting>());

        // Execute
        services.insert(Greeting("hi"));
        services.insert(7u32);
        services.insert(Greeting("hello"));

        // Verify
        assert_eq!(services.get::<Greeting>(), Some(&Greeting("hello")));
        assert_eq!(services.get::<u32>(), Some(&7));
        assert_eq!(services.get::<i32>(), None);
    }
}
