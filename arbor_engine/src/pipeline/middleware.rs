use std::env;
use std::io::{self, BufRead, IsTerminal};
use std::sync::Arc;

use crate::api::{AppSettings, Command, ConverterRegistry};
use crate::binder::bind;
use crate::constant::{EXIT_PARSE_ERROR, EXIT_SUCCESS, EXIT_VALIDATION_ERROR, PARSE_DIRECTIVE};
use crate::pipeline::invocation::{InvocationPipeline, Session};
use crate::pipeline::response;
use crate::pipeline::usage::usage;
use crate::pipeline::{
    CancellationToken, CommandContext, CommandError, ConfigError, ErrorContext, ParseError,
    PipedLines, RunError, UserInterface,
};
use crate::tokens::tokenize;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The stages every run passes through, in order, exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Turn the arguments into a token stream.
    Tokenize,
    /// Bind the token stream to the command tree.
    Bind,
    /// After binding, before any interceptor or target runs.
    PreInvoke,
    /// Run the interceptors and the target.
    Invoke,
    /// After the target returned.
    PostInvoke,
}

/// A step of the run.
///
/// Calls `next.run(context)` to continue the run, or returns an exit code to stop it.
/// Implemented for every `Fn(&mut CommandContext, Next) -> Result<i32, RunError>`.
pub trait MiddlewareHandler: Send + Sync {
    /// Handle the run at this step.
    fn handle(&self, context: &mut CommandContext<'_>, next: Next<'_>) -> Result<i32, RunError>;
}

impl<F> MiddlewareHandler for F
where
    F: Fn(&mut CommandContext<'_>, Next<'_>) -> Result<i32, RunError> + Send + Sync,
{
    fn handle(&self, context: &mut CommandContext<'_>, next: Next<'_>) -> Result<i32, RunError> {
        self(context, next)
    }
}

#[derive(Clone)]
pub(crate) struct Middleware {
    stage: Stage,
    order: i32,
    handler: Arc<dyn MiddlewareHandler>,
}

impl Middleware {
    pub(crate) fn new(stage: Stage, order: i32, handler: impl MiddlewareHandler + 'static) -> Self {
        Self {
            stage,
            order,
            handler: Arc::new(handler),
        }
    }
}

/// The rest of the run.
pub struct Next<'m> {
    chain: &'m [Middleware],
}

impl<'m> Next<'m> {
    /// Continue with the next step; the end of the chain yields the recorded exit code.
    pub fn run(self, context: &mut CommandContext<'_>) -> Result<i32, RunError> {
        match self.chain.split_first() {
            Some((middleware, rest)) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Stage {:?}, order {}.", middleware.stage, middleware.order);
                }

                middleware.handler.handle(context, Next { chain: rest })
            }
            None => Ok(context.exit_code().unwrap_or(EXIT_SUCCESS)),
        }
    }
}

/// The configured application.
/// Built via `AppRunner::build` or `AppRunner::build_app`.
pub struct App {
    root: Command,
    settings: AppSettings,
    registry: ConverterRegistry,
    user_interface: Arc<dyn UserInterface>,
    middleware: Vec<Middleware>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl App {
    pub(crate) fn new(
        root: Command,
        settings: AppSettings,
        registry: ConverterRegistry,
        user_interface: Arc<dyn UserInterface>,
        custom: Vec<Middleware>,
    ) -> Self {
        let mut middleware = vec![
            Middleware::new(Stage::Tokenize, 0, tokenize_stage),
            Middleware::new(Stage::Bind, 0, bind_stage),
            Middleware::new(Stage::Bind, 50, parse_directive),
            Middleware::new(Stage::Invoke, 0, invoke_stage),
        ];

        if settings.expands_response_files() {
            middleware.push(Middleware::new(Stage::Tokenize, -100, response_files));
        }

        middleware.extend(custom);
        // Stable: equal keys keep their registration order, core steps first.
        middleware.sort_by_key(|m| (m.stage, m.order));

        Self {
            root,
            settings,
            registry,
            user_interface,
            middleware,
        }
    }

    /// The root of the command tree.
    pub fn root(&self) -> &Command {
        &self.root
    }

    /// The application settings.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// The value converters.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The console.
    pub fn user_interface(&self) -> &dyn UserInterface {
        self.user_interface.as_ref()
    }

    /// Run with the process' arguments, treating a non-terminal standard input as piped input.
    pub fn run(&self) -> Result<i32, CommandError> {
        let arguments: Vec<String> = env::args().skip(1).collect();
        let piped: Option<PipedLines> = if io::stdin().is_terminal() {
            None
        } else {
            Some(Box::new(io::stdin().lock().lines().map_while(Result::ok)))
        };
        let cancellation = CancellationToken::new();

        if self.settings.cancels_on_ctrl_c() {
            cancellation.watch_ctrl_c()?;
        }

        self.run_with(arguments, piped, cancellation)
    }

    /// Run with the given arguments (without the program name) and no piped input.
    pub fn run_tokens(&self, tokens: &[&str]) -> Result<i32, CommandError> {
        self.run_with(owned(tokens), None, CancellationToken::new())
    }

    /// Run with the given arguments and piped input lines.
    pub fn run_with_input<I>(&self, tokens: &[&str], lines: I) -> Result<i32, CommandError>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'static,
    {
        let piped: PipedLines = Box::new(lines.into_iter());
        self.run_with(owned(tokens), Some(piped), CancellationToken::new())
    }

    /// Run with full control over the arguments, piped input and cancellation signal.
    ///
    /// Parse, configuration and validation errors are reported on the console and mapped to their exit codes.
    /// Application faults are returned as `Err`.
    pub fn run_with(
        &self,
        arguments: Vec<String>,
        piped: Option<PipedLines>,
        cancellation: CancellationToken,
    ) -> Result<i32, CommandError> {
        let mut context = CommandContext::new(self, arguments, piped, cancellation);
        let next = Next {
            chain: &self.middleware,
        };

        match next.run(&mut context) {
            Ok(exit_code) => Ok(exit_code),
            Err(RunError::Application(error)) => Err(error),
            Err(error) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Run stopped: {error:?}.");
                }

                self.user_interface.print_error(&error);

                match error {
                    RunError::Validation(_) => Ok(EXIT_VALIDATION_ERROR),
                    RunError::Parse {
                        offset: Some(offset),
                        ..
                    } => {
                        self.user_interface
                            .print_error_context(ErrorContext::new(offset, context.arguments()));
                        Ok(EXIT_PARSE_ERROR)
                    }
                    _ => Ok(EXIT_PARSE_ERROR),
                }
            }
        }
    }
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| token.to_string()).collect()
}

fn response_files(context: &mut CommandContext<'_>, next: Next<'_>) -> Result<i32, RunError> {
    let expanded = response::expand(context.arguments())
        .map_err(|(offset, error)| RunError::parse_at(offset, error))?;
    *context.arguments_mut() = expanded;
    next.run(context)
}

fn tokenize_stage(context: &mut CommandContext<'_>, next: Next<'_>) -> Result<i32, RunError> {
    let app = context.app();
    let stream = tokenize(app.root(), app.settings(), context.arguments())
        .map_err(|(offset, error)| RunError::parse_at(offset, error))?;
    context.set_tokens(stream);
    next.run(context)
}

fn bind_stage(context: &mut CommandContext<'_>, next: Next<'_>) -> Result<i32, RunError> {
    let app = context.app();
    let stream = context
        .tokens()
        .cloned()
        .ok_or_else(|| ConfigError("the command line was never tokenized.".to_string()))?;

    if stream.help_requested() {
        let mut path = vec![app.root()];

        for name in stream.subcommand_path() {
            match path.last().copied().and_then(|c| c.find_subcommand(name)) {
                Some(child) => path.push(child),
                None => break,
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Help requested, short-circuiting the run.");
        }

        app.user_interface().print(usage(&path, app.settings()));
        return Ok(EXIT_SUCCESS);
    }

    let result = bind(
        app.root(),
        app.settings(),
        app.registry(),
        &stream,
        context.has_piped_input(),
    )?;

    if result.command().target_handler().is_none() {
        return Err(ParseError::MissingSubcommand {
            command: result.command().name().to_string(),
        }
        .into());
    }

    context.set_parse_result(result);
    next.run(context)
}

fn parse_directive(context: &mut CommandContext<'_>, next: Next<'_>) -> Result<i32, RunError> {
    let requested = context
        .tokens()
        .map(|stream| stream.directive(PARSE_DIRECTIVE).is_some())
        .unwrap_or(false);

    if requested {
        if let Some(result) = context.parse_result() {
            context.app().user_interface().print(result.to_string());
            return Ok(EXIT_SUCCESS);
        }
    }

    next.run(context)
}

fn invoke_stage(context: &mut CommandContext<'_>, next: Next<'_>) -> Result<i32, RunError> {
    let outcome = {
        let app = context.app();
        let result = context
            .parse_result()
            .ok_or_else(|| ConfigError("the command line was never bound.".to_string()))?;
        let pipeline = InvocationPipeline::new(result)?;
        let session = Session {
            result,
            registry: app.registry(),
            cancellation: context.cancellation(),
            services: context.services(),
            console: app.user_interface(),
            piped: context.piped(),
        };
        pipeline.run(&session).map_err(RunError::Application)?
    };

    context.set_exit_code(outcome.exit_code());
    next.run(context)
}
