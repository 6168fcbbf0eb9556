use std::str::FromStr;
use std::sync::Arc;

use crate::api::{AppSettings, Command, ConverterRegistry};
use crate::pipeline::{
    App, CommandContext, ConfigError, ConsoleInterface, Middleware, Next, RunError, Stage,
    UserInterface,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The application builder: a command tree, its settings, converters and middleware.
///
/// ### Example
/// ```
/// # use arbor_engine as arbor;
/// use arbor::{AppRunner, Argument, Command, Invocation, ValueType};
///
/// let root = Command::new("program")
///     .add(Argument::operand("name", ValueType::text()))
///     .target(|invocation: &Invocation| {
///         let name: String = invocation.value("name")?;
///         Ok(name.len() as i32)
///     });
/// let app = AppRunner::new(root).build();
///
/// assert_eq!(app.run_tokens(&["abc"]).unwrap(), 3);
/// ```
pub struct AppRunner {
    root: Command,
    settings: AppSettings,
    registry: ConverterRegistry,
    middleware: Vec<Middleware>,
    user_interface: Option<Arc<dyn UserInterface>>,
}

impl AppRunner {
    /// Create an application builder around the root command.
    pub fn new(root: Command) -> Self {
        Self {
            root,
            settings: AppSettings::default(),
            registry: ConverterRegistry::default(),
            middleware: Vec::default(),
            user_interface: None,
        }
    }

    /// Use these settings.
    /// If repeated, only the final settings will apply.
    pub fn settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Register a string-constructible type under `tag`, for arguments declared with [`ValueType::custom`](crate::ValueType::custom).
    pub fn converter<T>(mut self, tag: impl Into<String>) -> Self
    where
        T: FromStr + std::fmt::Display + Send + Sync + 'static,
    {
        self.registry = self.registry.register::<T>(tag);
        self
    }

    /// Use this converter registry, replacing any converters registered so far.
    pub fn converters(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Add a middleware to `stage`.
    ///
    /// Within a stage, middleware runs in ascending `order`; the engine's own steps use order `0`
    /// (and `-100` for response file expansion in the `Tokenize` stage).
    ///
    /// ### Example
    /// ```
    /// # use arbor_engine as arbor;
    /// use arbor::{AppRunner, Command, CommandContext, Invocation, Next, RunError, Stage};
    ///
    /// let root = Command::new("program").target(|_: &Invocation| Ok(()));
    /// let app = AppRunner::new(root)
    ///     .use_middleware(Stage::PostInvoke, 0, |context: &mut CommandContext, next: Next| {
    ///         context.set_exit_code(5);
    ///         next.run(context)
    ///     })
    ///     .build();
    ///
    /// assert_eq!(app.run_tokens(&[]).unwrap(), 5);
    /// ```
    pub fn use_middleware<F>(mut self, stage: Stage, order: i32, handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>, Next<'_>) -> Result<i32, RunError> + Send + Sync + 'static,
    {
        self.middleware.push(Middleware::new(stage, order, handler));
        self
    }

    /// Print through this console, rather than standard output/error.
    pub fn user_interface(mut self, user_interface: Arc<dyn UserInterface>) -> Self {
        self.user_interface.replace(user_interface);
        self
    }

    /// Build the application as a Result.
    /// This finalizes the configuration and checks the command tree for errors (ex: a repeated argument name).
    pub fn build_app(self) -> Result<App, ConfigError> {
        let AppRunner {
            root,
            settings,
            registry,
            middleware,
            user_interface,
        } = self;
        root.validate(&registry, &settings)?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Built '{}' with {} custom middleware.",
                root.name(),
                middleware.len()
            );
        }

        let user_interface =
            user_interface.unwrap_or_else(|| Arc::new(ConsoleInterface::default()));
        Ok(App::new(root, settings, registry, user_interface, middleware))
    }

    /// Build the application.
    /// This finalizes the configuration and checks the command tree for errors (ex: a repeated argument name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> App {
        match self.build_app() {
            Ok(app) => app,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::api::{Argument, Outcome, ValueType};
    use crate::model::BooleanMode;
    use crate::pipeline::{
        CancellationToken, CommandError, Continuation, InMemoryInterface, Invocation, PipedLines,
    };
    use crate::test::assert_contains;
    use rstest::rstest;

    type Log = Arc<Mutex<Vec<String>>>;

    fn record(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn build(root: Command, settings: AppSettings) -> (App, Arc<InMemoryInterface>) {
        let interface = Arc::new(InMemoryInterface::default());
        let app = AppRunner::new(root)
            .settings(settings)
            .user_interface(interface.clone())
            .build_app()
            .unwrap();
        (app, interface)
    }

    fn add() -> Command {
        Command::new("add")
            .add(Argument::operand("x", ValueType::int()))
            .add(Argument::operand("y", ValueType::int()))
            .add(
                Argument::option("operator", ValueType::text())
                    .short('o')
                    .default_value("+"),
            )
            .target(|invocation: &Invocation| {
                let x: i64 = invocation.value("x")?;
                let y: i64 = invocation.value("y")?;
                let operator: String = invocation.value("operator")?;
                let total = match operator.as_str() {
                    "*" => x * y,
                    "-" => x - y,
                    _ => x + y,
                };
                invocation
                    .console()
                    .print(format!("{x} {operator} {y} = {total}"));
                Ok(())
            })
    }

    fn calculator() -> Command {
        Command::new("calculator").subcommand(add())
    }

    #[rstest]
    #[case(vec!["add", "2", "3", "-o", "*"], "2 * 3 = 6")]
    #[case(vec!["add", "-o", "*", "2", "3"], "2 * 3 = 6")]
    #[case(vec!["add", "--operator=-", "2", "3"], "2 - 3 = -1")]
    #[case(vec!["add", "2", "3"], "2 + 3 = 5")]
    fn run_add(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let (app, interface) = build(calculator(), AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&tokens).unwrap();

        // Verify
        assert_eq!(exit_code, 0);
        assert_eq!(interface.consume_message(), expected);
    }

    #[rstest]
    #[case(vec!["add", "2", "3", "--operater", "*"], 3, "Parse error: Unrecognized option '--operater'.  Did you mean '--operator'?")]
    #[case(vec!["ad", "2", "3"], 0, "Parse error: Unrecognized command or argument 'ad'.  Did you mean 'add'?")]
    #[case(vec!["add", "2", "3", "4"], 3, "Parse error: Unrecognized command or argument '4'.")]
    #[case(vec!["add", "2", "3", "-o"], 3, "Parse error: Missing value for option '--operator'.")]
    fn run_parse_error(#[case] tokens: Vec<&str>, #[case] offset: usize, #[case] expected: &str) {
        // Setup
        let (app, interface) = build(calculator(), AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&tokens).unwrap();

        // Verify
        assert_eq!(exit_code, 1);
        assert_eq!(interface.message(), None);
        assert_eq!(interface.error().unwrap(), expected);
        assert_eq!(interface.error_context().unwrap().offset(), offset);
    }

    #[test]
    fn run_validation_error() {
        // Setup
        let (app, interface) = build(calculator(), AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&["add", "two", "3.5"]).unwrap();

        // Verify
        assert_eq!(exit_code, 2);
        assert_eq!(interface.message(), None);
        let error = interface.error().unwrap();
        assert_contains!(error, "Validation error:");
        assert_contains!(error, "cannot convert 'two'");
        assert_contains!(error, "cannot convert '3.5'");
        assert_eq!(interface.error_context(), None);
    }

    #[test]
    fn run_required_missing() {
        // Setup
        let (app, interface) = build(calculator(), AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&["add", "2"]).unwrap();

        // Verify
        assert_eq!(exit_code, 2);
        assert_eq!(
            interface.error().unwrap(),
            "Validation error: Required argument 'y' is missing."
        );
    }

    #[test]
    fn run_missing_subcommand() {
        // Setup
        let (app, interface) = build(calculator(), AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&[]).unwrap();

        // Verify
        assert_eq!(exit_code, 1);
        assert_eq!(
            interface.error().unwrap(),
            "Parse error: Command 'calculator' requires a sub-command."
        );
    }

    #[rstest]
    #[case(vec!["-h"], "usage: calculator [-h] { ... }")]
    #[case(vec!["add", "--help"], "usage: calculator add [-h] [-o OPERATOR] X Y")]
    #[case(vec!["add", "2", "-h", "--not-parsed"], "usage: calculator add [-h] [-o OPERATOR] X Y")]
    fn run_help(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let (app, interface) = build(calculator(), AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&tokens).unwrap();

        // Verify
        assert_eq!(exit_code, 0);
        let message = interface.consume_message();
        assert_eq!(message.lines().next().unwrap(), expected);
    }

    #[test]
    fn run_parse_directive() {
        // Setup
        let log: Log = Arc::default();
        let target_log = log.clone();
        let root = Command::new("program")
            .add(Argument::operand("x", ValueType::int()))
            .target(move |_: &Invocation| {
                record(&target_log, "target");
                Ok(())
            });
        let (app, interface) = build(root, AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&["[parse]", "7"]).unwrap();

        // Verify
        assert_eq!(exit_code, 0);
        assert_eq!(entries(&log), Vec::<String>::default());
        assert_contains!(interface.consume_message(), "program x: 7 (explicit)");
    }

    #[test]
    fn run_directives_disabled() {
        // Setup
        let root = Command::new("program")
            .add(Argument::operand("x", ValueType::text()))
            .target(|invocation: &Invocation| {
                let x: String = invocation.value("x")?;
                invocation.console().print(x);
                Ok(())
            });
        let (app, interface) = build(root, AppSettings::default().enable_directives(false));

        // Execute
        let exit_code = app.run_tokens(&["[parse]"]).unwrap();

        // Verify
        assert_eq!(exit_code, 0);
        assert_eq!(interface.consume_message(), "[parse]");
    }

    #[rstest]
    #[case(Outcome::Unit, 0)]
    #[case(Outcome::Code(0), 0)]
    #[case(Outcome::Code(7), 7)]
    #[case(Outcome::Code(-1), -1)]
    fn run_exit_code(#[case] outcome: Outcome, #[case] expected: i32) {
        // Setup
        let root = Command::new("program").target(move |_: &Invocation| Ok(outcome));
        let (app, _) = build(root, AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&[]).unwrap();

        // Verify
        assert_eq!(exit_code, expected);
    }

    #[test]
    fn run_application_error() {
        // Setup
        let root = Command::new("program").target(|_: &Invocation| -> Result<(), CommandError> {
            Err("disk on fire".into())
        });
        let (app, interface) = build(root, AppSettings::default());

        // Execute
        let result = app.run_tokens(&[]);

        // Verify
        assert_eq!(result.unwrap_err().to_string(), "disk on fire");
        assert_eq!(interface.error(), None);
    }

    fn onion(log: &Log) -> Command {
        let (root_log, sub_log, target_log) = (log.clone(), log.clone(), log.clone());

        Command::new("root")
            .add(Argument::flag("dry-run").assign_to_executable_subcommands())
            .add(Argument::flag("verbose"))
            .interceptor(move |invocation: &Invocation, next: Continuation| {
                record(&root_log, "root:before");
                record(
                    &root_log,
                    format!("root:dry-run={}", invocation.binding("dry-run").is_some()),
                );
                let outcome = next.proceed()?;
                record(&root_log, format!("root:after={}", outcome.exit_code()));
                Ok(outcome)
            })
            .subcommand(
                Command::new("sub")
                    .interceptor(move |_: &Invocation, next: Continuation| {
                        record(&sub_log, "sub:before");
                        let outcome = next.proceed()?;
                        record(&sub_log, "sub:after");
                        Ok(outcome)
                    })
                    .target(move |invocation: &Invocation| {
                        let dry_run: bool = invocation.value("dry-run")?;
                        record(&target_log, format!("target:dry-run={dry_run}"));
                        record(
                            &target_log,
                            format!("target:verbose={}", invocation.get("verbose").is_some()),
                        );
                        Ok(4)
                    }),
            )
    }

    #[test]
    fn run_interceptors_nest() {
        // Setup
        let log: Log = Arc::default();
        let (app, _) = build(onion(&log), AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&["--dry-run", "--verbose", "sub"]).unwrap();

        // Verify
        assert_eq!(exit_code, 4);
        assert_eq!(
            entries(&log),
            vec![
                "root:before",
                "root:dry-run=false",
                "sub:before",
                "target:dry-run=true",
                "target:verbose=false",
                "sub:after",
                "root:after=4",
            ]
        );
    }

    #[test]
    fn run_interceptor_short_circuit() {
        // Setup
        let log: Log = Arc::default();
        let target_log = log.clone();
        let root = Command::new("root")
            .interceptor(|_: &Invocation, _: Continuation| Ok(9))
            .subcommand(Command::new("sub").target(move |_: &Invocation| {
                record(&target_log, "target");
                Ok(())
            }));
        let (app, _) = build(root, AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&["sub"]).unwrap();

        // Verify
        assert_eq!(exit_code, 9);
        assert_eq!(entries(&log), Vec::<String>::default());
    }

    #[test]
    fn run_interceptor_recovers() {
        // Setup
        let root = Command::new("root")
            .interceptor(|invocation: &Invocation, next: Continuation| {
                match next.proceed() {
                    Ok(outcome) => Ok(outcome),
                    Err(error) => {
                        invocation.console().print(format!("recovered: {error}"));
                        Ok(Outcome::Code(3))
                    }
                }
            })
            .target(|_: &Invocation| -> Result<(), CommandError> { Err("boom".into()) });
        let (app, interface) = build(root, AppSettings::default());

        // Execute
        let exit_code = app.run_tokens(&[]).unwrap();

        // Verify
        assert_eq!(exit_code, 3);
        assert_eq!(interface.consume_message(), "recovered: boom");
    }

    fn piped() -> Command {
        Command::new("sum")
            .add(Argument::operand("values", ValueType::int().collection()).piped())
            .target(|invocation: &Invocation| {
                let values: Vec<i64> = invocation.value("values")?;
                invocation.console().print(format!("{values:?}"));
                Ok(())
            })
    }

    #[rstest]
    #[case(vec!["1", "2"], Some(vec!["3", "4"]), "[1, 2, 3, 4]")]
    #[case(vec![], Some(vec!["3", "4"]), "[3, 4]")]
    #[case(vec!["1", "2"], None, "[1, 2]")]
    #[case(vec![], None, "[]")]
    fn run_piped(
        #[case] tokens: Vec<&str>,
        #[case] lines: Option<Vec<&str>>,
        #[case] expected: &str,
    ) {
        // Setup
        let (app, interface) = build(piped(), AppSettings::default());

        // Execute
        let exit_code = match lines {
            Some(lines) => {
                let lines: Vec<String> = lines.into_iter().map(String::from).collect();
                app.run_with_input(&tokens, lines).unwrap()
            }
            None => app.run_tokens(&tokens).unwrap(),
        };

        // Verify
        assert_eq!(exit_code, 0);
        assert_eq!(interface.consume_message(), expected);
    }

    #[test]
    fn run_piped_placeholder() {
        // Setup
        let root = Command::new("program")
            .add(Argument::option("names", ValueType::text().collection()))
            .add(Argument::option("other", ValueType::text().collection()))
            .target(|invocation: &Invocation| {
                let names: Vec<String> = invocation.value("names")?;
                let other: Vec<String> = invocation.value("other")?;
                invocation.console().print(format!("{names:?} {other:?}"));
                Ok(())
            });
        let (app, interface) = build(root, AppSettings::default());
        let lines = vec!["c".to_string()];

        // Execute
        let exit_code = app
            .run_with_input(&["--other", "x", "--names", "a", "--names", "^"], lines)
            .unwrap();

        // Verify
        assert_eq!(exit_code, 0);
        assert_eq!(interface.consume_message(), r#"["a", "c"] ["x"]"#);
    }

    #[test]
    fn run_piped_conversion_fault() {
        // Setup
        let (app, interface) = build(piped(), AppSettings::default());
        let lines = vec!["1".to_string(), "x".to_string()];

        // Execute
        let result = app.run_with_input(&[], lines);

        // Verify
        assert_eq!(
            result.unwrap_err().to_string(),
            "cannot convert 'x' to Integer."
        );
        assert_eq!(interface.message(), None);
    }

    #[test]
    fn build_two_piped_arguments() {
        // Setup
        let root = Command::new("program")
            .add(Argument::operand("lines", ValueType::text().collection()).piped())
            .add(Argument::option("extra", ValueType::text().collection()).piped())
            .target(|_: &Invocation| Ok(()));

        // Execute
        let result = AppRunner::new(root).build_app();

        // Verify
        assert_eq!(
            result.unwrap_err().to_string(),
            "Config error: command 'program' declares more than one piped input argument: lines, --extra."
        );
    }

    #[test]
    fn run_stream_cancelled() {
        // Setup
        let root = Command::new("program")
            .add(Argument::operand("values", ValueType::text().collection()).piped())
            .target(|invocation: &Invocation| {
                let mut seen: i32 = 0;

                for value in invocation.stream("values")? {
                    value?;
                    seen += 1;

                    if seen == 2 {
                        invocation.cancellation().cancel();
                    }
                }

                Ok(seen)
            });
        let (app, _) = build(root, AppSettings::default());
        let lines: PipedLines = Box::new((0..).map(|i| i.to_string()));

        // Execute
        let exit_code = app
            .run_with(vec!["a".to_string()], Some(lines), CancellationToken::new())
            .unwrap();

        // Verify
        assert_eq!(exit_code, 2);
    }

    #[test]
    fn run_stream_consumed_once() {
        // Setup
        let root = Command::new("program")
            .add(Argument::operand("values", ValueType::text().collection()).piped())
            .target(|invocation: &Invocation| {
                let first = invocation.values("values")?.len();
                let second = invocation.values("values")?.len();
                Ok((first * 10 + second) as i32)
            });
        let (app, _) = build(root, AppSettings::default());
        let lines = vec!["x".to_string(), "y".to_string()];

        // Execute
        let exit_code = app.run_with_input(&["a"], lines).unwrap();

        // Verify
        assert_eq!(exit_code, 31);
    }

    #[test]
    fn run_cancelled_before_start() {
        // Setup
        let root = Command::new("program")
            .add(Argument::operand("values", ValueType::text().collection()))
            .target(|invocation: &Invocation| Ok(invocation.values("values")?.len() as i32));
        let (app, _) = build(root, AppSettings::default());
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        // Execute
        let exit_code = app
            .run_with(vec!["a".to_string(), "b".to_string()], None, cancellation)
            .unwrap();

        // Verify
        assert_eq!(exit_code, 0);
    }

    #[derive(Debug)]
    struct Greeter(&'static str);

    #[test]
    fn run_middleware_order() {
        // Setup
        let log: Log = Arc::default();
        let (early, late, post) = (log.clone(), log.clone(), log.clone());
        let root = Command::new("program").target(|invocation: &Invocation| {
            let greeter = invocation.services().get::<Greeter>();
            invocation
                .console()
                .print(greeter.map(|g| g.0).unwrap_or("none").to_string());
            Ok(1)
        });
        let interface = Arc::new(InMemoryInterface::default());
        let app = AppRunner::new(root)
            .user_interface(interface.clone())
            .use_middleware(
                Stage::PreInvoke,
                10,
                move |context: &mut CommandContext, next: Next| {
                    record(&late, "pre:10");
                    next.run(context)
                },
            )
            .use_middleware(
                Stage::PreInvoke,
                -10,
                move |context: &mut CommandContext, next: Next| {
                    record(&early, "pre:-10");
                    context.services_mut().insert(Greeter("hello"));
                    next.run(context)
                },
            )
            .use_middleware(
                Stage::PostInvoke,
                0,
                move |context: &mut CommandContext, next: Next| {
                    record(&post, format!("post:{:?}", context.exit_code()));
                    context.set_exit_code(context.exit_code().unwrap_or(0) + 1);
                    next.run(context)
                },
            )
            .build_app()
            .unwrap();

        // Execute
        let exit_code = app.run_tokens(&[]).unwrap();

        // Verify
        assert_eq!(exit_code, 2);
        assert_eq!(interface.consume_message(), "hello");
        assert_eq!(entries(&log), vec!["pre:-10", "pre:10", "post:Some(1)"]);
    }

    #[test]
    fn run_middleware_short_circuit() {
        // Setup
        let log: Log = Arc::default();
        let target_log = log.clone();
        let root = Command::new("program").target(move |_: &Invocation| {
            record(&target_log, "target");
            Ok(())
        });
        let app = AppRunner::new(root)
            .user_interface(Arc::new(InMemoryInterface::default()))
            .use_middleware(
                Stage::Bind,
                -1,
                |context: &mut CommandContext, _: Next| -> Result<i32, RunError> {
                    Ok(context.arguments().len() as i32)
                },
            )
            .build_app()
            .unwrap();

        // Execute
        let exit_code = app.run_tokens(&["a", "b", "c"]).unwrap();

        // Verify
        assert_eq!(exit_code, 3);
        assert_eq!(entries(&log), Vec::<String>::default());
    }

    #[test]
    fn run_explicit_boolean() {
        // Setup
        let root = Command::new("do")
            .add(Argument::flag("flag"))
            .target(|invocation: &Invocation| {
                let flag: bool = invocation.value("flag")?;
                Ok(if flag { 10 } else { 20 })
            });
        let (implicit, _) = build(root.clone(), AppSettings::default());
        let (explicit, interface) = build(
            root,
            AppSettings::default().boolean_mode(BooleanMode::Explicit),
        );

        // Execute & Verify
        assert_eq!(implicit.run_tokens(&["--flag"]).unwrap(), 10);
        assert_eq!(implicit.run_tokens(&[]).unwrap(), 20);
        assert_eq!(explicit.run_tokens(&["--flag", "false"]).unwrap(), 20);
        assert_eq!(explicit.run_tokens(&["--flag"]).unwrap(), 1);
        assert_eq!(
            interface.error().unwrap(),
            "Parse error: Missing value for option '--flag'."
        );
    }

    #[test]
    fn run_unknown_argument_name() {
        // Setup
        let root = Command::new("program").target(|invocation: &Invocation| {
            let _: i64 = invocation.value("nope")?;
            Ok(())
        });
        let (app, _) = build(root, AppSettings::default());

        // Execute
        let result = app.run_tokens(&[]);

        // Verify
        assert_eq!(
            result.unwrap_err().to_string(),
            "Unknown argument 'nope' for command 'program'."
        );
    }

    #[test]
    fn run_custom_converter() {
        // Setup
        let root = Command::new("ping")
            .add(Argument::operand("address", ValueType::custom("ip")))
            .target(|invocation: &Invocation| {
                let octet = invocation
                    .get("address")
                    .and_then(|value| value.downcast_ref::<std::net::Ipv4Addr>())
                    .map(|address| address.octets()[3])
                    .unwrap_or_default();
                Ok(octet as i32)
            });
        let app = AppRunner::new(root)
            .converter::<std::net::Ipv4Addr>("ip")
            .user_interface(Arc::new(InMemoryInterface::default()))
            .build_app()
            .unwrap();

        // Execute & Verify
        assert_eq!(app.run_tokens(&["10.0.0.42"]).unwrap(), 42);
        assert_eq!(app.run_tokens(&["nowhere"]).unwrap(), 2);
    }

    #[test]
    fn build_unregistered_converter() {
        // Setup
        let root = Command::new("ping").add(Argument::operand("address", ValueType::custom("ip")));

        // Execute
        let result = AppRunner::new(root).build_app();

        // Verify
        assert_contains!(result.unwrap_err().to_string(), "unregistered type 'ip'");
    }

    #[test]
    fn build_duplicate() {
        // Setup
        let root = Command::new("program")
            .add(Argument::option("name", ValueType::text()))
            .add(Argument::operand("name", ValueType::text()));

        // Execute
        let result = AppRunner::new(root).build_app();

        // Verify
        assert_matches!(result, Err(ConfigError(message)) => {
            assert_contains!(message, "declares 'name' more than once");
        });
    }
}
