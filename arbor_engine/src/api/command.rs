use std::collections::HashSet;
use std::sync::Arc;

use crate::api::argument::{flatten, unordered_members, FlatArgument};
use crate::api::{AppSettings, ArgumentNode, ConverterRegistry, ScalarType};
use crate::constant::{HELP_NAME, HELP_SHORT};
use crate::model::Case;
use crate::pipeline::{CommandError, ConfigError, Continuation, Invocation};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The value a target (or interceptor) completes with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Completed without a code of its own; the run exits with `0`.
    #[default]
    Unit,
    /// Completed with an explicit exit code.
    Code(i32),
}

impl Outcome {
    /// The process exit code of this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Unit => 0,
            Outcome::Code(code) => *code,
        }
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Unit
    }
}

impl From<i32> for Outcome {
    fn from(value: i32) -> Self {
        Outcome::Code(value)
    }
}

/// The executable body of a command.
///
/// Implemented for every `Fn(&Invocation) -> Result<R, CommandError>` where `R: Into<Outcome>`.
pub trait Target: Send + Sync {
    /// Run the command.
    fn execute(&self, invocation: &Invocation<'_>) -> Result<Outcome, CommandError>;
}

impl<F, R> Target for F
where
    F: Fn(&Invocation<'_>) -> Result<R, CommandError> + Send + Sync,
    R: Into<Outcome>,
{
    fn execute(&self, invocation: &Invocation<'_>) -> Result<Outcome, CommandError> {
        self(invocation).map(Into::into)
    }
}

/// A handler wrapping the execution of a command and all of its sub-commands.
///
/// The interceptor decides whether (and when) the wrapped pipeline runs by calling [`Continuation::proceed`].
/// Not proceeding short-circuits every inner interceptor as well as the target.
///
/// Implemented for every `Fn(&Invocation, Continuation) -> Result<R, CommandError>` where `R: Into<Outcome>`.
pub trait Interceptor: Send + Sync {
    /// Run around the inner pipeline.
    fn intercept(
        &self,
        invocation: &Invocation<'_>,
        next: Continuation<'_>,
    ) -> Result<Outcome, CommandError>;
}

impl<F, R> Interceptor for F
where
    F: Fn(&Invocation<'_>, Continuation<'_>) -> Result<R, CommandError> + Send + Sync,
    R: Into<Outcome>,
{
    fn intercept(
        &self,
        invocation: &Invocation<'_>,
        next: Continuation<'_>,
    ) -> Result<Outcome, CommandError> {
        self(invocation, next).map(Into::into)
    }
}

/// A node of the command tree: its arguments, sub-commands, interceptor and target.
///
/// ### Example
/// ```
/// # use arbor_engine as arbor;
/// use arbor::{Argument, Command, ValueType};
///
/// let add = Command::new("add")
///     .about("Add two numbers.")
///     .add(Argument::operand("x", ValueType::int()))
///     .add(Argument::operand("y", ValueType::int()))
///     .target(|invocation: &arbor::Invocation| {
///         let x: i64 = invocation.value("x")?;
///         let y: i64 = invocation.value("y")?;
///         invocation.console().print(format!("{}", x + y));
///         Ok(())
///     });
/// let calculator = Command::new("calculator").subcommand(add);
///
/// assert!(calculator.find_subcommand("add").is_some());
/// ```
#[derive(Clone)]
pub struct Command {
    name: String,
    about: Option<String>,
    arguments: Vec<ArgumentNode>,
    subcommands: Vec<Command>,
    interceptor: Option<Arc<dyn Interceptor>>,
    target: Option<Arc<dyn Target>>,
    captures_separated: bool,
    ignore_unexpected_operands: Option<bool>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands)
            .field("interceptor", &self.interceptor.is_some())
            .field("target", &self.target.is_some())
            .field("captures_separated", &self.captures_separated)
            .field("ignore_unexpected_operands", &self.ignore_unexpected_operands)
            .finish()
    }
}

impl Command {
    /// Create a command without arguments, sub-commands or handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            arguments: Vec::default(),
            subcommands: Vec::default(),
            interceptor: None,
            target: None,
            captures_separated: false,
            ignore_unexpected_operands: None,
        }
    }

    /// Document the command.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Add an argument (or argument group).
    ///
    /// The order of operands corresponds to their positional order during parsing.
    /// The order of options does not affect parsing.
    pub fn add(mut self, argument: impl Into<ArgumentNode>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Add a sub-command.
    pub fn subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
        self
    }

    /// Capture every token after a bare `--` as a literal separated argument.
    /// Applies to this command and its sub-commands.
    pub fn capture_separated_arguments(mut self) -> Self {
        self.captures_separated = true;
        self
    }

    /// Keep unexpected operands as remaining operands (`true`) or fail on them (`false`).
    /// Overrides the application setting for this command and its sub-commands.
    pub fn ignore_unexpected_operands(mut self, enabled: bool) -> Self {
        self.ignore_unexpected_operands.replace(enabled);
        self
    }

    /// Set the executable body.
    /// If repeated, only the final target will apply.
    pub fn target<F, R>(mut self, target: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<R, CommandError> + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.target.replace(Arc::new(target));
        self
    }

    /// Set the interceptor wrapping this command's target and every sub-command.
    /// If repeated, only the final interceptor will apply.
    pub fn interceptor<F, R>(mut self, interceptor: F) -> Self
    where
        F: Fn(&Invocation<'_>, Continuation<'_>) -> Result<R, CommandError>
            + Send
            + Sync
            + 'static,
        R: Into<Outcome>,
    {
        self.interceptor.replace(Arc::new(interceptor));
        self
    }

    /// Rename this command, its arguments and every sub-command with the [`Case`] convention.
    pub fn with_case(mut self, case: Case) -> Self {
        self.rename(case);
        self
    }

    fn rename(&mut self, case: Case) {
        self.name = case.convert(&self.name);

        for node in self.arguments.iter_mut() {
            node.rename(case);
        }

        for subcommand in self.subcommands.iter_mut() {
            subcommand.rename(case);
        }
    }

    /// The name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The about message.
    pub fn description(&self) -> Option<&str> {
        self.about.as_deref()
    }

    /// The argument tree, in declaration order.
    pub fn arguments(&self) -> &[ArgumentNode] {
        &self.arguments
    }

    /// The sub-commands, in declaration order.
    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    /// Find the direct sub-command called `name`.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands
            .iter()
            .find(|subcommand| subcommand.name == name)
    }

    /// Whether a bare `--` starts separated arguments.
    pub fn captures_separated(&self) -> bool {
        self.captures_separated
    }

    /// The explicit unexpected-operand policy of this command, if any.
    pub fn unexpected_operands_policy(&self) -> Option<bool> {
        self.ignore_unexpected_operands
    }

    pub(crate) fn target_handler(&self) -> Option<&dyn Target> {
        self.target.as_deref()
    }

    pub(crate) fn interceptor_handler(&self) -> Option<&dyn Interceptor> {
        self.interceptor.as_deref()
    }

    pub(crate) fn flat_arguments(&self) -> Vec<FlatArgument<'_>> {
        flatten(&self.arguments)
    }

    pub(crate) fn options(&self) -> Vec<FlatArgument<'_>> {
        self.flat_arguments()
            .into_iter()
            .filter(|flat| flat.argument.is_option())
            .collect()
    }

    pub(crate) fn operands(&self) -> Vec<FlatArgument<'_>> {
        self.flat_arguments()
            .into_iter()
            .filter(|flat| flat.argument.is_operand())
            .collect()
    }

    /// Check the command tree for declaration problems.
    /// Run before any parsing, so a misconfigured tree never reaches the tokenizer.
    /// Every problem found in the tree is reported in the one error, a line each.
    pub(crate) fn validate(
        &self,
        registry: &ConverterRegistry,
        settings: &AppSettings,
    ) -> Result<(), ConfigError> {
        let mut problems = Vec::default();
        self.validate_at(&mut Vec::default(), registry, settings, &mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(problems.join("\n")))
        }
    }

    fn validate_at<'t>(
        &'t self,
        inherited: &mut Vec<FlatArgument<'t>>,
        registry: &ConverterRegistry,
        settings: &AppSettings,
        problems: &mut Vec<String>,
    ) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Validating command '{}'.", self.name);
        }

        let unordered = unordered_members(&self.arguments);

        if !unordered.is_empty() {
            problems.push(format!(
                "command '{}' has group operands without an unambiguous order: {}.",
                self.name,
                unordered.join(", ")
            ));
        }

        if let Err(error) = self.validate_piped() {
            problems.push(error.message().to_string());
        }

        let flat = self.flat_arguments();
        let mut names: HashSet<&str> = HashSet::default();
        let mut shorts: HashSet<char> = HashSet::default();

        if settings.help() {
            names.insert(HELP_NAME);
            shorts.insert(HELP_SHORT);
        }

        for visible in inherited.iter() {
            names.insert(visible.argument.name());

            if let Some(short) = visible.argument.short_name() {
                shorts.insert(short);
            }
        }

        for FlatArgument { argument, .. } in flat.iter() {
            if !names.insert(argument.name()) {
                problems.push(format!(
                    "command '{}' declares '{}' more than once.",
                    self.name,
                    argument.name()
                ));
            }

            if let Some(short) = argument.short_name() {
                if !shorts.insert(short) {
                    problems.push(format!(
                        "command '{}' declares the short option '-{short}' more than once.",
                        self.name
                    ));
                }
            }

            if argument.is_piped() && !argument.value_type().is_collection() {
                problems.push(format!(
                    "'{}' receives piped input, so it must be a collection.",
                    argument.identifier()
                ));
            }

            if let ScalarType::Custom(tag) = argument.value_type().scalar() {
                if !registry.contains(tag) {
                    problems.push(format!(
                        "'{}' uses the unregistered type '{tag}'.",
                        argument.identifier()
                    ));
                    // Its defaults cannot be checked without a converter.
                    continue;
                }
            }

            if let Some(defaults) = argument.default() {
                if !argument.value_type().is_collection() && defaults.len() != 1 {
                    problems.push(format!(
                        "'{}' is not a collection, but declares {} default values.",
                        argument.identifier(),
                        defaults.len()
                    ));
                }

                if let Some(error) = defaults
                    .iter()
                    .find_map(|raw| registry.convert(argument.value_type().scalar(), raw).err())
                {
                    problems.push(format!(
                        "'{}' has an invalid default: {error}",
                        argument.identifier()
                    ));
                }
            }
        }

        let operands: Vec<&FlatArgument> = flat
            .iter()
            .filter(|flat| flat.argument.is_operand())
            .collect();

        if let Some((_, leading)) = operands.split_last() {
            if let Some(multiple) = leading
                .iter()
                .find(|flat| flat.argument.value_type().is_collection())
            {
                problems.push(format!(
                    "command '{}' declares the collection operand '{}' before other operands; only the last operand may take many values.",
                    self.name,
                    multiple.argument.name()
                ));
            }
        }

        let mut subcommand_names: HashSet<&str> = HashSet::default();

        for subcommand in self.subcommands.iter() {
            if !subcommand_names.insert(subcommand.name()) {
                problems.push(format!(
                    "command '{}' declares the sub-command '{}' more than once.",
                    self.name,
                    subcommand.name()
                ));
            }
        }

        let depth = inherited.len();
        inherited.extend(
            flat.into_iter()
                .filter(|flat| flat.argument.is_subcommands_only()),
        );

        for subcommand in self.subcommands.iter() {
            subcommand.validate_at(inherited, registry, settings, problems);
        }

        inherited.truncate(depth);
    }

    /// Check that at most one argument of this command receives piped input.
    pub(crate) fn validate_piped(&self) -> Result<(), ConfigError> {
        let piped: Vec<String> = self
            .flat_arguments()
            .into_iter()
            .filter(|flat| flat.argument.is_piped())
            .map(|flat| flat.argument.identifier())
            .collect();

        if piped.len() > 1 {
            Err(ConfigError(format!(
                "command '{}' declares more than one piped input argument: {}.",
                self.name,
                piped.join(", ")
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Argument, ArgumentGroup, ValueType};
    use crate::test::assert_contains;
    use rstest::rstest;

    fn validate(command: &Command) -> Result<(), ConfigError> {
        command.validate(&ConverterRegistry::default(), &AppSettings::default())
    }

    #[test]
    fn validate_ok() {
        // Setup
        let command = Command::new("program")
            .add(Argument::flag("verbose").short('v'))
            .add(Argument::operand("x", ValueType::int()))
            .add(Argument::operand("rest", ValueType::text().collection()))
            .subcommand(Command::new("sub").add(Argument::flag("verbose")));

        // Execute & verify
        assert_matches!(validate(&command), Ok(()));
    }

    #[rstest]
    #[case(
        Command::new("program").add(Argument::flag("a")).add(Argument::flag("a")),
        "'a' more than once"
    )]
    #[case(
        Command::new("program").add(Argument::flag("a").short('x')).add(Argument::flag("b").short('x')),
        "'-x' more than once"
    )]
    #[case(Command::new("program").add(Argument::flag("help")), "'help' more than once")]
    #[case(Command::new("program").add(Argument::flag("hard").short('h')), "'-h' more than once")]
    #[case(
        Command::new("program").subcommand(Command::new("s")).subcommand(Command::new("s")),
        "sub-command 's' more than once"
    )]
    #[case(
        Command::new("program")
            .add(Argument::operand("many", ValueType::int().collection()))
            .add(Argument::operand("one", ValueType::int())),
        "collection operand 'many'"
    )]
    #[case(
        Command::new("program").add(Argument::operand("x", ValueType::int()).piped()),
        "'x' receives piped input"
    )]
    #[case(
        Command::new("program").add(Argument::option("x", ValueType::custom("ip"))),
        "unregistered type 'ip'"
    )]
    #[case(
        Command::new("program").add(Argument::option("x", ValueType::int()).default_value("one")),
        "'--x' has an invalid default"
    )]
    #[case(
        Command::new("program").add(Argument::option("x", ValueType::int()).default_values(["1", "2"])),
        "declares 2 default values"
    )]
    fn validate_invalid(#[case] command: Command, #[case] expected: &str) {
        // Execute
        let result = validate(&command);

        // Verify
        let error = result.unwrap_err();
        assert_contains!(error.to_string(), expected);
    }

    #[test]
    fn validate_inherited_collision() {
        // Setup
        let command = Command::new("program")
            .add(Argument::flag("dry-run").assign_to_executable_subcommands())
            .add(Argument::flag("quiet"))
            .subcommand(
                Command::new("sub")
                    .add(Argument::flag("quiet"))
                    .add(Argument::flag("dry-run")),
            );

        // Execute
        let error = validate(&command).unwrap_err();

        // Verify
        assert_eq!(error.message(), "command 'sub' declares 'dry-run' more than once.");
    }

    #[test]
    fn validate_help_disabled() {
        let command = Command::new("program").add(Argument::flag("help").short('h'));
        let settings = AppSettings::default().help_option(false);
        assert_matches!(command.validate(&ConverterRegistry::default(), &settings), Ok(()));
    }

    #[test]
    fn validate_unordered_group() {
        // Setup
        let command = Command::new("program").add(
            ArgumentGroup::new("range")
                .add(Argument::operand("start", ValueType::int()))
                .add(Argument::operand("end", ValueType::int())),
        );

        // Execute
        let error = validate(&command).unwrap_err();

        // Verify
        assert_contains!(error.message(), "range.start, range.end");
    }

    #[test]
    fn validate_piped() {
        // Setup
        let command = Command::new("program")
            .add(Argument::operand("lines", ValueType::text().collection()).piped())
            .add(Argument::option("extra", ValueType::text().collection()).piped());

        // Execute
        let error = command.validate_piped().unwrap_err();
        let tree_error = validate(&command).unwrap_err();

        // Verify
        assert_contains!(error.message(), "lines, --extra");
        assert_contains!(tree_error.message(), "lines, --extra");
    }

    #[test]
    fn validate_reports_every_problem() {
        // Setup
        let command = Command::new("program")
            .add(Argument::flag("a"))
            .add(Argument::flag("a"))
            .subcommand(
                Command::new("sub")
                    .add(Argument::option("x", ValueType::int()).default_value("one"))
                    .add(Argument::operand("y", ValueType::int()).piped()),
            );

        // Execute
        let error = validate(&command).unwrap_err();

        // Verify
        let lines: Vec<&str> = error.message().lines().collect();
        assert_eq!(
            lines,
            vec![
                "command 'program' declares 'a' more than once.",
                "'--x' has an invalid default: cannot convert 'one' to Integer.",
                "'y' receives piped input, so it must be a collection.",
            ]
        );
    }

    #[test]
    fn with_case() {
        // Setup
        let command = Command::new("RootCommand")
            .add(Argument::option("dryRun", ValueType::bool()))
            .add(ArgumentGroup::new("g").add(Argument::option("maxCount", ValueType::int())))
            .subcommand(Command::new("ListItems"));

        // Execute
        let command = command.with_case(Case::Kebab);

        // Verify
        assert_eq!(command.name(), "root-command");
        let names: Vec<&str> = command
            .flat_arguments()
            .iter()
            .map(|flat| flat.argument.name())
            .collect();
        assert_eq!(names, vec!["dry-run", "max-count"]);
        assert!(command.find_subcommand("list-items").is_some());
    }

    #[test]
    fn outcome() {
        assert_eq!(Outcome::from(()).exit_code(), 0);
        assert_eq!(Outcome::from(7).exit_code(), 7);
    }
}
