use crate::api::{Argument, Command, Value};
use crate::tokens::Directive;

/// Where a bound value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Given on the command line.
    Explicit,
    /// The argument's declared default.
    Default,
    /// Implied by absence: `false` for a flag, empty for a collection.
    Implicit,
    /// Left to the piped input lines, which follow at invocation time; no default applies.
    Piped,
    /// Not bound at all.
    Absent,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ValueSource::Explicit => "explicit",
            ValueSource::Default => "default",
            ValueSource::Implicit => "implicit",
            ValueSource::Piped => "piped",
            ValueSource::Absent => "absent",
        };
        write!(f, "{label}")
    }
}

/// The final value of one declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<'t> {
    pub(crate) argument: &'t Argument,
    pub(crate) group: Option<&'t str>,
    pub(crate) value: Option<Value>,
    pub(crate) source: ValueSource,
}

impl<'t> Binding<'t> {
    /// The declared argument.
    pub fn argument(&self) -> &'t Argument {
        self.argument
    }

    /// The argument group this argument was declared in, if any.
    pub fn group(&self) -> Option<&'t str> {
        self.group
    }

    /// The bound value (`None` when [`ValueSource::Absent`]).
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Where the value came from.
    pub fn source(&self) -> ValueSource {
        self.source
    }
}

/// The argument receiving piped input lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipedTarget {
    pub(crate) level: usize,
    pub(crate) name: String,
    pub(crate) identifier: String,
}

impl PipedTarget {
    /// The index, in the command path, of the command declaring the argument.
    pub fn level(&self) -> usize {
        self.level
    }

    /// The argument name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The bound command line: the resolved command path and every argument's value.
///
/// Immutable once the binder produces it.
#[derive(Debug, Clone)]
pub struct ParseResult<'t> {
    pub(crate) path: Vec<&'t Command>,
    pub(crate) levels: Vec<Vec<Binding<'t>>>,
    pub(crate) remaining_operands: Vec<String>,
    pub(crate) separated_arguments: Vec<String>,
    pub(crate) piped_target: Option<PipedTarget>,
    pub(crate) directives: Vec<Directive>,
}

impl<'t> ParseResult<'t> {
    /// The commands from the root to the target.
    pub fn path(&self) -> &[&'t Command] {
        &self.path
    }

    /// The target command.
    pub fn command(&self) -> &'t Command {
        match self.path.last().copied() {
            Some(command) => command,
            None => unreachable!("internal error - the command path always contains the root."),
        }
    }

    /// The index of the target command in [`ParseResult::path`].
    pub fn target_level(&self) -> usize {
        self.path.len() - 1
    }

    /// The bindings of the command at `level`, in declaration order.
    pub fn bindings(&self, level: usize) -> &[Binding<'t>] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find the binding of `name` declared by the command at `level`.
    pub fn find(&self, level: usize, name: &str) -> Option<&Binding<'t>> {
        self.bindings(level)
            .iter()
            .find(|binding| binding.argument.name() == name)
    }

    /// Every `(command, argument, value)` assignment, in path and declaration order.
    pub fn assignments(&self) -> Vec<(&str, &str, Option<&Value>)> {
        self.path
            .iter()
            .zip(self.levels.iter())
            .flat_map(|(command, bindings)| {
                bindings
                    .iter()
                    .map(move |binding| (command.name(), binding.argument.name(), binding.value()))
            })
            .collect()
    }

    /// The operands no argument accepted (when unexpected operands are ignored).
    pub fn remaining_operands(&self) -> &[String] {
        &self.remaining_operands
    }

    /// The literal arguments after `--`.
    pub fn separated_arguments(&self) -> &[String] {
        &self.separated_arguments
    }

    /// The argument receiving piped input, if any.
    pub fn piped_target(&self) -> Option<&PipedTarget> {
        self.piped_target.as_ref()
    }

    /// The leading directives.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }
}

impl<'t> std::fmt::Display for ParseResult<'t> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.path.iter().map(|command| command.name()).collect();
        writeln!(f, "command: {}", names.join(" "))?;

        for (command, bindings) in self.path.iter().zip(self.levels.iter()) {
            for binding in bindings {
                let value = match &binding.value {
                    Some(value) => value.to_string(),
                    None => "<none>".to_string(),
                };
                writeln!(
                    f,
                    "  {} {}: {value} ({})",
                    command.name(),
                    binding.argument.identifier(),
                    binding.source
                )?;
            }
        }

        if let Some(target) = &self.piped_target {
            writeln!(f, "piped: {}", target.identifier)?;
        }

        if !self.remaining_operands.is_empty() {
            writeln!(f, "remaining: {}", self.remaining_operands.join(" "))?;
        }

        if !self.separated_arguments.is_empty() {
            writeln!(f, "separated: {}", self.separated_arguments.join(" "))?;
        }

        Ok(())
    }
}
