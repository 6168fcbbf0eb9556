use crate::api::{Shape, ValueType};
use crate::model::{Arity, BooleanMode, Case};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ArgumentClass {
    Opt,
    Operand,
}

/// A declared option (`--name`/`-n`) or operand (positional) of a [`Command`](crate::Command).
///
/// The [`Arity`] is derived from the value type and default:
/// a non-nullable scalar without a default is required, everything else is not.
///
/// ### Example
/// ```
/// # use arbor_engine as arbor;
/// use arbor::{Argument, Arity, BooleanMode, ValueType};
///
/// let x = Argument::operand("x", ValueType::int());
/// let operator = Argument::option("operator", ValueType::text())
///     .short('o')
///     .default_value("+");
///
/// assert_eq!(x.arity(BooleanMode::Implicit), Arity::Range(1, 1));
/// assert_eq!(operator.arity(BooleanMode::Implicit), Arity::Range(0, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    class: ArgumentClass,
    name: String,
    short: Option<char>,
    value_type: ValueType,
    default: Option<Vec<String>>,
    boolean_mode: Option<BooleanMode>,
    split: Option<char>,
    piped: bool,
    subcommands_only: bool,
    group_tag: Option<String>,
    help: Option<String>,
    order: Option<u32>,
}

impl Argument {
    fn new(class: ArgumentClass, name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            class,
            name: name.into(),
            short: None,
            value_type,
            default: None,
            boolean_mode: None,
            split: None,
            piped: false,
            subcommands_only: false,
            group_tag: None,
            help: None,
            order: None,
        }
    }

    /// Declare a positional operand.
    /// Operands bind in declaration order.
    pub fn operand(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(ArgumentClass::Operand, name, value_type)
    }

    /// Declare a named option, matched by `--name` (and `-s` when given a [`Argument::short`]).
    pub fn option(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(ArgumentClass::Opt, name, value_type)
    }

    /// Declare a boolean option.
    /// Under [`BooleanMode::Implicit`] this is a no-value flag: present is `true`, absent is `false`.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::option(name, ValueType::bool())
    }

    /// Set the single-character alias of an option.
    /// Has no effect on operands.
    pub fn short(mut self, short: char) -> Self {
        self.short.replace(short);
        self
    }

    /// Document the argument.
    /// If repeated, only the final message will apply.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.help.replace(description.into());
        self
    }

    /// Set the default value, converted like any token when the argument is not supplied.
    pub fn default_value(mut self, raw: impl Into<String>) -> Self {
        self.default.replace(vec![raw.into()]);
        self
    }

    /// Set the default values of a collection argument.
    pub fn default_values<S: Into<String>>(mut self, raws: impl IntoIterator<Item = S>) -> Self {
        self.default
            .replace(raws.into_iter().map(Into::into).collect());
        self
    }

    /// Override the application's [`BooleanMode`] for this (boolean) option.
    pub fn boolean_mode(mut self, mode: BooleanMode) -> Self {
        self.boolean_mode.replace(mode);
        self
    }

    /// Split each value of this (collection) option on `delimiter`.
    /// For example, with `:` the token `a:b:c` yields the values `a`, `b`, `c`.
    pub fn split(mut self, delimiter: char) -> Self {
        self.split.replace(delimiter);
        self
    }

    /// Mark this (collection) argument as the receiver of piped standard input lines.
    pub fn piped(mut self) -> Self {
        self.piped = true;
        self
    }

    /// Bind this option normally, but only show it to the executable (target) sub-command.
    /// Interceptors of the declaring command do not see it, and it stays recognisable after descending into sub-commands.
    pub fn assign_to_executable_subcommands(mut self) -> Self {
        self.subcommands_only = true;
        self
    }

    /// Tag the argument with a display group (affects help output only).
    pub fn group_tag(mut self, tag: impl Into<String>) -> Self {
        self.group_tag.replace(tag.into());
        self
    }

    /// Declare the position of this argument within an [`ArgumentGroup`].
    /// Required for every operand member of a group.
    pub fn order(mut self, order: u32) -> Self {
        self.order.replace(order);
        self
    }

    /// The (long) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The single-character alias.
    pub fn short_name(&self) -> Option<char> {
        match self.class {
            ArgumentClass::Opt => self.short,
            ArgumentClass::Operand => None,
        }
    }

    /// The declared value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The raw default values.
    pub fn default(&self) -> Option<&[String]> {
        self.default.as_deref()
    }

    /// The split delimiter.
    pub fn split_delimiter(&self) -> Option<char> {
        self.split
    }

    /// Whether this argument receives piped input.
    pub fn is_piped(&self) -> bool {
        self.piped
    }

    /// Whether this option is only visible to the executable sub-command.
    pub fn is_subcommands_only(&self) -> bool {
        self.class == ArgumentClass::Opt && self.subcommands_only
    }

    /// The display group tag.
    pub fn display_group(&self) -> Option<&str> {
        self.group_tag.as_deref()
    }

    /// The help message.
    pub fn description(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The declared order within a group.
    pub fn declared_order(&self) -> Option<u32> {
        self.order
    }

    /// Whether this is an option.
    pub fn is_option(&self) -> bool {
        self.class == ArgumentClass::Opt
    }

    /// Whether this is an operand.
    pub fn is_operand(&self) -> bool {
        self.class == ArgumentClass::Operand
    }

    /// The boolean mode, falling back to `default` when not overridden.
    pub fn boolean_mode_or(&self, default: BooleanMode) -> BooleanMode {
        self.boolean_mode.unwrap_or(default)
    }

    /// Whether this option takes no value token (an implicit boolean).
    pub fn is_flag(&self, default: BooleanMode) -> bool {
        self.is_option()
            && self.value_type.is_bool()
            && self.boolean_mode_or(default) == BooleanMode::Implicit
    }

    /// The allowed number of values.
    pub fn arity(&self, default: BooleanMode) -> Arity {
        match self.value_type.shape() {
            Shape::Collection => Arity::Lower(0),
            Shape::Nullable => Arity::Range(0, 1),
            Shape::Scalar => {
                if self.default.is_some() || self.is_flag(default) {
                    Arity::Range(0, 1)
                } else {
                    Arity::Range(1, 1)
                }
            }
        }
    }

    /// How the argument is named in messages: `--name` for options, `name` for operands.
    pub fn identifier(&self) -> String {
        match self.class {
            ArgumentClass::Opt => format!("--{}", self.name),
            ArgumentClass::Operand => self.name.clone(),
        }
    }

    pub(crate) fn rename(&mut self, case: Case) {
        self.name = case.convert(&self.name);
    }
}

/// A composite argument: its members are flattened into the command's arguments as if declared inline.
///
/// Operand members (and nested groups containing operands) must declare an [`Argument::order`]
/// so their positions are unambiguous.
///
/// ### Example
/// ```
/// # use arbor_engine as arbor;
/// use arbor::{Argument, ArgumentGroup, ValueType};
///
/// let range = ArgumentGroup::new("range")
///     .add(Argument::operand("end", ValueType::int()).order(2))
///     .add(Argument::operand("start", ValueType::int()).order(1))
///     .add(Argument::option("step", ValueType::int()).default_value("1"));
/// # let _ = range;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentGroup {
    name: String,
    order: Option<u32>,
    members: Vec<ArgumentNode>,
}

impl ArgumentGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: None,
            members: Vec::default(),
        }
    }

    /// Add a member argument or nested group.
    pub fn add(mut self, member: impl Into<ArgumentNode>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Declare the position of this group within its parent group.
    pub fn order(mut self, order: u32) -> Self {
        self.order.replace(order);
        self
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The members, in declaration order.
    pub fn members(&self) -> &[ArgumentNode] {
        &self.members
    }

    fn contains_operands(&self) -> bool {
        self.members.iter().any(|member| match member {
            ArgumentNode::Argument(argument) => argument.is_operand(),
            ArgumentNode::Group(group) => group.contains_operands(),
        })
    }
}

/// A node of a command's argument tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentNode {
    /// A single option or operand.
    Argument(Argument),
    /// A nested group of arguments.
    Group(ArgumentGroup),
}

impl ArgumentNode {
    fn order(&self) -> Option<u32> {
        match self {
            ArgumentNode::Argument(argument) => argument.order,
            ArgumentNode::Group(group) => group.order,
        }
    }

    pub(crate) fn rename(&mut self, case: Case) {
        match self {
            ArgumentNode::Argument(argument) => argument.rename(case),
            ArgumentNode::Group(group) => {
                for member in group.members.iter_mut() {
                    member.rename(case);
                }
            }
        }
    }
}

impl From<Argument> for ArgumentNode {
    fn from(value: Argument) -> Self {
        ArgumentNode::Argument(value)
    }
}

impl From<ArgumentGroup> for ArgumentNode {
    fn from(value: ArgumentGroup) -> Self {
        ArgumentNode::Group(value)
    }
}

/// An argument after group flattening, remembering the group path it was declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FlatArgument<'t> {
    pub argument: &'t Argument,
    pub group: Option<&'t str>,
}

/// Flatten the argument tree.
/// Top level nodes keep declaration order; group members are ordered by their declared order.
pub(crate) fn flatten(nodes: &[ArgumentNode]) -> Vec<FlatArgument<'_>> {
    let mut out = Vec::default();
    flatten_into(nodes, None, false, &mut out);
    out
}

fn flatten_into<'t>(
    nodes: &'t [ArgumentNode],
    group: Option<&'t str>,
    sort: bool,
    out: &mut Vec<FlatArgument<'t>>,
) {
    let mut ordered: Vec<&ArgumentNode> = nodes.iter().collect();

    if sort {
        // Stable, so un-ordered options keep declaration order at the tail.
        ordered.sort_by_key(|node| node.order().unwrap_or(u32::MAX));
    }

    for node in ordered {
        match node {
            ArgumentNode::Argument(argument) => out.push(FlatArgument { argument, group }),
            ArgumentNode::Group(inner) => {
                // Members report the top-most group they belong to.
                flatten_into(&inner.members, group.or(Some(inner.name.as_str())), true, out)
            }
        }
    }
}

/// Find every operand-like group member whose position is unordered or ambiguous.
/// Returns dotted paths, such as `range.start`.
pub(crate) fn unordered_members(nodes: &[ArgumentNode]) -> Vec<String> {
    let mut out = Vec::default();

    for node in nodes {
        if let ArgumentNode::Group(group) = node {
            collect_unordered(group, group.name.clone(), &mut out);
        }
    }

    out
}

fn collect_unordered(group: &ArgumentGroup, path: String, out: &mut Vec<String>) {
    let mut seen: Vec<u32> = Vec::default();

    for member in &group.members {
        let (name, operand_like) = match member {
            ArgumentNode::Argument(argument) => (argument.name.as_str(), argument.is_operand()),
            ArgumentNode::Group(inner) => (inner.name.as_str(), inner.contains_operands()),
        };

        if operand_like {
            match member.order() {
                Some(order) if !seen.contains(&order) => seen.push(order),
                _ => out.push(format!("{path}.{name}")),
            }
        }

        if let ArgumentNode::Group(inner) = member {
            collect_unordered(inner, format!("{path}.{}", inner.name), out);
        }
    }
}
