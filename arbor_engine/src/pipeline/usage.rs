use crate::api::{AppSettings, Argument, Command};
use crate::constant::{HELP_NAME, HELP_SHORT};
use crate::model::Arity;

const HELP_MESSAGE: &str = "Show this help message and exit.";
const INDENT: &str = " ";
const PADDING: usize = 3;

/// The usage of the last command on `path`: a summary line, then its operands, options and sub-commands.
///
/// Options are listed under their display group, when declared.
pub(crate) fn usage(path: &[&Command], settings: &AppSettings) -> String {
    let program = path
        .iter()
        .map(|command| command.name())
        .collect::<Vec<&str>>()
        .join(" ");
    let command = match path.last() {
        Some(command) => *command,
        None => return format!("usage: {program}"),
    };
    let mode = settings.default_boolean_mode();
    let operands: Vec<&Argument> = command
        .operands()
        .into_iter()
        .map(|flat| flat.argument)
        .collect();
    let mut options: Vec<&Argument> = command
        .options()
        .into_iter()
        .map(|flat| flat.argument)
        .collect();

    for ancestor in path.iter().rev().skip(1) {
        options.extend(
            ancestor
                .options()
                .into_iter()
                .map(|flat| flat.argument)
                .filter(|argument| argument.is_subcommands_only()),
        );
    }

    let mut summary = vec![format!("usage: {program}")];

    if settings.help() {
        summary.push(format!("[-{HELP_SHORT}]"));
    }

    for option in &options {
        let flag = match option.short_name() {
            Some(short) => format!("-{short}"),
            None => format!("--{}", option.name()),
        };
        summary.push(format!("[{flag}{}]", option_grammar(option, mode)));
    }

    for operand in &operands {
        summary.push(operand_grammar(operand, mode));
    }

    if !command.subcommands().is_empty() {
        summary.push("{ ... }".to_string());
    }

    let mut sections: Vec<(String, Vec<(String, String)>)> = Vec::default();

    if !operands.is_empty() {
        let rows = operands
            .iter()
            .map(|operand| (operand_grammar(operand, mode), describe(operand)))
            .collect();
        sections.push(("positional arguments:".to_string(), rows));
    }

    let mut general: Vec<(String, String)> = Vec::default();

    if settings.help() {
        general.push((
            format!("-{HELP_SHORT}, --{HELP_NAME}"),
            HELP_MESSAGE.to_string(),
        ));
    }

    let mut grouped: Vec<(String, Vec<(String, String)>)> = Vec::default();

    for option in &options {
        let grammar = option_grammar(option, mode);
        let flags = match option.short_name() {
            Some(short) => format!("-{short}{grammar}, --{}{grammar}", option.name()),
            None => format!("--{}{grammar}", option.name()),
        };
        let row = (flags, describe(option));

        match option.display_group() {
            Some(tag) => match grouped.iter_mut().find(|(name, _)| name == tag) {
                Some((_, rows)) => rows.push(row),
                None => grouped.push((tag.to_string(), vec![row])),
            },
            None => general.push(row),
        }
    }

    if !general.is_empty() {
        sections.push(("options:".to_string(), general));
    }

    for (tag, rows) in grouped {
        sections.push((format!("{tag}:"), rows));
    }

    if !command.subcommands().is_empty() {
        let rows = command
            .subcommands()
            .iter()
            .map(|sub| {
                (
                    sub.name().to_string(),
                    sub.description().unwrap_or_default().to_string(),
                )
            })
            .collect();
        sections.push(("sub-commands:".to_string(), rows));
    }

    let width = sections
        .iter()
        .flat_map(|(_, rows)| rows.iter().map(|(left, _)| left.chars().count()))
        .max()
        .unwrap_or(0);
    let mut lines = vec![summary.join(" ")];

    if let Some(about) = command.description() {
        lines.push(String::default());
        lines.push(about.to_string());
    }

    for (heading, rows) in sections {
        lines.push(String::default());
        lines.push(heading);

        for (left, right) in rows {
            if right.is_empty() {
                lines.push(format!("{INDENT}{left}"));
            } else {
                lines.push(format!(
                    "{INDENT}{left:width$}{right}",
                    width = width + PADDING
                ));
            }
        }
    }

    lines.join("\n")
}

fn example(argument: &Argument) -> String {
    argument.name().to_ascii_uppercase().replace('-', "_")
}

fn option_grammar(option: &Argument, mode: crate::model::BooleanMode) -> String {
    if option.is_flag(mode) {
        return String::default();
    }

    match option.arity(mode) {
        Arity::Lower(_) => format!(" [{} ...]", example(option)),
        _ => format!(" {}", example(option)),
    }
}

fn operand_grammar(operand: &Argument, mode: crate::model::BooleanMode) -> String {
    match operand.arity(mode) {
        Arity::Lower(_) => format!("[{} ...]", example(operand)),
        Arity::Range(0, _) => format!("[{}]", example(operand)),
        _ => example(operand),
    }
}

fn describe(argument: &Argument) -> String {
    let mut description = argument.description().unwrap_or_default().to_string();

    if let Some(default) = argument.default() {
        if !description.is_empty() {
            description.push(' ');
        }

        description.push_str(&format!("(default: {})", default.join(", ")));
    }

    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ValueType;

    #[test]
    fn usage_leaf() {
        // Setup
        let command = Command::new("add")
            .about("Add two numbers.")
            .add(Argument::operand("x", ValueType::int()))
            .add(Argument::operand("y", ValueType::int().nullable()).help("Second term."))
            .add(
                Argument::option("operator", ValueType::text())
                    .short('o')
                    .default_value("+"),
            )
            .add(Argument::flag("verbose"));

        // Execute
        let message = usage(&[&command], &AppSettings::default());

        // Verify
        assert_eq!(
            message,
            r#"usage: add [-h] [-o OPERATOR] [--verbose] X [Y]

Add two numbers.

positional arguments:
 X
 [Y]                                Second term.

options:
 -h, --help                         Show this help message and exit.
 -o OPERATOR, --operator OPERATOR   (default: +)
 --verbose"#
        );
    }

    #[test]
    fn usage_subcommands() {
        // Setup
        let root = Command::new("git")
            .add(
                Argument::flag("dry-run")
                    .assign_to_executable_subcommands()
                    .group_tag("global"),
            )
            .subcommand(Command::new("commit").about("Record changes."))
            .subcommand(Command::new("push"));
        let commit = &root.subcommands()[0];

        // Execute
        let top = usage(&[&root], &AppSettings::default().help_option(false));
        let leaf = usage(&[&root, commit], &AppSettings::default().help_option(false));

        // Verify
        assert_eq!(
            top,
            r#"usage: git [--dry-run] { ... }

global:
 --dry-run

sub-commands:
 commit      Record changes.
 push"#
        );
        assert_eq!(
            leaf,
            r#"usage: git commit [--dry-run]

Record changes.

global:
 --dry-run"#
        );
    }
}
