use crate::api::{AppSettings, Argument, Command};
use crate::constant::{HELP_NAME, HELP_SHORT, SUGGESTION_DISTANCE};

/// What an option name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolved<'t> {
    Help,
    Argument {
        /// Index into the command path of the command declaring the option.
        level: usize,
        argument: &'t Argument,
    },
}

/// The options recognisable at the deepest command of a path.
///
/// These are the command's own options, the "executable sub-commands only" options of its ancestors, and help.
#[derive(Debug)]
pub(crate) struct Scope<'t> {
    visible: Vec<(usize, &'t Argument)>,
    subcommands: Vec<&'t str>,
    help: bool,
}

impl<'t> Scope<'t> {
    pub(crate) fn new(path: &[&'t Command], settings: &AppSettings) -> Self {
        let mut visible = Vec::default();
        let mut subcommands = Vec::default();

        if let Some((current, ancestors)) = path.split_last() {
            let level = ancestors.len();
            visible.extend(
                current
                    .options()
                    .into_iter()
                    .map(|flat| (level, flat.argument)),
            );

            for (level, ancestor) in ancestors.iter().enumerate().rev() {
                visible.extend(
                    ancestor
                        .options()
                        .into_iter()
                        .filter(|flat| flat.argument.is_subcommands_only())
                        .map(|flat| (level, flat.argument)),
                );
            }

            subcommands.extend(current.subcommands().iter().map(Command::name));
        }

        Self {
            visible,
            subcommands,
            help: settings.help(),
        }
    }

    pub(crate) fn resolve_long(&self, name: &str) -> Option<Resolved<'t>> {
        self.visible
            .iter()
            .find(|(_, argument)| argument.name() == name)
            .map(|&(level, argument)| Resolved::Argument { level, argument })
            .or_else(|| (self.help && name == HELP_NAME).then_some(Resolved::Help))
    }

    pub(crate) fn resolve_short(&self, short: char) -> Option<Resolved<'t>> {
        self.visible
            .iter()
            .find(|(_, argument)| argument.short_name() == Some(short))
            .map(|&(level, argument)| Resolved::Argument { level, argument })
            .or_else(|| (self.help && short == HELP_SHORT).then_some(Resolved::Help))
    }

    /// The closest visible option to `name` (written without its prefix), as `--option`.
    pub(crate) fn suggest_option(&self, name: &str) -> Option<String> {
        let help = self.help.then_some(HELP_NAME);
        closest(
            name,
            self.visible
                .iter()
                .map(|(_, argument)| argument.name())
                .chain(help),
        )
        .map(|candidate| format!("--{candidate}"))
    }

    /// The closest sub-command name to `token`.
    pub(crate) fn suggest_subcommand(&self, token: &str) -> Option<String> {
        closest(token, self.subcommands.iter().copied()).map(str::to_string)
    }
}

fn closest<'a>(target: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .map(|candidate| (edit_distance(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// The Levenshtein distance between two strings, by character.
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();

    for (i, x) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];

        for (j, y) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(x != *y);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }

        previous = current;
    }

    previous[b.len()]
}
