/// The allowed number of values for an argument.
///
/// Derived from the argument's declaration (see [`Argument`](crate::Argument)):
/// * no default and a non-nullable scalar type: `Range(1, 1)`.
/// * a default, or a nullable type: `Range(0, 1)`.
/// * a collection type: `Lower(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Between the first and second value counts (inclusive).
    Range(usize, usize),
    /// At least this many values, unbounded above.
    Lower(usize),
}

impl Arity {
    /// The fewest values that satisfy this arity.
    pub const fn minimum(&self) -> usize {
        match self {
            Arity::Range(minimum, _) => *minimum,
            Arity::Lower(minimum) => *minimum,
        }
    }

    /// The most values that satisfy this arity, `None` meaning unbounded.
    pub const fn maximum(&self) -> Option<usize> {
        match self {
            Arity::Range(_, maximum) => Some(*maximum),
            Arity::Lower(_) => None,
        }
    }

    /// Whether more than one value may be bound.
    pub fn allows_many(&self) -> bool {
        self.maximum().map_or(true, |maximum| maximum > 1)
    }

    /// Whether `count` values satisfy this arity.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.minimum() && self.maximum().map_or(true, |maximum| count <= maximum)
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.maximum() {
            Some(maximum) => write!(f, "[{}, {maximum}]", self.minimum()),
            None => write!(f, "[{}, ∞)", self.minimum()),
        }
    }
}

/// How a boolean option reads its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BooleanMode {
    /// Presence means `true`, absence `false`.
    /// A value may only be given inline (ex: `--flag=false`).
    #[default]
    Implicit,
    /// Presence must be followed by a literal `true` or `false`.
    Explicit,
}

/// Naming convention applied to a command tree at construction time.
///
/// See [`Command::with_case`](crate::Command::with_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Case {
    /// Names are kept as declared.
    #[default]
    Unchanged,
    /// `dryRun`
    Camel,
    /// `DryRun`
    Pascal,
    /// `dry-run`
    Kebab,
    /// `dryrun`
    Lower,
}

impl Case {
    /// Convert a declared name to this convention.
    ///
    /// ### Example
    /// ```
    /// # use arbor_engine as arbor;
    /// use arbor::Case;
    ///
    /// assert_eq!(Case::Kebab.convert("DryRun"), "dry-run");
    /// assert_eq!(Case::Camel.convert("dry_run"), "dryRun");
    /// ```
    pub fn convert(&self, name: &str) -> String {
        match self {
            Case::Unchanged => name.to_string(),
            Case::Lower => name.to_lowercase(),
            Case::Kebab => words(name)
                .iter()
                .map(|word| word.to_lowercase())
                .collect::<Vec<String>>()
                .join("-"),
            Case::Camel => words(name)
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    if i == 0 {
                        word.to_lowercase()
                    } else {
                        capitalize(word)
                    }
                })
                .collect(),
            Case::Pascal => words(name).iter().map(|word| capitalize(word)).collect(),
        }
    }
}

fn words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::default();
    let mut current = String::default();

    for (i, c) in chars.iter().enumerate() {
        if matches!(c, '-' | '_' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let previous = chars[i - 1];
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());

            // Breaks `dryRun` into `dry Run` and `HTTPServer` into `HTTP Server`.
            if previous.is_lowercase()
                || previous.is_ascii_digit()
                || (previous.is_uppercase() && next_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(*c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    #[rstest]
    #[case(Arity::Range(0, 0), 0, true)]
    #[case(Arity::Range(0, 0), 1, false)]
    #[case(Arity::Range(0, 1), 0, true)]
    #[case(Arity::Range(1, 1), 0, false)]
    #[case(Arity::Range(1, 1), 1, true)]
    #[case(Arity::Range(1, 1), 2, false)]
    #[case(Arity::Lower(0), 0, true)]
    #[case(Arity::Lower(0), 10, true)]
    #[case(Arity::Lower(1), 0, false)]
    fn arity_accepts(#[case] arity: Arity, #[case] count: usize, #[case] expected: bool) {
        assert_eq!(arity.accepts(count), expected);
    }

    #[test]
    fn arity_allows_many() {
        for _ in 0..100 {
            let minimum: usize = thread_rng().gen_range(0..10);
            let maximum: usize = thread_rng().gen_range(minimum..20);
            assert_eq!(Arity::Range(minimum, maximum).allows_many(), maximum > 1);
            assert!(Arity::Lower(minimum).allows_many());
        }
    }

    #[test]
    fn arity_display() {
        assert_eq!(Arity::Range(1, 1).to_string(), "[1, 1]");
        assert_eq!(Arity::Lower(0).to_string(), "[0, ∞)");
    }

    #[rstest]
    #[case("DryRun", Case::Kebab, "dry-run")]
    #[case("dryRun", Case::Kebab, "dry-run")]
    #[case("dry_run", Case::Kebab, "dry-run")]
    #[case("HTTPServer", Case::Kebab, "http-server")]
    #[case("max2Count", Case::Kebab, "max2-count")]
    #[case("dry-run", Case::Camel, "dryRun")]
    #[case("DryRun", Case::Camel, "dryRun")]
    #[case("dry-run", Case::Pascal, "DryRun")]
    #[case("max_count", Case::Pascal, "MaxCount")]
    #[case("DryRun", Case::Lower, "dryrun")]
    #[case("Dry_Run", Case::Unchanged, "Dry_Run")]
    fn case_convert(#[case] name: &str, #[case] case: Case, #[case] expected: &str) {
        assert_eq!(case.convert(name), expected);
    }
}
