/// A classified command line token.
///
/// Directives never appear here: they are split out of the stream before classification and kept in
/// [`TokenStream::directives`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Descend into the named sub-command.
    Subcommand(String),
    /// An option, by its (long) name, whether it was written long, short or clubbed.
    OptionFlag(String),
    /// A value belonging to the preceding option flag.
    OptionValue(String),
    /// A positional value.
    OperandValue(String),
    /// The bare `--`; everything after it is a separated argument.
    Separator,
}

/// A bracketed `[key]` or `[key:value]` token preceding the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The name before the `:`.
    pub key: String,
    /// The text after the `:`, when present.
    pub value: Option<String>,
}

impl Directive {
    pub(crate) fn parse(token: &str) -> Option<Self> {
        let inner = token.strip_prefix('[')?.strip_suffix(']')?;

        if inner.is_empty() || inner.starts_with(char::is_whitespace) {
            return None;
        }

        Some(match inner.split_once(':') {
            Some((key, value)) => Directive {
                key: key.to_string(),
                value: Some(value.to_string()),
            },
            None => Directive {
                key: inner.to_string(),
                value: None,
            },
        })
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "[{}:{value}]", self.key),
            None => write!(f, "[{}]", self.key),
        }
    }
}

/// The output of tokenization.
///
/// Each token remembers the index of the command line argument it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub(crate) directives: Vec<Directive>,
    pub(crate) tokens: Vec<(usize, Token)>,
    pub(crate) separated: Vec<String>,
    pub(crate) help: bool,
}

impl TokenStream {
    /// The leading directives, in order.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Find the value of the first directive called `key`.
    /// A directive without a value yields `Some("")`.
    pub fn directive(&self, key: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|directive| directive.key == key)
            .map(|directive| directive.value.as_deref().unwrap_or(""))
    }

    /// The classified tokens with their argument index.
    pub fn tokens(&self) -> &[(usize, Token)] {
        &self.tokens
    }

    /// The literal arguments after the separator.
    pub fn separated_arguments(&self) -> &[String] {
        &self.separated
    }

    /// Whether `-h`/`--help` was given.
    /// Tokenization stops at the help flag.
    pub fn help_requested(&self) -> bool {
        self.help
    }

    /// The names of the sub-commands descended into, in order.
    pub fn subcommand_path(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter_map(|(_, token)| match token {
                Token::Subcommand(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}
