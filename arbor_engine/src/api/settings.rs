use crate::constant::DEFAULT_PIPE_SYMBOL;
use crate::model::BooleanMode;

/// Application-wide parsing and execution settings.
///
/// ### Example
/// ```
/// # use arbor_engine as arbor;
/// use arbor::{AppSettings, BooleanMode};
///
/// let settings = AppSettings::default()
///     .allow_slash_prefix(true)
///     .boolean_mode(BooleanMode::Explicit)
///     .pipe_symbol("%");
///
/// assert!(settings.slash_prefix());
/// assert_eq!(settings.default_boolean_mode(), BooleanMode::Explicit);
/// assert_eq!(settings.pipe(), "%");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    slash_prefix: bool,
    single_hyphen_long_names: bool,
    value_separators: Vec<char>,
    space_separator: bool,
    boolean_mode: BooleanMode,
    ignore_unexpected_operands: bool,
    enforce_arity: bool,
    pipe_symbol: String,
    directives: bool,
    help_option: bool,
    response_files: bool,
    cancel_on_ctrl_c: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            slash_prefix: false,
            single_hyphen_long_names: false,
            value_separators: vec!['=', ':'],
            space_separator: true,
            boolean_mode: BooleanMode::Implicit,
            ignore_unexpected_operands: false,
            enforce_arity: true,
            pipe_symbol: DEFAULT_PIPE_SYMBOL.to_string(),
            directives: true,
            help_option: true,
            response_files: false,
            cancel_on_ctrl_c: false,
        }
    }
}

impl AppSettings {
    /// Accept `/name` and `/n` in addition to `--name` and `-n`.
    pub fn allow_slash_prefix(mut self, enabled: bool) -> Self {
        self.slash_prefix = enabled;
        self
    }

    /// Accept `-name` as a long option (tried before short option clubbing).
    pub fn allow_single_hyphen_long_names(mut self, enabled: bool) -> Self {
        self.single_hyphen_long_names = enabled;
        self
    }

    /// The characters separating an option from its inline value (default: `=` and `:`).
    pub fn value_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.value_separators = separators.into_iter().collect();
        self
    }

    /// Whether an option's value may be given as the following token (default: `true`).
    pub fn allow_space_separator(mut self, enabled: bool) -> Self {
        self.space_separator = enabled;
        self
    }

    /// The [`BooleanMode`] of boolean options that do not override it (default: implicit).
    pub fn boolean_mode(mut self, mode: BooleanMode) -> Self {
        self.boolean_mode = mode;
        self
    }

    /// Keep unexpected operands as "remaining operands" instead of failing (default: `false`).
    /// Commands may override this individually.
    pub fn ignore_unexpected_operands(mut self, enabled: bool) -> Self {
        self.ignore_unexpected_operands = enabled;
        self
    }

    /// Whether missing required arguments fail validation (default: `true`).
    pub fn enforce_arity(mut self, enabled: bool) -> Self {
        self.enforce_arity = enabled;
        self
    }

    /// The placeholder that directs piped input to an argument (default: `^`).
    pub fn pipe_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.pipe_symbol = symbol.into();
        self
    }

    /// Whether leading `[name:value]` tokens are read as directives (default: `true`).
    pub fn enable_directives(mut self, enabled: bool) -> Self {
        self.directives = enabled;
        self
    }

    /// Whether `-h`/`--help` is recognised on every command (default: `true`).
    pub fn help_option(mut self, enabled: bool) -> Self {
        self.help_option = enabled;
        self
    }

    /// Whether `@path` arguments are expanded from the file's contents (default: `false`).
    pub fn response_files(mut self, enabled: bool) -> Self {
        self.response_files = enabled;
        self
    }

    /// Whether `App::run` cancels the run's token on Ctrl-C (default: `false`).
    pub fn cancel_on_ctrl_c(mut self, enabled: bool) -> Self {
        self.cancel_on_ctrl_c = enabled;
        self
    }

    /// See [`AppSettings::allow_slash_prefix`].
    pub fn slash_prefix(&self) -> bool {
        self.slash_prefix
    }

    /// See [`AppSettings::allow_single_hyphen_long_names`].
    pub fn single_hyphen_long_names(&self) -> bool {
        self.single_hyphen_long_names
    }

    /// See [`AppSettings::value_separators`].
    pub fn separators(&self) -> &[char] {
        &self.value_separators
    }

    /// See [`AppSettings::allow_space_separator`].
    pub fn space_separator(&self) -> bool {
        self.space_separator
    }

    /// See [`AppSettings::boolean_mode`].
    pub fn default_boolean_mode(&self) -> BooleanMode {
        self.boolean_mode
    }

    /// See [`AppSettings::ignore_unexpected_operands`].
    pub fn ignores_unexpected_operands(&self) -> bool {
        self.ignore_unexpected_operands
    }

    /// See [`AppSettings::enforce_arity`].
    pub fn enforces_arity(&self) -> bool {
        self.enforce_arity
    }

    /// See [`AppSettings::pipe_symbol`].
    pub fn pipe(&self) -> &str {
        &self.pipe_symbol
    }

    /// See [`AppSettings::enable_directives`].
    pub fn directives(&self) -> bool {
        self.directives
    }

    /// See [`AppSettings::help_option`].
    pub fn help(&self) -> bool {
        self.help_option
    }

    /// See [`AppSettings::response_files`].
    pub fn expands_response_files(&self) -> bool {
        self.response_files
    }

    /// See [`AppSettings::cancel_on_ctrl_c`].
    pub fn cancels_on_ctrl_c(&self) -> bool {
        self.cancel_on_ctrl_c
    }

    /// Split `token` at the first configured value separator.
    pub(crate) fn split_inline<'a>(&self, token: &'a str) -> (&'a str, Option<&'a str>) {
        match token
            .char_indices()
            .find(|(_, c)| self.value_separators.contains(c))
        {
            Some((index, c)) => (&token[..index], Some(&token[index + c.len_utf8()..])),
            None => (token, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name", ("name", None))]
    #[case("name=value", ("name", Some("value")))]
    #[case("name:value", ("name", Some("value")))]
    #[case("name=a=b", ("name", Some("a=b")))]
    #[case("name:a=b", ("name", Some("a=b")))]
    #[case("name=", ("name", Some("")))]
    fn split_inline(#[case] token: &str, #[case] expected: (&str, Option<&str>)) {
        assert_eq!(AppSettings::default().split_inline(token), expected);
    }

    #[test]
    fn split_inline_custom_separators() {
        let settings = AppSettings::default().value_separators(['=']);
        assert_eq!(settings.split_inline("name:value"), ("name:value", None));
        assert_eq!(settings.split_inline("name=value"), ("name", Some("value")));
    }
}
