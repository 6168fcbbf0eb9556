pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const SEPARATOR: &str = "--";
pub(crate) const DEFAULT_PIPE_SYMBOL: &str = "^";
pub(crate) const PIPE_DIRECTIVE: &str = "pipe";
pub(crate) const PARSE_DIRECTIVE: &str = "parse";
pub(crate) const RESPONSE_FILE_PREFIX: char = '@';
// Suggestions further than this edit distance are noise.
pub(crate) const SUGGESTION_DISTANCE: usize = 2;

/// Exit code of a successful run whose target returned no code of its own.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code of a run stopped by a parse/usage (or configuration) error.
pub const EXIT_PARSE_ERROR: i32 = 1;
/// Exit code of a run stopped by one or more validation errors.
pub const EXIT_VALIDATION_ERROR: i32 = 2;
