use crate::api::{parse_bool, AppSettings, Argument, Command};
use crate::constant::{HELP_NAME, SEPARATOR};
use crate::pipeline::ParseError;
use crate::tokens::{Directive, Resolved, Scope, Token, TokenStream};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Classify the command line `arguments` against the command tree rooted at `root`.
///
/// On failure, the error is paired with the index of the offending argument.
pub(crate) fn tokenize(
    root: &Command,
    settings: &AppSettings,
    arguments: &[String],
) -> Result<TokenStream, (usize, ParseError)> {
    let mut tokenizer = Tokenizer::new(root, settings);
    let mut offset = 0;

    if settings.directives() {
        while let Some(directive) = arguments.get(offset).and_then(|a| Directive::parse(a)) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Extracted directive {directive}.");
            }

            tokenizer.stream.directives.push(directive);
            offset += 1;
        }
    }

    for (index, argument) in arguments.iter().enumerate().skip(offset) {
        if let Flow::Stop = tokenizer.feed(index, argument)? {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Stopped tokenizing at index {index}.");
            }

            return Ok(tokenizer.stream);
        }
    }

    tokenizer.close()
}

enum Flow {
    Continue,
    Stop,
}

struct Pending<'t> {
    offset: usize,
    argument: &'t Argument,
}

struct Tokenizer<'t> {
    settings: &'t AppSettings,
    path: Vec<&'t Command>,
    scope: Scope<'t>,
    stream: TokenStream,
    pending: Option<Pending<'t>>,
    operand_seen: bool,
    separated: bool,
}

impl<'t> Tokenizer<'t> {
    fn new(root: &'t Command, settings: &'t AppSettings) -> Self {
        Self {
            settings,
            path: vec![root],
            scope: Scope::new(&[root], settings),
            stream: TokenStream::default(),
            pending: None,
            operand_seen: false,
            separated: false,
        }
    }

    fn feed(&mut self, offset: usize, token: &str) -> Result<Flow, (usize, ParseError)> {
        if self.separated {
            self.stream.separated.push(token.to_string());
            return Ok(Flow::Continue);
        }

        if let Some(pending) = self.pending.take() {
            return self.feed_pending(pending, offset, token);
        }

        if token == SEPARATOR {
            return if self.path.iter().any(|command| command.captures_separated()) {
                self.push(offset, Token::Separator);
                self.separated = true;
                Ok(Flow::Continue)
            } else {
                Err((
                    offset,
                    ParseError::UnrecognizedArgument {
                        token: token.to_string(),
                        suggestion: None,
                    },
                ))
            };
        }

        if let Some(inner) = unquote(token) {
            self.push(offset, Token::OperandValue(inner.to_string()));
            self.operand_seen = true;
            return Ok(Flow::Continue);
        }

        // 1. Find a 'long' option, such as:
        //  --initial
        //  --initial ..
        //  --initial=..
        // 2. Find 'short' option(s), such as (both -i and -v are example short flags):
        //  -i
        //  -i ..
        //  -i=..
        //  -vi ..
        //  -vi=..
        // 3. Find a slash option (/initial, /i), when enabled.
        // 4. Otherwise, this is a sub-command or an operand.
        if let Some(body) = token.strip_prefix("--") {
            return match self.try_long(offset, body)? {
                Some(flow) => Ok(flow),
                None => {
                    let (name, _) = self.settings.split_inline(body);
                    Err((
                        offset,
                        ParseError::UnrecognizedOption {
                            token: token.to_string(),
                            suggestion: self.scope.suggest_option(name),
                        },
                    ))
                }
            };
        }

        if let Some(body) = token.strip_prefix('-').filter(|body| !body.is_empty()) {
            if self.settings.single_hyphen_long_names() {
                if let Some(flow) = self.try_long(offset, body)? {
                    return Ok(flow);
                }
            }

            return self.feed_short(offset, token, body);
        }

        if self.settings.slash_prefix() {
            if let Some(body) = token.strip_prefix('/').filter(|body| !body.is_empty()) {
                if let Some(resolved) = self.resolve_slash(body) {
                    let (_, inline) = self.settings.split_inline(body);
                    return self.accept(offset, resolved, inline);
                }
            }
        }

        Ok(self.feed_operand(offset, token))
    }

    fn feed_pending(
        &mut self,
        pending: Pending<'t>,
        offset: usize,
        token: &str,
    ) -> Result<Flow, (usize, ParseError)> {
        let Pending {
            offset: option_offset,
            argument,
        } = pending;

        if token == SEPARATOR || self.resolves_as_option(token) {
            return Err((
                option_offset,
                ParseError::MissingValue {
                    option: argument.identifier(),
                },
            ));
        }

        let value = unquote(token).unwrap_or(token);

        if argument.value_type().is_bool() {
            self.push_boolean(offset, argument, value)?;
        } else {
            self.push_values(offset, argument, value);
        }

        Ok(Flow::Continue)
    }

    fn try_long(&mut self, offset: usize, body: &str) -> Result<Option<Flow>, (usize, ParseError)> {
        let (name, inline) = self.settings.split_inline(body);

        match self.scope.resolve_long(name) {
            Some(resolved) => self.accept(offset, resolved, inline).map(Some),
            None => Ok(None),
        }
    }

    fn feed_short(
        &mut self,
        offset: usize,
        token: &str,
        body: &str,
    ) -> Result<Flow, (usize, ParseError)> {
        let mut resolved: Vec<(char, Resolved<'t>)> = Vec::default();
        let mut inline = None;

        for (index, single) in body.char_indices() {
            match self.scope.resolve_short(single) {
                Some(r) => {
                    resolved.push((single, r));
                    let rest = &body[index + single.len_utf8()..];

                    // An inline separator ends the clubbed characters; the rest is the value.
                    if let Some(separator) = rest
                        .chars()
                        .next()
                        .filter(|c| self.settings.separators().contains(c))
                    {
                        inline.replace(&rest[separator.len_utf8()..]);
                        break;
                    }
                }
                None => {
                    if token.parse::<f64>().is_ok() {
                        #[cfg(feature = "tracing_debug")]
                        {
                            debug!("Treating '{token}' as a negative number.");
                        }

                        return Ok(self.feed_operand(offset, token));
                    }

                    // The token is not partially parsed: it is unrecognized as a whole.
                    let (name, _) = self.settings.split_inline(body);
                    return Err((
                        offset,
                        ParseError::UnrecognizedOption {
                            token: token.to_string(),
                            suggestion: self.scope.suggest_option(name),
                        },
                    ));
                }
            }
        }

        let (last, head) = match resolved.split_last() {
            Some(split) => split,
            None => unreachable!("internal error - short option body cannot be empty."),
        };

        // All characters in the head of the token must take no values.
        if let Some((flag, _)) = head.iter().find(|(_, r)| !self.takes_no_value(r)) {
            return Err((
                offset,
                ParseError::Clubbing {
                    flag: *flag,
                    token: token.to_string(),
                },
            ));
        }

        for (_, r) in head.iter() {
            if let Flow::Stop = self.accept(offset, *r, None)? {
                return Ok(Flow::Stop);
            }
        }

        self.accept(offset, last.1, inline)
    }

    fn resolve_slash(&self, body: &str) -> Option<Resolved<'t>> {
        let (name, _) = self.settings.split_inline(body);
        let mut chars = name.chars();

        match (chars.next(), chars.next()) {
            (Some(single), None) => self
                .scope
                .resolve_short(single)
                .or_else(|| self.scope.resolve_long(name)),
            _ => self.scope.resolve_long(name),
        }
    }

    fn resolves_as_option(&self, token: &str) -> bool {
        if let Some(body) = token.strip_prefix("--") {
            let (name, _) = self.settings.split_inline(body);
            return self.scope.resolve_long(name).is_some();
        }

        if let Some(body) = token.strip_prefix('-') {
            if self.settings.single_hyphen_long_names() {
                let (name, _) = self.settings.split_inline(body);

                if self.scope.resolve_long(name).is_some() {
                    return true;
                }
            }

            return body
                .chars()
                .next()
                .map_or(false, |single| self.scope.resolve_short(single).is_some());
        }

        if self.settings.slash_prefix() {
            if let Some(body) = token.strip_prefix('/') {
                return self.resolve_slash(body).is_some();
            }
        }

        false
    }

    fn takes_no_value(&self, resolved: &Resolved<'t>) -> bool {
        match resolved {
            Resolved::Help => true,
            Resolved::Argument { argument, .. } => {
                argument.is_flag(self.settings.default_boolean_mode())
            }
        }
    }

    fn accept(
        &mut self,
        offset: usize,
        resolved: Resolved<'t>,
        inline: Option<&str>,
    ) -> Result<Flow, (usize, ParseError)> {
        let argument = match resolved {
            Resolved::Help => {
                self.push(offset, Token::OptionFlag(HELP_NAME.to_string()));
                self.stream.help = true;
                return Ok(Flow::Stop);
            }
            Resolved::Argument { argument, .. } => argument,
        };

        self.push(offset, Token::OptionFlag(argument.name().to_string()));

        match inline {
            Some(value) if argument.value_type().is_bool() => {
                self.push_boolean(offset, argument, value)?;
            }
            Some(value) => self.push_values(offset, argument, value),
            None if argument.is_flag(self.settings.default_boolean_mode()) => {}
            None if self.settings.space_separator() => {
                self.pending.replace(Pending { offset, argument });
            }
            None => {
                return Err((
                    offset,
                    ParseError::MissingValue {
                        option: argument.identifier(),
                    },
                ));
            }
        }

        Ok(Flow::Continue)
    }

    fn feed_operand(&mut self, offset: usize, token: &str) -> Flow {
        if !self.operand_seen {
            let current = self.current();

            if let Some(child) = current.find_subcommand(token) {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Descending from '{}' into '{}'.", current.name(), child.name());
                }

                self.push(offset, Token::Subcommand(child.name().to_string()));
                self.path.push(child);
                self.scope = Scope::new(&self.path, self.settings);
                return Flow::Continue;
            }
        }

        self.operand_seen = true;
        self.push(offset, Token::OperandValue(token.to_string()));
        Flow::Continue
    }

    fn push_boolean(
        &mut self,
        offset: usize,
        argument: &Argument,
        value: &str,
    ) -> Result<(), (usize, ParseError)> {
        match parse_bool(value) {
            Some(_) => {
                self.push(offset, Token::OptionValue(value.to_string()));
                Ok(())
            }
            None => Err((
                offset,
                ParseError::InvalidBoolean {
                    option: argument.identifier(),
                    token: value.to_string(),
                },
            )),
        }
    }

    fn push_values(&mut self, offset: usize, argument: &Argument, value: &str) {
        match argument.split_delimiter() {
            Some(delimiter) => {
                for part in value.split(delimiter) {
                    self.push(offset, Token::OptionValue(part.to_string()));
                }
            }
            None => self.push(offset, Token::OptionValue(value.to_string())),
        }
    }

    fn push(&mut self, offset: usize, token: Token) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Token {offset}: {token:?}.");
        }

        self.stream.tokens.push((offset, token));
    }

    fn current(&self) -> &'t Command {
        match self.path.last().copied() {
            Some(command) => command,
            None => unreachable!("internal error - the command path always contains the root."),
        }
    }

    fn close(self) -> Result<TokenStream, (usize, ParseError)> {
        match self.pending {
            Some(Pending { offset, argument }) => Err((
                offset,
                ParseError::MissingValue {
                    option: argument.identifier(),
                },
            )),
            None => Ok(self.stream),
        }
    }
}

/// Strip one pair of matching quotes wrapping the whole token.
fn unquote(token: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return Some(&token[1..token.len() - 1]);
        }
    }

    None
}
