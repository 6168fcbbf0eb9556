use crate::api::{AppSettings, Command, ConverterRegistry, FlatArgument, Shape, Value};
use crate::binder::piped::select_target;
use crate::binder::{Binding, ParseResult, ValueSource};
use crate::constant::PIPE_DIRECTIVE;
use crate::pipeline::{ParseError, RunError, ValidationError, ValidationErrors};
use crate::tokens::{Resolved, Scope, Token, TokenStream};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The raw values collected for one declared argument.
#[derive(Debug)]
pub(crate) struct Slot<'t> {
    pub(crate) flat: FlatArgument<'t>,
    pub(crate) occurrences: usize,
    pub(crate) values: Vec<(usize, String)>,
}

impl<'t> Slot<'t> {
    fn for_command(command: &'t Command) -> Vec<Self> {
        command
            .flat_arguments()
            .into_iter()
            .map(|flat| Slot {
                flat,
                occurrences: 0,
                values: Vec::default(),
            })
            .collect()
    }
}

/// Bind a token stream to the command tree rooted at `root`.
///
/// Binding is a pure function of its inputs: the same stream always binds to the same [`ParseResult`].
pub(crate) fn bind<'t>(
    root: &'t Command,
    settings: &AppSettings,
    registry: &ConverterRegistry,
    stream: &TokenStream,
    has_piped: bool,
) -> Result<ParseResult<'t>, RunError> {
    let mut path: Vec<&'t Command> = vec![root];
    let mut levels: Vec<Vec<Slot<'t>>> = vec![Slot::for_command(root)];
    let mut scope = Scope::new(&path, settings);
    let mut current: Option<(usize, usize)> = None;
    let mut operands: Vec<(usize, String)> = Vec::default();

    for (offset, token) in stream.tokens() {
        let offset = *offset;

        match token {
            Token::Subcommand(name) => {
                let child = match path
                    .last()
                    .copied()
                    .and_then(|command| command.find_subcommand(name))
                {
                    Some(child) => child,
                    None => {
                        return Err(RunError::parse_at(
                            offset,
                            ParseError::UnrecognizedArgument {
                                token: name.clone(),
                                suggestion: None,
                            },
                        ))
                    }
                };

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Binding into sub-command '{}'.", child.name());
                }

                path.push(child);
                levels.push(Slot::for_command(child));
                scope = Scope::new(&path, settings);
                current = None;
            }
            Token::OptionFlag(name) => match scope.resolve_long(name) {
                Some(Resolved::Argument { level, argument }) => {
                    let index = match levels[level]
                        .iter()
                        .position(|slot| std::ptr::eq(slot.flat.argument, argument))
                    {
                        Some(index) => index,
                        None => unreachable!("internal error - resolved option must have a slot."),
                    };
                    let slot = &mut levels[level][index];
                    slot.occurrences += 1;

                    if slot.occurrences > 1 && !argument.value_type().is_collection() {
                        return Err(RunError::parse_at(
                            offset,
                            ParseError::Repeated {
                                option: argument.identifier(),
                            },
                        ));
                    }

                    current.replace((level, index));
                }
                Some(Resolved::Help) => current = None,
                None => {
                    return Err(RunError::parse_at(
                        offset,
                        ParseError::UnrecognizedOption {
                            token: format!("--{name}"),
                            suggestion: scope.suggest_option(name),
                        },
                    ))
                }
            },
            Token::OptionValue(raw) => {
                if let Some((level, index)) = current {
                    let slot = &mut levels[level][index];

                    if !slot.flat.argument.value_type().is_collection() && !slot.values.is_empty() {
                        return Err(RunError::parse_at(
                            offset,
                            ParseError::ExtraValue {
                                argument: slot.flat.argument.identifier(),
                                token: raw.clone(),
                            },
                        ));
                    }

                    slot.values.push((offset, raw.clone()));
                }
            }
            Token::OperandValue(raw) => operands.push((offset, raw.clone())),
            Token::Separator => current = None,
        }
    }

    for command in path.iter() {
        command.validate_piped()?;
    }

    let target_level = path.len() - 1;
    let ignore = ignores_unexpected_operands(&path, settings);
    let remaining_operands = assign_operands(&mut levels[target_level], operands, ignore, &scope)?;
    let placeholder = stream
        .directive(PIPE_DIRECTIVE)
        .filter(|symbol| !symbol.is_empty())
        .unwrap_or(settings.pipe());
    let piped_target = select_target(&mut levels, placeholder, has_piped)
        .map_err(|(offset, error)| RunError::parse_at(offset, error))?;

    let mut errors = Vec::default();
    let levels: Vec<Vec<Binding<'t>>> = levels
        .into_iter()
        .enumerate()
        .map(|(level, slots)| {
            slots
                .into_iter()
                // Operands only bind on the target command.
                .filter(|slot| level == target_level || slot.flat.argument.is_option())
                .map(|slot| {
                    let piped = has_piped
                        && piped_target.as_ref().map_or(false, |target| {
                            target.level == level && target.name == slot.flat.argument.name()
                        });
                    finish(slot, piped, settings, registry, &mut errors)
                })
                .collect()
        })
        .collect();

    if !errors.is_empty() {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Binding produced {} validation error(s).", errors.len());
        }

        return Err(RunError::from(ValidationErrors(errors)));
    }

    Ok(ParseResult {
        path,
        levels,
        remaining_operands,
        separated_arguments: stream.separated_arguments().to_vec(),
        piped_target,
        directives: stream.directives().to_vec(),
    })
}

/// The target's explicit policy wins, then the nearest ancestor's, then the application's.
fn ignores_unexpected_operands(path: &[&Command], settings: &AppSettings) -> bool {
    path.iter()
        .rev()
        .find_map(|command| command.unexpected_operands_policy())
        .unwrap_or(settings.ignores_unexpected_operands())
}

fn assign_operands(
    slots: &mut [Slot<'_>],
    operands: Vec<(usize, String)>,
    ignore: bool,
    scope: &Scope<'_>,
) -> Result<Vec<String>, RunError> {
    let mut queue = operands.into_iter();

    for slot in slots.iter_mut().filter(|slot| slot.flat.argument.is_operand()) {
        if slot.flat.argument.value_type().is_collection() {
            slot.values.extend(queue.by_ref());
        } else if let Some(operand) = queue.next() {
            slot.values.push(operand);
        }
    }

    let leftover: Vec<(usize, String)> = queue.collect();

    match leftover.first() {
        None => Ok(Vec::default()),
        Some(_) if ignore => {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Keeping {} unexpected operand(s).", leftover.len());
            }

            Ok(leftover.into_iter().map(|(_, raw)| raw).collect())
        }
        Some((offset, raw)) => Err(RunError::parse_at(
            *offset,
            ParseError::UnrecognizedArgument {
                token: raw.clone(),
                suggestion: scope.suggest_subcommand(raw),
            },
        )),
    }
}

/// `piped` marks the slot receiving piped input lines, which stand in for its default.
fn finish<'t>(
    slot: Slot<'t>,
    piped: bool,
    settings: &AppSettings,
    registry: &ConverterRegistry,
    errors: &mut Vec<ValidationError>,
) -> Binding<'t> {
    let Slot {
        flat,
        occurrences,
        values,
    } = slot;
    let argument = flat.argument;
    let is_flag = argument.is_flag(settings.default_boolean_mode());

    let (value, source) = if !values.is_empty() {
        let raws: Vec<&str> = values.iter().map(|(_, raw)| raw.as_str()).collect();
        (convert(flat, &raws, registry, errors), ValueSource::Explicit)
    } else if occurrences > 0 && is_flag {
        (Some(Value::Bool(true)), ValueSource::Explicit)
    } else if occurrences > 0 && argument.value_type().is_collection() {
        // Every value was the piped placeholder.
        (Some(Value::List(Vec::default())), ValueSource::Explicit)
    } else if piped {
        (Some(Value::List(Vec::default())), ValueSource::Piped)
    } else if let Some(defaults) = argument.default() {
        let raws: Vec<&str> = defaults.iter().map(String::as_str).collect();
        (convert(flat, &raws, registry, errors), ValueSource::Default)
    } else {
        match argument.value_type().shape() {
            Shape::Collection => (Some(Value::List(Vec::default())), ValueSource::Implicit),
            Shape::Nullable => (None, ValueSource::Absent),
            Shape::Scalar if is_flag => (Some(Value::Bool(false)), ValueSource::Implicit),
            Shape::Scalar => {
                if settings.enforces_arity() {
                    errors.push(ValidationError::Required {
                        argument: argument.identifier(),
                    });
                }

                (None, ValueSource::Absent)
            }
        }
    };

    Binding {
        argument,
        group: flat.group,
        value,
        source,
    }
}

fn convert(
    flat: FlatArgument<'_>,
    raws: &[&str],
    registry: &ConverterRegistry,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    let argument = flat.argument;
    let mut converted = Vec::default();
    let mut failed = false;

    for raw in raws {
        match registry.convert(argument.value_type().scalar(), raw) {
            Ok(value) => converted.push(value),
            Err(error) => {
                failed = true;
                errors.push(ValidationError::Conversion {
                    argument: argument.identifier(),
                    error,
                });
            }
        }
    }

    if failed {
        None
    } else if argument.value_type().is_collection() {
        Some(Value::List(converted))
    } else {
        converted.into_iter().next()
    }
}
