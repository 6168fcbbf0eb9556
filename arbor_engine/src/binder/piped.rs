use crate::binder::core::Slot;
use crate::binder::PipedTarget;
use crate::pipeline::ParseError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Choose the argument receiving piped input.
///
/// A collection argument whose values include the `placeholder` claims the input (the placeholder itself is removed).
/// Without a placeholder, piped input goes to the target command's piped argument, if it declares one.
pub(super) fn select_target(
    levels: &mut [Vec<Slot<'_>>],
    placeholder: &str,
    has_piped: bool,
) -> Result<Option<PipedTarget>, (usize, ParseError)> {
    let mut candidates: Vec<(usize, PipedTarget)> = Vec::default();

    for (level, slots) in levels.iter_mut().enumerate() {
        for slot in slots.iter_mut() {
            if !slot.flat.argument.value_type().is_collection() {
                continue;
            }

            let mut first: Option<usize> = None;
            slot.values.retain(|(offset, raw)| {
                if raw == placeholder {
                    first.get_or_insert(*offset);
                    false
                } else {
                    true
                }
            });

            if let Some(offset) = first {
                candidates.push((offset, target(level, slot)));
            }
        }
    }

    if candidates.len() > 1 {
        let offset = candidates[1].0;
        return Err((
            offset,
            ParseError::PipedTargetConflict {
                arguments: candidates
                    .into_iter()
                    .map(|(_, target)| target.identifier)
                    .collect(),
            },
        ));
    }

    if let Some((_, target)) = candidates.pop() {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Piped input targets '{}' by placeholder.", target.identifier);
        }

        return Ok(Some(target));
    }

    if !has_piped {
        return Ok(None);
    }

    let level = levels.len().saturating_sub(1);
    let selected = levels.get(level).and_then(|slots| {
        slots
            .iter()
            .find(|slot| slot.flat.argument.is_piped())
            .map(|slot| target(level, slot))
    });

    #[cfg(feature = "tracing_debug")]
    {
        match &selected {
            Some(target) => debug!("Piped input targets '{}'.", target.identifier),
            None => debug!("No argument receives piped input; ignoring it."),
        }
    }

    Ok(selected)
}

fn target(level: usize, slot: &Slot<'_>) -> PipedTarget {
    PipedTarget {
        level,
        name: slot.flat.argument.name().to_string(),
        identifier: slot.flat.argument.identifier(),
    }
}
