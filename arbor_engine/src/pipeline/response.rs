use std::fs;

use crate::constant::{RESPONSE_FILE_PREFIX, SEPARATOR};
use crate::pipeline::ParseError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Replace each `@path` argument by the words of that file.
///
/// Blank lines and lines starting with `#` are skipped; every other line is split on whitespace.
/// Arguments after the `--` separator are left verbatim.
pub(crate) fn expand(arguments: &[String]) -> Result<Vec<String>, (usize, ParseError)> {
    let mut expanded = Vec::default();
    let mut separated = false;

    for (offset, argument) in arguments.iter().enumerate() {
        if separated {
            expanded.push(argument.clone());
            continue;
        }

        if argument == SEPARATOR {
            separated = true;
            expanded.push(argument.clone());
            continue;
        }

        match argument.strip_prefix(RESPONSE_FILE_PREFIX) {
            Some(path) if !path.is_empty() => {
                let content = fs::read_to_string(path).map_err(|error| {
                    (
                        offset,
                        ParseError::ResponseFile {
                            path: path.to_string(),
                            message: error.to_string(),
                        },
                    )
                })?;

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Expanding response file '{path}'.");
                }

                for line in content.lines() {
                    let line = line.trim();

                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }

                    expanded.extend(line.split_whitespace().map(str::to_string));
                }
            }
            _ => expanded.push(argument.clone()),
        }
    }

    Ok(expanded)
}
