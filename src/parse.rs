//! Parsing of the tuple literals used on the command line, such as
//! `((0.1,0.5),(1.2,1.6))` or `(0.3, 0.9)`.

use crate::error::{ConfigError, Result};

/// Parses a flat list of numbers: `1.5`, `(1.5)`, `(1.5, 2)` or `1.5,2`.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if any element is not a number.
pub fn parse_floats(input: &str, what: &'static str) -> Result<Vec<f64>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();
    if cleaned.is_empty() {
        return Err(parse_error(input, what));
    }
    cleaned
        .split(',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().map_err(|_| parse_error(input, what)))
        .collect()
}

/// Parses pairs of numbers: `((a,b),(c,d))`, or a single `(a,b)`.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the text is not a tuple of two-element
/// tuples of numbers.
pub fn parse_pairs(input: &str, what: &'static str) -> Result<Vec<(f64, f64)>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.starts_with('(') || !compact.ends_with(')') {
        return Err(parse_error(input, what));
    }
    let inner = &compact[1..compact.len() - 1];
    // a single pair has no nested parentheses
    let groups: Vec<&str> = if inner.contains('(') {
        inner
            .split("),")
            .map(|g| g.trim_start_matches('(').trim_end_matches(')').trim_end_matches(','))
            .filter(|g| !g.is_empty())
            .collect()
    } else {
        vec![inner]
    };

    let mut pairs = Vec::with_capacity(groups.len());
    for group in groups {
        let values = group
            .split(',')
            .map(|v| v.parse::<f64>().map_err(|_| parse_error(input, what)))
            .collect::<Result<Vec<f64>>>()?;
        match values.as_slice() {
            [a, b] => pairs.push((*a, *b)),
            _ => return Err(parse_error(input, what)),
        }
    }
    if pairs.is_empty() {
        return Err(parse_error(input, what));
    }
    Ok(pairs)
}

fn parse_error(input: &str, what: &'static str) -> crate::MarbleError {
    ConfigError::Parse {
        what,
        input: input.to_owned(),
    }
    .into()
}
