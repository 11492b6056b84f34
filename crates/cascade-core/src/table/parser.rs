use super::{ReferenceTable, Sample, TableError};
use crate::domain::{CascadeError, CascadeResult};
use std::fs;
use std::path::Path;

/// Reads `coordinate value_a value_b` triples from whitespace-separated text.
///
/// Numbers are read like a formatted stream: leading whitespace is skipped
/// and the longest numeric prefix is consumed, so `5abc` yields `5` and the
/// next read starts at `abc`. Reading stops at the first position where no
/// number can be read, and an incomplete trailing triple is dropped.
pub fn parse_samples(content: &str) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut numbers = NumberStream::new(content);

    while let (Some(coordinate), Some(value_a), Some(value_b)) =
        (numbers.next(), numbers.next(), numbers.next())
    {
        samples.push(Sample::new(coordinate, value_a, value_b));
    }

    samples
}

struct NumberStream<'a> {
    rest: &'a str,
}

impl<'a> NumberStream<'a> {
    fn new(content: &'a str) -> Self {
        Self { rest: content }
    }
}

impl Iterator for NumberStream<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let text = self.rest.trim_start();
        let (number, rest) = text.split_at(numeric_prefix_len(text));
        let value = number.parse::<f64>().ok()?;
        self.rest = rest;
        Some(value)
    }
}

/// Length of the decimal floating-point literal at the start of `text`:
/// optional sign, digits with an optional fraction, optional exponent.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_digits = digits_from(end);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = digits_from(end + 1);
        end += 1 + fraction_digits;
    }
    if integer_digits + fraction_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_digits = digits_from(exponent);
        if exponent_digits > 0 {
            end = exponent + exponent_digits;
        }
    }

    end
}

pub fn parse_table(content: &str) -> Result<ReferenceTable, TableError> {
    ReferenceTable::new(parse_samples(content))
}

pub fn load_table(path: &Path) -> CascadeResult<ReferenceTable> {
    let content = fs::read_to_string(path).map_err(|source| {
        CascadeError::io_system(
            "IO.TABLE_OPEN",
            format!("failed to open table file '{}': {}", path.display(), source),
        )
    })?;

    let table = parse_table(&content).map_err(|_| {
        CascadeError::io_system(
            "IO.TABLE_EMPTY",
            format!("table file '{}' contains no samples", path.display()),
        )
    })?;

    tracing::debug!(
        path = %path.display(),
        samples = table.len(),
        first = table.first().coordinate,
        last = table.last().coordinate,
        "loaded reference table"
    );
    Ok(table)
}
