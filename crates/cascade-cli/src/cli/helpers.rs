use cascade_core::table::load_table;
use cascade_core::{
    CascadeError, CascadeResult, DispatchBranch, Evaluation, EvaluationRequest, ReferenceTable,
    TableKind,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

pub(super) const PROMPT: &str = "Enter x, y, z: ";

const SIGNIFICANT_DIGITS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct EvaluationReport {
    pub(super) x: f64,
    pub(super) y: f64,
    pub(super) z: f64,
    pub(super) table: String,
    pub(super) branch: DispatchBranch,
    pub(super) value: f64,
}

impl EvaluationReport {
    pub(super) fn new(request: EvaluationRequest, table: &Path, evaluation: Evaluation) -> Self {
        Self {
            x: request.x,
            y: request.y,
            z: request.z,
            table: table.display().to_string(),
            branch: evaluation.branch,
            value: evaluation.value,
        }
    }

    /// Text form of the report. Numbers use six significant digits, as
    /// `printf("%g")` does; `--json` keeps full precision.
    pub(super) fn render_line(&self) -> String {
        format!(
            "fun({}, {}, {}) = {}",
            format_general(self.x),
            format_general(self.y),
            format_general(self.z),
            format_general(self.value)
        )
    }
}

/// `%g` rendering: fixed notation for decimal exponents in `[-4, 6)`,
/// scientific otherwise, trailing zeros removed.
pub(super) fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Reads lines until three whitespace-separated tokens are available.
///
/// Tokens past the third are ignored.
pub(super) fn read_coordinates<R: BufRead>(reader: &mut R) -> CascadeResult<EvaluationRequest> {
    let mut tokens: Vec<String> = Vec::new();
    let mut line = String::new();

    while tokens.len() < 3 {
        line.clear();
        let read = reader.read_line(&mut line).map_err(|source| {
            CascadeError::io_system(
                "IO.STDIN",
                format!("failed to read coordinates from stdin: {}", source),
            )
        })?;
        if read == 0 {
            break;
        }
        tokens.extend(line.split_whitespace().map(str::to_string));
    }

    let values = tokens
        .iter()
        .take(3)
        .map(|token| token.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()
        .filter(|values| values.len() == 3)
        .ok_or_else(invalid_coordinates)?;

    Ok(EvaluationRequest::new(values[0], values[1], values[2]))
}

pub(super) fn invalid_coordinates() -> CascadeError {
    CascadeError::input_validation("INPUT.COORDINATES", "x, y, z must be numeric values.")
}

pub(super) fn resolve_table_path(
    table_dir: &Path,
    table_override: Option<&Path>,
    x: f64,
) -> PathBuf {
    match table_override {
        Some(path) => path.to_path_buf(),
        None => TableKind::for_coordinate(x).path_in(table_dir),
    }
}

/// Tables loaded during one batch run, keyed by the file they came from.
#[derive(Debug, Default)]
pub(super) struct TableCache {
    tables: HashMap<PathBuf, ReferenceTable>,
}

impl TableCache {
    pub(super) fn get_or_load(&mut self, path: &Path) -> CascadeResult<&ReferenceTable> {
        if !self.tables.contains_key(path) {
            let table = load_table(path)?;
            self.tables.insert(path.to_path_buf(), table);
        }
        Ok(&self.tables[path])
    }

    pub(super) fn len(&self) -> usize {
        self.tables.len()
    }
}

/// Parses a batch request file: one `x y z` per line, `#` comments and blank
/// lines skipped.
pub(super) fn read_batch_requests(path: &Path) -> CascadeResult<Vec<EvaluationRequest>> {
    let content = fs::read_to_string(path).map_err(|source| {
        CascadeError::io_system(
            "IO.BATCH_OPEN",
            format!("failed to read '{}': {}", path.display(), source),
        )
    })?;

    let mut requests = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let request = EvaluationRequest::parse(trimmed).ok_or_else(|| {
            CascadeError::input_validation(
                "INPUT.BATCH_LINE",
                format!(
                    "line {} of '{}' must contain exactly three numeric values, got '{}'",
                    index + 1,
                    path.display(),
                    trimmed
                ),
            )
        })?;
        requests.push(request);
    }

    Ok(requests)
}
