use crate::error::ProcessError;
use serde_json::{Map, Value};
use std::path::Path;

/// Per-field column policy. Every column the interpreters touch is declared
/// either Required (missing column fails the parse) or Optional (missing
/// column or empty cell yields the stated per-row default).
#[derive(Debug, Clone, Copy)]
pub enum ColumnSpec {
    Required(&'static str),
    Optional(&'static str, f64),
}

impl ColumnSpec {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnSpec::Required(n) | ColumnSpec::Optional(n, _) => n,
        }
    }
}

/// The job's event log: one row per detected rep/jump/lap/measurement,
/// columns varying by activity.
#[derive(Debug, Clone)]
pub struct TabularLog {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularLog {
    pub fn from_path(path: &Path) -> Result<Self, ProcessError> {
        let file = std::fs::File::open(path)
            .map_err(|e| ProcessError::LogParseFailed(format!("open {}: {e}", path.display())))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(rdr: R) -> Result<Self, ProcessError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
        let headers = reader
            .headers()
            .map_err(|e| ProcessError::LogParseFailed(format!("reading header: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| ProcessError::LogParseFailed(format!("reading row: {e}")))?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.col_index(name).is_some()
    }

    fn col_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// One numeric value per row for the given column policy.
    pub fn column(&self, spec: ColumnSpec) -> Result<Vec<f64>, ProcessError> {
        let idx = match (self.col_index(spec.name()), spec) {
            (Some(idx), _) => idx,
            (None, ColumnSpec::Optional(_, default)) => {
                return Ok(vec![default; self.rows.len()]);
            }
            (None, ColumnSpec::Required(name)) => {
                return Err(ProcessError::LogParseFailed(format!(
                    "missing required column '{name}'"
                )));
            }
        };

        self.rows
            .iter()
            .map(|row| parse_cell(row.get(idx).map(String::as_str), spec))
            .collect()
    }

    pub fn sum(&self, spec: ColumnSpec) -> Result<f64, ProcessError> {
        Ok(self.column(spec)?.iter().sum())
    }

    /// Arithmetic mean, 0 for an empty log.
    pub fn mean(&self, spec: ColumnSpec) -> Result<f64, ProcessError> {
        let vals = self.column(spec)?;
        if vals.is_empty() {
            return Ok(0.0);
        }
        Ok(vals.iter().sum::<f64>() / vals.len() as f64)
    }

    /// Column maximum over the rows present, 0 for an empty log.
    pub fn max(&self, spec: ColumnSpec) -> Result<f64, ProcessError> {
        let vals = self.column(spec)?;
        if vals.is_empty() {
            return Ok(0.0);
        }
        Ok(vals.into_iter().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Column minimum over the rows present, 0 for an empty log.
    pub fn min(&self, spec: ColumnSpec) -> Result<f64, ProcessError> {
        let vals = self.column(spec)?;
        if vals.is_empty() {
            return Ok(0.0);
        }
        Ok(vals.into_iter().fold(f64::INFINITY, f64::min))
    }

    /// Index of the row holding the column maximum (first on ties).
    pub fn max_row(&self, spec: ColumnSpec) -> Result<Option<usize>, ProcessError> {
        let vals = self.column(spec)?;
        let mut best: Option<(usize, f64)> = None;
        for (i, v) in vals.into_iter().enumerate() {
            if best.map(|(_, b)| v > b).unwrap_or(true) {
                best = Some((i, v));
            }
        }
        Ok(best.map(|(i, _)| i))
    }

    pub fn value_at(&self, row: usize, spec: ColumnSpec) -> Result<f64, ProcessError> {
        let vals = self.column(spec)?;
        vals.get(row).copied().ok_or_else(|| {
            ProcessError::LogParseFailed(format!("row {row} out of range for '{}'", spec.name()))
        })
    }

    /// Rows as JSON objects keyed by header, for the unshaped fallback.
    pub fn raw_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row.iter())
                    .map(|(h, c)| {
                        let v = c
                            .parse::<f64>()
                            .map(|n| {
                                serde_json::Number::from_f64(n)
                                    .map(Value::Number)
                                    .unwrap_or_else(|| Value::String(c.clone()))
                            })
                            .unwrap_or_else(|_| Value::String(c.clone()));
                        (h.clone(), v)
                    })
                    .collect()
            })
            .collect()
    }
}

fn parse_cell(cell: Option<&str>, spec: ColumnSpec) -> Result<f64, ProcessError> {
    match (cell, spec) {
        (Some(s), _) if !s.is_empty() => s.parse::<f64>().map_err(|_| {
            ProcessError::LogParseFailed(format!(
                "non-numeric value '{s}' in column '{}'",
                spec.name()
            ))
        }),
        (_, ColumnSpec::Optional(_, default)) => Ok(default),
        (_, ColumnSpec::Required(name)) => Err(ProcessError::LogParseFailed(format!(
            "empty value in required column '{name}'"
        ))),
    }
}
