//! Typed in-memory dataset.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Cell tokens read as missing values.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "<NA>", "#N/A",
];

/// A single cell value.
///
/// `Text` doubles as the raw, unparsed fallback: a column is only typed as
/// numeric when every non-null cell parses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Check whether a raw cell represents a missing value.
    pub fn is_null_token(raw: &str) -> bool {
        NULL_TOKENS.contains(&raw)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True when the value was typed as a number at ingestion.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Numeric value of a typed number. Text is not parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value, parsing text when needed.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }
    }

    /// Blank means null or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{}", v),
            // Debug keeps the trailing ".0" on integral floats.
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An ordered, rectangular set of records sharing one column set.
///
/// `index` holds the row labels. They equal the row positions right after
/// loading and after every reindex; row drops keep the surviving labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub index: Vec<usize>,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create a dataset from typed rows. Rows are padded or truncated to the
    /// header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = headers.len();
        let rows: Vec<Vec<Value>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        let index = (0..rows.len()).collect();
        Self {
            headers,
            index,
            rows,
        }
    }

    /// Build a dataset from raw cells, typing each column as a whole.
    pub fn from_raw(headers: Vec<String>, raw: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(raw.len()); width];
        for row in raw {
            for (col, cells) in columns.iter_mut().enumerate() {
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                if Value::is_null_token(cell) {
                    cells.push(None);
                } else {
                    cells.push(Some(cell.to_string()));
                }
            }
        }

        let typed: Vec<Vec<Value>> = columns.into_iter().map(type_column).collect();
        let row_count = typed.first().map(Vec::len).unwrap_or(0);
        let mut rows = vec![Vec::with_capacity(width); row_count];
        for column in typed {
            for (row, value) in rows.iter_mut().zip(column) {
                row.push(value);
            }
        }

        Self::new(headers, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a cell by row position and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All values of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[col]).collect())
    }

    /// Add a column at the end, or replace it in place if it exists.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Remove the named columns that exist. Returns the removed names.
    pub fn drop_columns(&mut self, names: &[&str]) -> Vec<String> {
        let mut positions: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        positions.sort_unstable();
        positions.dedup();

        let mut removed = Vec::with_capacity(positions.len());
        for &col in positions.iter().rev() {
            removed.push(self.headers.remove(col));
            for row in &mut self.rows {
                row.remove(col);
            }
        }
        removed.reverse();
        removed
    }

    /// Keep rows for which `keep(position, row)` returns true. Labels of
    /// surviving rows are preserved.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize, &[Value]) -> bool) {
        let rows = std::mem::take(&mut self.rows);
        let index = std::mem::take(&mut self.index);
        for (pos, (label, row)) in index.into_iter().zip(rows).enumerate() {
            if keep(pos, &row) {
                self.index.push(label);
                self.rows.push(row);
            }
        }
    }

    /// Reset row labels to a dense zero-based sequence.
    pub fn reindex(&mut self) {
        self.index = (0..self.rows.len()).collect();
    }

    /// Position of the row carrying `label`.
    pub fn position_of(&self, label: usize) -> Option<usize> {
        self.index.iter().position(|&l| l == label)
    }

    /// Rows whose labels are in `labels`, ascending by label, labels kept.
    pub fn select_labels(&self, labels: &BTreeSet<usize>) -> Dataset {
        let mut index = Vec::new();
        let mut rows = Vec::new();
        for &label in labels {
            if let Some(pos) = self.position_of(label) {
                index.push(label);
                rows.push(self.rows[pos].clone());
            }
        }
        Dataset {
            headers: self.headers.clone(),
            index,
            rows,
        }
    }

    /// Rendered cell text for a row, restricted to `columns` when given.
    pub fn row_key(&self, pos: usize, columns: Option<&[usize]>) -> Vec<String> {
        let row = &self.rows[pos];
        match columns {
            Some(cols) => cols.iter().map(|&c| row[c].to_string()).collect(),
            None => row.iter().map(ToString::to_string).collect(),
        }
    }

    /// SHA-256 over headers, labels and cell text.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for header in &self.headers {
            hasher.update(header.as_bytes());
            hasher.update([0x1f]);
        }
        for (label, row) in self.index.iter().zip(&self.rows) {
            hasher.update(label.to_le_bytes());
            for value in row {
                hasher.update(value.to_string().as_bytes());
                hasher.update([0x1f]);
            }
            hasher.update([0x1e]);
        }
        format!("sha256:{:x}", hasher.finalize())
    }
}

/// Type one column: integers if every cell parses as i64, floats if every cell
/// parses as f64, text otherwise.
fn type_column(cells: Vec<Option<String>>) -> Vec<Value> {
    let present = || cells.iter().flatten().map(|s| s.trim());

    if present().all(|s| s.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c {
                Some(s) => s.trim().parse::<i64>().map(Value::Integer).unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
    }

    if present().all(|s| s.parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c {
                Some(s) => s.trim().parse::<f64>().map(Value::Float).unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
    }

    cells
        .into_iter()
        .map(|c| c.map(Value::Text).unwrap_or(Value::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_raw(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_column_typing() {
        let data = raw(
            &["id", "price", "name", "mixed"],
            &[&["1", "10.5", "Alice", "3"], &["2", "", "Bob", "x"], &["3", "7", "NA", "4"]],
        );

        assert_eq!(data.get(0, "id"), Some(&Value::Integer(1)));
        assert_eq!(data.get(0, "price"), Some(&Value::Float(10.5)));
        assert_eq!(data.get(2, "price"), Some(&Value::Float(7.0)));
        assert_eq!(data.get(1, "price"), Some(&Value::Null));
        assert_eq!(data.get(2, "name"), Some(&Value::Null));
        // One unparseable cell keeps the whole column as text.
        assert_eq!(data.get(0, "mixed"), Some(&Value::Text("3".to_string())));
    }

    #[test]
    fn test_whitespace_is_not_null() {
        let data = raw(&["a"], &[&["  "]]);
        let value = data.get(0, "a").unwrap();
        assert!(!value.is_null());
        assert!(value.is_blank());
    }

    #[test]
    fn test_coercion_accessors() {
        assert_eq!(Value::Text(" 12.5 ".into()).coerce_f64(), Some(12.5));
        assert_eq!(Value::Text("12.5".into()).as_f64(), None);
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Text("abc".into()).coerce_f64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(250000.0).to_string(), "250000.0");
        assert_eq!(Value::Integer(7).to_string(), "7");
        assert_eq!(Value::Null.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2020-05-01");
    }

    #[test]
    fn test_retain_keeps_labels_and_reindex_resets() {
        let mut data = raw(&["a"], &[&["1"], &["2"], &["3"], &["4"]]);
        data.retain_rows(|pos, _| pos % 2 == 1);
        assert_eq!(data.index, vec![1, 3]);
        assert_eq!(data.position_of(3), Some(1));

        data.reindex();
        assert_eq!(data.index, vec![0, 1]);
    }

    #[test]
    fn test_set_and_drop_columns() {
        let mut data = raw(&["a", "b", "c"], &[&["1", "2", "3"]]);
        data.set_column("d", vec![Value::Integer(4)]);
        data.set_column("a", vec![Value::Integer(9)]);
        assert_eq!(data.headers, vec!["a", "b", "c", "d"]);
        assert_eq!(data.get(0, "a"), Some(&Value::Integer(9)));

        let removed = data.drop_columns(&["c", "missing", "a"]);
        assert_eq!(removed, vec!["a", "c"]);
        assert_eq!(data.headers, vec!["b", "d"]);
        assert_eq!(data.rows[0], vec![Value::Integer(2), Value::Integer(4)]);
    }

    #[test]
    fn test_fingerprint_tracks_order() {
        let data = raw(&["a"], &[&["1"], &["2"]]);
        let mut swapped = data.clone();
        swapped.rows.swap(0, 1);
        assert_ne!(data.fingerprint(), swapped.fingerprint());
        assert_eq!(data.fingerprint(), data.clone().fingerprint());
    }

    #[test]
    fn test_select_labels() {
        let mut data = raw(&["a"], &[&["1"], &["2"], &["3"]]);
        data.retain_rows(|pos, _| pos != 0);
        let picked = data.select_labels(&BTreeSet::from([2, 0]));
        assert_eq!(picked.index, vec![2]);
        assert_eq!(picked.rows[0], vec![Value::Integer(3)]);
    }
}
