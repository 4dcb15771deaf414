//! In-memory tabular record sets.
//!
//! Every subject is read into a [`Dataset`]: a list of named columns plus rows
//! of [`Value`] cells. Schemas differ between subjects, so columns are looked
//! up by name rather than through per-subject structs.

use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Columns that hold identifiers or labels and are never parsed as numbers.
pub const TEXT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "city",
    "state",
    "studentlevel",
    "deglevel",
    "cip",
    "cip_description",
];

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Num(f64),
    Text(String),
}

impl Value {
    /// Parses a raw CSV field belonging to `column`.
    ///
    /// Empty fields and `NA`/`NaN` markers become [`Value::Null`]. Fields of
    /// [`TEXT_COLUMNS`] stay text; anything else is a number when it parses
    /// as one.
    pub fn parse(column: &str, raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("nan") {
            return Value::Null;
        }
        if TEXT_COLUMNS.contains(&column) {
            return Value::Text(raw.to_string());
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Num(n),
            _ => Value::Text(raw.to_string()),
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn key(&self) -> CellKey<'_> {
        match self {
            Value::Null => CellKey::Null,
            Value::Num(n) => CellKey::Num(n.to_bits()),
            Value::Text(s) => CellKey::Text(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Num(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Hashable view of a cell, used for duplicate detection.
#[derive(PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Num(u64),
    Text(&'a str),
}

/// Borrowed view of one row with by-name column access.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn num(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_num)
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Value::as_text)
    }

    /// The `year` column as an integer, when present and integral.
    pub fn year(&self) -> Option<i32> {
        self.num("year")
            .filter(|y| y.fract() == 0.0)
            .map(|y| y as i32)
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a dataset from literal columns and rows, checking row widths.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut ds = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            ds.push_row(row)?;
        }
        Ok(ds)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "row has {} cells but the dataset has {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Returns a copy holding only the rows accepted by `keep`.
    pub fn filter(&self, mut keep: impl FnMut(&Row<'_>) -> bool) -> Dataset {
        let rows = self
            .rows()
            .filter(|r| keep(r))
            .map(|r| r.values.to_vec())
            .collect();
        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Projects onto `names`, in that order. Names the dataset lacks are
    /// skipped rather than treated as an error.
    pub fn select(&self, names: &[&str]) -> Dataset {
        let picked: Vec<(String, usize)> = names
            .iter()
            .filter_map(|n| {
                self.columns
                    .iter()
                    .position(|c| c == n)
                    .map(|i| (n.to_string(), i))
            })
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| picked.iter().map(|(_, i)| row[*i].clone()).collect())
            .collect();

        Dataset {
            columns: picked.into_iter().map(|(n, _)| n).collect(),
            rows,
        }
    }

    /// Stable sort by the `year` column; rows without a year go last.
    pub fn sort_by_year(&mut self) {
        let Some(idx) = self.columns.iter().position(|c| c == "year") else {
            return;
        };
        self.rows.sort_by(|a, b| match (a[idx].as_num(), b[idx].as_num()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    /// Drops exact duplicate rows, keeping the first occurrence.
    pub fn dedup(&mut self) {
        let keep: Vec<bool> = {
            let mut seen = HashSet::new();
            self.rows
                .iter()
                .map(|row| seen.insert(row.iter().map(Value::key).collect::<Vec<_>>()))
                .collect()
        };
        let mut flags = keep.into_iter();
        self.rows.retain(|_| flags.next().unwrap_or(false));
    }

    /// Reads a headed CSV stream.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut ds = Dataset::new(columns);

        for result in rdr.records() {
            let record = result?;
            let row = ds
                .columns
                .iter()
                .zip(record.iter())
                .map(|(col, raw)| Value::parse(col, raw))
                .collect();
            ds.push_row(row)?;
        }

        Ok(ds)
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::from_csv_reader(file).with_context(|| format!("failed to read {}", path.display()))
    }
}
