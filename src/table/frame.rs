//! Row Table Module
//!
//! The columnar result shape everything else operates on: one time column and
//! N value columns held as parallel arrays aligned by index. Every row
//! operation in this module applies the same positions to the time column and
//! to every value column, which is what keeps rows aligned through merge and
//! trim.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

// == Value Column ==
/// One value column: a name, its series labels, and per-row values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColumn {
    /// Column name, e.g. "temperature"
    pub name: String,
    /// Series labels, e.g. line => "1"
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Per-row values, parallel to the table's time column
    pub values: Vec<f64>,
}

impl ValueColumn {
    /// Creates an empty column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            values: Vec::new(),
        }
    }

    /// Creates an empty column with labels.
    pub fn with_labels(name: impl Into<String>, labels: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            labels,
            values: Vec::new(),
        }
    }
}

// == Row Table ==
/// A time column plus N parallel value columns.
///
/// `ref_id` names the target that produced the table; a table arriving from
/// the backend without one cannot be matched back to its request and is
/// treated as malformed by response assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowTable {
    /// The target this table answers, if the backend attributed it
    #[serde(default)]
    pub ref_id: Option<String>,
    /// Epoch-millisecond timestamps, monotonic per the target's sort order
    pub times: Vec<i64>,
    /// Value columns, each the same length as `times`
    pub columns: Vec<ValueColumn>,
}

impl RowTable {
    // == Constructors ==
    /// Creates an empty table attributed to a target.
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: Some(ref_id.into()),
            times: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Creates an empty table with no target attribution.
    pub fn unattributed() -> Self {
        Self {
            ref_id: None,
            times: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Adds an empty value column, builder style.
    pub fn with_column(mut self, column: ValueColumn) -> Self {
        self.columns.push(column);
        self
    }

    // == Row Access ==
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Timestamp of the first row.
    pub fn first_time(&self) -> Option<i64> {
        self.times.first().copied()
    }

    /// Timestamp of the last row.
    pub fn last_time(&self) -> Option<i64> {
        self.times.last().copied()
    }

    /// Appends one row across the time column and every value column.
    ///
    /// `values` must carry exactly one value per column.
    pub fn push_row(&mut self, time: i64, values: &[f64]) {
        assert_eq!(
            values.len(),
            self.columns.len(),
            "row width must match column count"
        );
        self.times.push(time);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.values.push(*value);
        }
    }

    // == Frame Identity ==
    /// Identity string used to match this table to a previously cached one of
    /// the same series: first value column name plus its labels.
    pub fn frame_identity(&self) -> String {
        match self.columns.first() {
            Some(column) => {
                let labels = column
                    .labels
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}{{{}}}", column.name, labels)
            }
            None => String::new(),
        }
    }

    // == Row Operations ==
    /// Copies the rows at `range`, identically across every column.
    pub fn slice_rows(&self, range: Range<usize>) -> RowTable {
        RowTable {
            ref_id: self.ref_id.clone(),
            times: self.times[range.clone()].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|column| ValueColumn {
                    name: column.name.clone(),
                    labels: column.labels.clone(),
                    values: column.values[range.clone()].to_vec(),
                })
                .collect(),
        }
    }

    /// Concatenates another table's rows after this one's, column by column.
    ///
    /// Value columns are matched by position; names and labels come from
    /// whichever side has columns at all.
    pub fn concat(&self, other: &RowTable) -> RowTable {
        let mut result = self.clone();
        if result.ref_id.is_none() {
            result.ref_id = other.ref_id.clone();
        }
        result.times.extend_from_slice(&other.times);
        if result.columns.is_empty() {
            result.columns = other.columns.clone();
        } else {
            for (column, incoming) in result.columns.iter_mut().zip(&other.columns) {
                column.values.extend_from_slice(&incoming.values);
            }
        }
        result
    }

    /// Returns a zero-length table with the same column names and labels.
    pub fn cleared(&self) -> RowTable {
        RowTable {
            ref_id: self.ref_id.clone(),
            times: Vec::new(),
            columns: self
                .columns
                .iter()
                .map(|column| ValueColumn {
                    name: column.name.clone(),
                    labels: column.labels.clone(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }
}
