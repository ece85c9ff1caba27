//! Column model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// A single column: a name and an opaque SQL type.
///
/// The type is passed verbatim into generated SQL. Two columns are equal only
/// if both fields match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// SQL type, e.g. `int4` or `text`.
    #[serde(rename = "type")]
    pub column_type: String,
}

impl Column {
    /// Creates a new column.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// An ordered list of columns. Position is declaration order, which is also
/// the physical order of the columns after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnList(Vec<Column>);

impl ColumnList {
    /// Creates an empty column list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        self.0.push(Column::new(name, column_type));
        self
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the column at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.0.get(index)
    }

    /// Iterates over the columns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }


    /// Checks that every name is non-empty, free of NUL and unique.
    ///
    /// The first offending entry in list order is reported.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(self.0.len());
        for (index, column) in self.0.iter().enumerate() {
            if column.name.is_empty() {
                return Err(ValidationError::EmptyColumnName { index });
            }
            if column.name.contains('\0') {
                return Err(ValidationError::NulInName {
                    name: column.name.clone(),
                });
            }
            if let Some(&first) = seen.get(column.name.as_str()) {
                return Err(ValidationError::DuplicateColumn {
                    name: column.name.clone(),
                    first,
                    second: index,
                });
            }
            seen.insert(&column.name, index);
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, column: Column) {
        self.0.push(column);
    }

    pub(crate) fn remove_named(&mut self, name: &str) {
        self.0.retain(|c| c.name != name);
    }

    pub(crate) fn get_named_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.0.iter_mut().find(|c| c.name == name)
    }
}

impl From<Vec<Column>> for ColumnList {
    fn from(columns: Vec<Column>) -> Self {
        Self(columns)
    }
}

impl FromIterator<Column> for ColumnList {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ColumnList {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ColumnList {
    type Item = Column;
    type IntoIter = std::vec::IntoIter<Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
