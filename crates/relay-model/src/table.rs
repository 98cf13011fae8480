//! Rectangular lookup tables for `TABLE` elements and the lookup mapper.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    pub name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LookupTable {
    /// Builds a table from a header row and data rows.
    ///
    /// Short rows are padded with empty cells so every row is as wide as the header.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(column.trim()))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Value of `lookup_column` in the first row whose `index_column` equals `value`.
    pub fn lookup_value(&self, index_column: &str, value: &str, lookup_column: &str) -> Option<&str> {
        self.lookup_values(&[(index_column, value)], lookup_column)
    }

    /// Value of `lookup_column` in the first row matching every `(column, value)` pair.
    ///
    /// Matching ignores ASCII case.
    pub fn lookup_values(&self, index: &[(&str, &str)], lookup_column: &str) -> Option<&str> {
        let lookup_idx = self.column_index(lookup_column)?;
        let mut criteria = Vec::with_capacity(index.len());
        for (column, value) in index {
            criteria.push((self.column_index(column)?, *value));
        }
        self.rows
            .iter()
            .find(|row| {
                criteria
                    .iter()
                    .all(|(idx, value)| row.get(*idx).is_some_and(|cell| cell.eq_ignore_ascii_case(value)))
            })
            .and_then(|row| row.get(lookup_idx))
            .map(String::as_str)
    }

    /// All distinct values of a column, in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Vec<&str> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            let cell = row[idx].as_str();
            if !seen.contains(&cell) {
                seen.push(cell);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LookupTable {
        LookupTable::new(
            "test",
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec!["1".into(), "2".into(), "x".into()],
                vec!["3".into(), "4".into(), "y".into()],
                vec!["5".into(), "6".into(), "z".into()],
                vec!["3".into()],
            ],
        )
    }

    #[test]
    fn single_index_lookup() {
        let table = table();
        assert_eq!(table.lookup_value("a", "3", "c"), Some("y"));
        assert_eq!(table.lookup_value("A", "5", "C"), Some("z"));
        assert_eq!(table.lookup_value("a", "7", "c"), None);
        assert_eq!(table.lookup_value("missing", "3", "c"), None);
    }

    #[test]
    fn multi_index_lookup() {
        let table = table();
        assert_eq!(table.lookup_values(&[("a", "3"), ("b", "4")], "c"), Some("y"));
        assert_eq!(table.lookup_values(&[("a", "3"), ("b", "6")], "c"), None);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = table();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.distinct_values("c"), vec!["x", "y", "z", ""]);
    }
}
