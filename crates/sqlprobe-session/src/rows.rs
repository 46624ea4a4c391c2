//! Positional string rows returned by `execute_query`

/// A single result row with positional, string-typed columns.
///
/// No typed decoding happens here. Every column arrives as backend text
/// and interpretation (int, double, ...) is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    values: Vec<Option<String>>,
}

impl Row {
    /// Build a row from column values (`None` = SQL NULL)
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Column value at `index`.
    ///
    /// Returns `None` for SQL NULL and for out-of-range indexes alike;
    /// callers that need the distinction can check [`column_count`]
    /// first.
    ///
    /// [`column_count`]: Self::column_count
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Number of columns in this row
    pub fn column_count(&self) -> usize {
        self.values.len()
    }
}

/// A finite, single-pass sequence of rows.
///
/// The backend cursor was fully consumed before this value was built, so
/// dropping it early never leaves a dangling cursor on the connection and
/// the owning session can always be reused.
#[derive(Debug)]
pub struct Rows {
    inner: std::vec::IntoIter<Row>,
}

impl Rows {
    /// Build from already-drained rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            inner: rows.into_iter(),
        }
    }

    /// Number of rows not yet consumed
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if no rows remain
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Rows {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(values: &[Option<&str>]) -> Row {
        Row::new(values.iter().map(|v| v.map(str::to_string)).collect())
    }

    #[test]
    fn test_positional_access() {
        let r = row(&[Some("test_table"), Some("INT"), None]);
        assert_eq!(r.get(0), Some("test_table"));
        assert_eq!(r.get(1), Some("INT"));
        assert_eq!(r.get(2), None);
        assert_eq!(r.get(3), None);
        assert_eq!(r.column_count(), 3);
    }

    #[test]
    fn test_rows_are_single_pass() {
        let mut rows = Rows::new(vec![row(&[Some("a")]), row(&[Some("b")])]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.next().unwrap().get(0), Some("a"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.next().unwrap().get(0), Some("b"));
        assert!(rows.next().is_none());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_rows() {
        let mut rows = Rows::new(Vec::new());
        assert!(rows.is_empty());
        assert!(rows.next().is_none());
    }
}
