//! In-memory 2DA table model

/// Cell sentinel meaning "no value" in the source format.
pub const EMPTY_CELL: &str = "****";

/// One row of a 2DA table: (column, value) pairs in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwoDaRow {
    values: Vec<(String, String)>,
}

impl TwoDaRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.push((column.into(), value.into()));
    }

    #[must_use]
    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }

    /// Value of the first non-empty cell in the named column.
    #[must_use]
    pub fn get_string(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, value)| name == column && value != EMPTY_CELL)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn get_int(&self, column: &str) -> Option<i32> {
        self.get_string(column)?.parse().ok()
    }

    #[must_use]
    pub fn get_float(&self, column: &str) -> Option<f32> {
        self.get_string(column)?.parse().ok()
    }

    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        self.get_int(column).map(|v| v != 0)
    }
}

/// A fixed-schema table: ordered column headers plus rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwoDaTable {
    headers: Vec<String>,
    rows: Vec<TwoDaRow>,
}

impl TwoDaTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. If headers are not initialized yet they are taken from
    /// this row's columns.
    pub fn add(&mut self, row: TwoDaRow) {
        if self.headers.is_empty() {
            self.headers = row.values().iter().map(|(name, _)| name.clone()).collect();
        }
        self.rows.push(row);
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[TwoDaRow] {
        &self.rows
    }

    /// First row matching a predicate.
    #[must_use]
    pub fn find(&self, pred: impl Fn(&TwoDaRow) -> bool) -> Option<&TwoDaRow> {
        self.rows.iter().find(|row| pred(row))
    }

    /// First row whose cell in `column` equals `value`.
    #[must_use]
    pub fn find_by_value(&self, column: &str, value: &str) -> Option<&TwoDaRow> {
        self.find(|row| row.get_string(column) == Some(value))
    }

    #[must_use]
    pub fn get_string(&self, row: usize, column: &str) -> Option<&str> {
        self.rows.get(row)?.get_string(column)
    }

    #[must_use]
    pub fn get_int(&self, row: usize, column: &str) -> Option<i32> {
        self.rows.get(row)?.get_int(column)
    }

    #[must_use]
    pub fn get_float(&self, row: usize, column: &str) -> Option<f32> {
        self.rows.get(row)?.get_float(column)
    }

    #[must_use]
    pub fn get_bool(&self, row: usize, column: &str) -> Option<bool> {
        self.rows.get(row)?.get_bool(column)
    }
}
