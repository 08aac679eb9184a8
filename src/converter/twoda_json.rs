//! 2DA to JSON conversion and back
//!
//! Tables become `{"headers": [...], "rows": [{...}]}` with every cell
//! kept as a string, including the `****` empty-cell sentinel. Column
//! order follows the headers array on the way back in; cells missing
//! from a row object read as empty.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::formats::twoda::{self, TwoDaRow, TwoDaTable, EMPTY_CELL};

/// Convert a binary 2DA file to JSON.
pub fn convert_twoda_to_json<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::debug!(
        "Converting 2DA to JSON: {:?} -> {:?}",
        source.as_ref(),
        dest.as_ref()
    );
    let table = twoda::read_twoda(&source)?;
    let json = twoda_to_json(&table)?;
    std::fs::write(dest, json)?;
    Ok(())
}

/// Convert a JSON file back to binary 2DA.
pub fn convert_json_to_twoda<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::debug!(
        "Converting JSON to 2DA: {:?} -> {:?}",
        source.as_ref(),
        dest.as_ref()
    );
    let content = std::fs::read_to_string(source)?;
    let table = json_to_twoda(&content)?;
    twoda::write_twoda(&table, dest)
}

#[derive(Serialize, Deserialize)]
struct JsonTable {
    headers: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

/// Serialize a 2DA table as a pretty-printed JSON string.
pub fn twoda_to_json(table: &TwoDaTable) -> Result<String> {
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.values()
                .iter()
                .map(|(column, value)| (column.clone(), Value::String(value.clone())))
                .collect()
        })
        .collect();
    let doc = JsonTable {
        headers: table.headers().to_vec(),
        rows,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a JSON string into a 2DA table.
pub fn json_to_twoda(content: &str) -> Result<TwoDaTable> {
    let doc: JsonTable = serde_json::from_str(content)?;
    let mut table = TwoDaTable::new();
    for cells in doc.rows {
        let mut row = TwoDaRow::new();
        for header in &doc.headers {
            let value = match cells.get(header) {
                Some(Value::String(s)) => s.as_str(),
                Some(other) => {
                    return Err(Error::MalformedDocument(format!(
                        "cell {header:?} is not a string: {other}"
                    )))
                }
                None => EMPTY_CELL,
            };
            row.add(header.clone(), value);
        }
        table.add(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_table() -> TwoDaTable {
        let mut table = TwoDaTable::new();
        let mut row = TwoDaRow::new();
        row.add("label", "short_sword");
        row.add("cost", "150");
        row.add("icon", EMPTY_CELL);
        table.add(row);
        table
    }

    #[test]
    fn test_json_round_trip() {
        let table = sample_table();
        let json = twoda_to_json(&table).unwrap();
        assert_eq!(json_to_twoda(&json).unwrap(), table);
    }

    #[test]
    fn test_missing_cell_reads_as_empty() {
        let json = r#"{
            "headers": ["label", "cost"],
            "rows": [{"label": "vibroblade"}]
        }"#;
        let table = json_to_twoda(json).unwrap();
        assert_eq!(table.rows()[0].values()[1], ("cost".to_string(), EMPTY_CELL.to_string()));
    }

    #[test]
    fn test_rejects_non_string_cell() {
        let json = r#"{
            "headers": ["cost"],
            "rows": [{"cost": 150}]
        }"#;
        assert!(matches!(
            json_to_twoda(json),
            Err(Error::MalformedDocument(_))
        ));
    }
}
