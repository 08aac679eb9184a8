//! Binary 2DA writing
//!
//! Layout: `"2DA V2.b"` signature and a newline; tab-terminated headers
//! ended by a NUL; u32 row count; tab-terminated decimal row labels; one
//! u16 offset per cell into a deduplicated NUL-terminated string pool
//! (first occurrence wins); u16 pool size; the pool itself.

use std::collections::HashMap;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::document::TwoDaTable;
use crate::error::{Error, Result};
use crate::utils::write_atomic;

pub(crate) const SIGNATURE: &[u8; 8] = b"2DA V2.b";

/// Write a 2DA table to disk (write-to-temp-then-rename).
pub fn write_twoda<P: AsRef<Path>>(table: &TwoDaTable, path: P) -> Result<()> {
    let bytes = serialize_twoda(table)?;
    write_atomic(path.as_ref(), &bytes)
}

/// Serialize a 2DA table to bytes.
pub fn serialize_twoda(table: &TwoDaTable) -> Result<Vec<u8>> {
    // Cells are reconstructed as row-major header-count runs, so every row
    // must line up with the headers
    for (i, row) in table.rows().iter().enumerate() {
        let matches_headers = row.values().len() == table.headers().len()
            && row
                .values()
                .iter()
                .zip(table.headers())
                .all(|((column, _), header)| column == header);
        if !matches_headers {
            return Err(Error::TwoDaRowMismatch {
                row: i,
                expected: table.headers().len(),
                found: row.values().len(),
            });
        }
    }

    let mut output = Vec::new();

    output.extend_from_slice(SIGNATURE);
    output.push(b'\n');

    for header in table.headers() {
        output.extend_from_slice(header.as_bytes());
        output.push(b'\t');
    }
    output.push(0);

    output.write_u32::<LittleEndian>(table.rows().len() as u32)?;

    // Row labels are just the row numbers
    for i in 0..table.rows().len() {
        output.extend_from_slice(i.to_string().as_bytes());
        output.push(b'\t');
    }

    // Cell offsets into the deduplicated data pool
    let mut pool: Vec<&str> = Vec::new();
    let mut offsets: HashMap<&str, usize> = HashMap::new();
    let mut pool_size = 0usize;

    for row in table.rows() {
        for (_, value) in row.values() {
            if let Some(&offset) = offsets.get(value.as_str()) {
                output.write_u16::<LittleEndian>(offset as u16)?;
            } else {
                offsets.insert(value.as_str(), pool_size);
                pool.push(value.as_str());
                output.write_u16::<LittleEndian>(pool_size as u16)?;
                pool_size += value.len() + 1;
                if pool_size > usize::from(u16::MAX) {
                    return Err(Error::TwoDaDataTooLarge { size: pool_size });
                }
            }
        }
    }

    output.write_u16::<LittleEndian>(pool_size as u16)?;

    for value in pool {
        output.extend_from_slice(value.as_bytes());
        output.push(0);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::twoda::TwoDaRow;

    #[test]
    fn test_duplicate_cells_share_pool_entry() {
        let mut table = TwoDaTable::new();
        for _ in 0..2 {
            let mut row = TwoDaRow::new();
            row.add("name", "same");
            table.add(row);
        }
        let bytes = serialize_twoda(&table).unwrap();

        // signature + \n + "name\t" + \0 = 15 bytes, then u32 row count,
        // then "0\t1\t" row labels
        let cells = 15 + 4 + 4;
        assert_eq!(bytes[cells..cells + 2], 0u16.to_le_bytes());
        assert_eq!(bytes[cells + 2..cells + 4], 0u16.to_le_bytes());
        // Pool holds one entry: "same\0"
        assert_eq!(bytes[cells + 4..cells + 6], 5u16.to_le_bytes());
        assert_eq!(&bytes[cells + 6..], b"same\0");
    }

    #[test]
    fn test_rejects_row_not_matching_headers() {
        let mut table = TwoDaTable::new();
        let mut row = TwoDaRow::new();
        row.add("label", "short_sword");
        row.add("cost", "150");
        table.add(row);
        let mut short_row = TwoDaRow::new();
        short_row.add("label", "long_sword");
        table.add(short_row);

        assert!(matches!(
            serialize_twoda(&table),
            Err(Error::TwoDaRowMismatch {
                row: 1,
                expected: 2,
                found: 1,
            })
        ));

        // Same cell count but a renamed column misaligns too
        let mut table = TwoDaTable::new();
        let mut row = TwoDaRow::new();
        row.add("label", "short_sword");
        table.add(row);
        let mut renamed = TwoDaRow::new();
        renamed.add("name", "long_sword");
        table.add(renamed);

        assert!(matches!(
            serialize_twoda(&table),
            Err(Error::TwoDaRowMismatch { row: 1, .. })
        ));
    }
}
