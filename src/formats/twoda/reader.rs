//! Binary 2DA reading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use super::document::{TwoDaRow, TwoDaTable};
use super::writer::SIGNATURE;
use crate::error::{Error, Result};

/// Read a 2DA table from disk.
pub fn read_twoda<P: AsRef<Path>>(path: P) -> Result<TwoDaTable> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_twoda_bytes(&buffer)
}

/// Parse a 2DA table from bytes.
pub fn parse_twoda_bytes(data: &[u8]) -> Result<TwoDaTable> {
    if data.get(..8) != Some(SIGNATURE.as_slice()) || data.get(8) != Some(&b'\n') {
        return Err(Error::InvalidTwoDaSignature);
    }
    let mut cursor = TokenCursor { data, pos: 9 }; // past signature + newline

    // Headers run until the NUL terminator
    let mut headers = Vec::new();
    while let Some(token) = cursor.read_token()? {
        headers.push(token);
    }

    let row_count = cursor.read_u32()? as usize;

    // Row labels carry no information; skip them
    for _ in 0..row_count {
        cursor.read_token()?;
    }

    let cell_count = row_count * headers.len();
    let mut offsets = Vec::with_capacity(cell_count);
    for _ in 0..cell_count {
        offsets.push(cursor.read_u16()?);
    }
    let _pool_size = cursor.read_u16()?;
    let pool_start = cursor.pos;

    let mut table = TwoDaTable::new();
    for i in 0..row_count {
        let mut row = TwoDaRow::new();
        for (j, header) in headers.iter().enumerate() {
            let offset = pool_start + usize::from(offsets[i * headers.len() + j]);
            row.add(header.clone(), read_cstring(data, offset)?);
        }
        table.add(row);
    }

    Ok(table)
}

fn read_cstring(data: &[u8], offset: usize) -> Result<String> {
    let tail = data.get(offset..).ok_or(Error::UnexpectedEof {
        section: "cell data",
    })?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::TwoDaUnterminatedToken)?;
    Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
}

struct TokenCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl TokenCursor<'_> {
    /// Next tab-terminated token, or `None` at the NUL list terminator.
    fn read_token(&mut self) -> Result<Option<String>> {
        let start = self.pos;
        loop {
            match self.data.get(self.pos) {
                Some(0) => {
                    let token_end = self.pos;
                    self.pos += 1;
                    if token_end == start {
                        return Ok(None);
                    }
                    return Ok(Some(
                        String::from_utf8_lossy(&self.data[start..token_end]).into_owned(),
                    ));
                }
                Some(b'\t') => {
                    let token = String::from_utf8_lossy(&self.data[start..self.pos]).into_owned();
                    self.pos += 1;
                    return Ok(Some(token));
                }
                Some(_) => self.pos += 1,
                None => return Err(Error::TwoDaUnterminatedToken),
            }
        }
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or(Error::UnexpectedEof { section: "2da" })?;
        self.pos += 4;
        Ok(LittleEndian::read_u32(bytes))
    }

    fn read_u16(&mut self) -> Result<u16> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 2)
            .ok_or(Error::UnexpectedEof { section: "2da" })?;
        self.pos += 2;
        Ok(LittleEndian::read_u16(bytes))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::twoda::{serialize_twoda, EMPTY_CELL};

    #[test]
    fn test_round_trip() {
        let mut table = TwoDaTable::new();
        let mut row = TwoDaRow::new();
        row.add("label", "short_sword");
        row.add("cost", "150");
        row.add("icon", EMPTY_CELL);
        table.add(row);
        let mut row = TwoDaRow::new();
        row.add("label", "long_sword");
        row.add("cost", "150"); // duplicate cell, shares a pool entry
        row.add("icon", "iw_lngswrd");
        table.add(row);

        let bytes = serialize_twoda(&table).unwrap();
        let parsed = parse_twoda_bytes(&bytes).unwrap();
        assert_eq!(parsed, table);
        assert_eq!(parsed.get_string(0, "icon"), None);
        assert_eq!(parsed.get_int(1, "cost"), Some(150));
    }

    #[test]
    fn test_round_trip_empty_table() {
        let table = TwoDaTable::new();
        let bytes = serialize_twoda(&table).unwrap();
        assert_eq!(parse_twoda_bytes(&bytes).unwrap(), table);
    }

    #[test]
    fn test_rejects_bad_signature() {
        assert!(matches!(
            parse_twoda_bytes(b"2DA V2.0\n\0"),
            Err(Error::InvalidTwoDaSignature)
        ));
    }

    #[test]
    fn test_rejects_missing_newline_after_signature() {
        let mut bytes = serialize_twoda(&TwoDaTable::new()).unwrap();
        bytes[8] = b' ';
        assert!(matches!(
            parse_twoda_bytes(&bytes),
            Err(Error::InvalidTwoDaSignature)
        ));
    }
}
