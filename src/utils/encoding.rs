use encoding_rs::{UTF_8, WINDOWS_1252};
use std::path::Path;

use crate::error::Result;

/// Read an input table into a UTF-8 string.
///
/// UTF-8 (with or without BOM) is taken as is; anything that fails to decode
/// as UTF-8 is read as Windows-1252, which is how the government spreadsheets
/// exported these tables.
pub fn read_input(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_input(&bytes))
}

pub fn decode_input(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text.into_owned();
    }

    tracing::debug!("Input is not valid UTF-8, decoding as Windows-1252");
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}
