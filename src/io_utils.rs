//! CSV reading and writing helpers for the file-backed row store.
//!
//! - **Delimiters**: `parse_delimiter` accepts names (`tab`, `pipe`, ...) as
//!   well as single ASCII characters.
//! - **Encoding**: table files are decoded with a configurable `encoding_rs`
//!   encoding and written back in the same encoding.
//! - **Raggedness**: spreadsheets exported to CSV are rarely rectangular, so
//!   readers are flexible and rows keep whatever width they were written with.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use anyhow::{Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_DELIMITER: u8 = b',';

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoded records of one table file, header included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFile {
    pub rows: Vec<Vec<String>>,
    /// The file started with a UTF-8 byte order mark, which decoding strips
    /// and rewriting puts back.
    pub bom: bool,
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> io::Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to decode text with encoding {}", encoding.name()),
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Reads every record of a CSV file, header included, as decoded strings.
pub fn read_rows(path: &Path, delimiter: u8, encoding: &'static Encoding) -> io::Result<TableFile> {
    let bytes = fs::read(path)?;
    let bom = bytes.starts_with(UTF8_BOM);
    let text = decode_bytes(&bytes, encoding)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(TableFile { rows, bom })
}

/// Rewrites a CSV file in full. Output goes to a sibling temporary file that
/// replaces the target only once it is complete.
pub fn write_rows(
    path: &Path,
    table: &TableFile,
    delimiter: u8,
    encoding: &'static Encoding,
) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .flexible(true)
        .from_writer(Vec::new());
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|err| io::Error::other(err.to_string()))?;
    let encoded = encode_output(buffer, encoding, table.bom)?;

    let staging = path.with_extension("csv.partial");
    {
        let mut file = fs::File::create(&staging)?;
        file.write_all(&encoded)?;
        file.flush()?;
    }
    fs::rename(&staging, path)
}

fn encode_output(buffer: Vec<u8>, encoding: &'static Encoding, bom: bool) -> io::Result<Vec<u8>> {
    if encoding == UTF_8 {
        if bom {
            let mut out = UTF8_BOM.to_vec();
            out.extend_from_slice(&buffer);
            return Ok(out);
        }
        return Ok(buffer);
    }
    let text = String::from_utf8(buffer)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    let (encoded, _, had_errors) = encoding.encode(&text);
    if had_errors {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to encode text using {}", encoding.name()),
        ));
    }
    Ok(encoded.into_owned())
}
