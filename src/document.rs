//! Renders a record as a printable document and exports it to disk.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{pdf, value::CellValue};

/// Width of the plain-text layout, in characters.
pub const TEXT_WIDTH: usize = 72;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Text),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(anyhow!("Unsupported document format '{other}'")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One `"<Header>: <Value>"` line per column with both a header and a value.
pub fn record_lines(headers: &[String], row: &[CellValue]) -> Vec<String> {
    headers
        .iter()
        .zip(row.iter())
        .filter(|(header, value)| !header.trim().is_empty() && !value.is_empty())
        .map(|(header, value)| format!("{}: {}", header.trim(), value.as_display()))
        .collect()
}

pub fn render_record(title: &str, headers: &[String], row: &[CellValue]) -> Document {
    Document {
        title: title.to_string(),
        lines: record_lines(headers, row),
    }
}

pub fn to_text(document: &Document) -> String {
    let mut out = String::new();
    out.push_str(&center(&document.title, TEXT_WIDTH));
    out.push('\n');
    out.push_str(&"=".repeat(TEXT_WIDTH));
    out.push('\n');
    for line in &document.lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn to_markdown(document: &Document) -> String {
    let mut out = format!("# {}\n\n---\n\n", document.title);
    for line in &document.lines {
        match line.split_once(": ") {
            Some((label, value)) => out.push_str(&format!("- **{label}:** {value}\n")),
            None => out.push_str(&format!("- {line}\n")),
        }
    }
    out
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

pub fn encode(document: &Document, format: ExportFormat) -> Vec<u8> {
    match format {
        ExportFormat::Text => to_text(document).into_bytes(),
        ExportFormat::Markdown => to_markdown(document).into_bytes(),
        ExportFormat::Pdf => pdf::render(&document.title, &document.lines),
    }
}

pub trait DocumentSink {
    fn render(&self, title: &str, lines: Vec<String>) -> Document {
        Document {
            title: title.to_string(),
            lines,
        }
    }

    fn export(&self, document: &Document, format: ExportFormat) -> Result<PathBuf>;
}

/// Writes exported documents into a directory, named after their title.
#[derive(Debug, Clone)]
pub struct FileSink {
    out_dir: PathBuf,
}

impl FileSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl DocumentSink for FileSink {
    fn export(&self, document: &Document, format: ExportFormat) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Creating output directory {:?}", self.out_dir))?;
        let path = self
            .out_dir
            .join(format!("{}.{}", file_stem(&document.title), format.extension()));
        write_document(document, format, &path)?;
        Ok(path)
    }
}

pub fn write_document(document: &Document, format: ExportFormat, path: &Path) -> Result<()> {
    fs::write(path, encode(document, format))
        .with_context(|| format!("Writing document to {path:?}"))?;
    info!(
        "Exported '{}' ({} line(s)) as {format} to {path:?}",
        document.title,
        document.lines.len()
    );
    Ok(())
}

fn file_stem(title: &str) -> String {
    let stem = title
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}
