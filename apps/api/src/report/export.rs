//! Report export — writes a generated report to `report.docx` or `report.txt`.
//!
//! The `.docx` output is the smallest valid WordprocessingML package: content
//! types, the package relationship, and a document part holding one paragraph.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document packaging error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[serde(alias = "docx")]
    Word,
    #[serde(alias = "txt")]
    Text,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Word => "report.docx",
            ExportFormat::Text => "report.txt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Writes `report` into `dir` using the fixed file name for `format` and
/// returns the path of the written file.
pub fn export_report(
    report: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format.file_name());

    match format {
        ExportFormat::Text => std::fs::write(&path, report.as_bytes())?,
        ExportFormat::Word => write_docx(report, &path)?,
    }

    debug!("Exported report ({} bytes) to {}", report.len(), path.display());
    Ok(path)
}

fn write_docx(report: &str, path: &Path) -> Result<(), ExportError> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS_XML.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml(report).as_bytes())?;

    zip.finish()?;
    Ok(())
}

/// Renders the document part: one paragraph, one run, line breaks as `<w:br/>`.
fn document_xml(report: &str) -> String {
    let run = report
        .split('\n')
        .map(|line| {
            format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape_xml(line.trim_end_matches('\r'))
            )
        })
        .collect::<Vec<_>>()
        .join("<w:br/>");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r>{run}</w:r></w:p></w:body></w:document>"#
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
