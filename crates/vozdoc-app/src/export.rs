//! Document export.
//!
//! Word export writes a `.doc` file containing an HTML shell with the
//! Office namespaces, which Word opens natively. PDF needs a renderer the
//! host does not ship, so requesting it reports a recoverable export error
//! instead of producing a broken file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use vozdoc_command::document::ExportFormat;
use vozdoc_core::error::{Result, VozdocError};

/// Byte order mark so Word decodes the file as UTF-8.
const UTF8_BOM: &str = "\u{feff}";

/// Everything needed to materialize one export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportData {
    pub title: String,
    pub file_name: String,
    pub html: String,
    pub text: String,
}

impl ExportData {
    pub fn new(title: &str, html: &str, text: &str) -> Self {
        let title = if title.trim().is_empty() {
            "Documento sin título".to_string()
        } else {
            title.trim().to_string()
        };
        Self {
            file_name: sanitize_file_name(&title),
            title,
            html: html.to_string(),
            text: text.to_string(),
        }
    }
}

/// Turn a title into a safe file-name slug: lowercase, accents folded,
/// anything non-alphanumeric collapsed to single hyphens.
pub fn sanitize_file_name(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.to_lowercase().chars() {
        let folded = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        };
        if folded.is_ascii_alphanumeric() {
            slug.push(folded);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "documento".to_string()
    } else {
        slug
    }
}

/// Minimal HTML escaping for user text embedded in the export shell.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub trait DocumentExporter {
    /// Produce the export, returning the written file's path.
    fn export(&self, data: &ExportData, format: ExportFormat) -> Result<PathBuf>;
}

/// Exporter writing Word-compatible `.doc` files into a directory.
pub struct WordFileExporter {
    output_dir: PathBuf,
}

impl WordFileExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn word_shell(data: &ExportData) -> String {
        format!(
            concat!(
                "{bom}<html xmlns:o='urn:schemas-microsoft-com:office:office' ",
                "xmlns:w='urn:schemas-microsoft-com:office:word' ",
                "xmlns='http://www.w3.org/TR/REC-html40'>",
                "<head><meta charset='utf-8'><title>{title}</title></head>",
                "<body><h1>{title}</h1>{body}</body></html>"
            ),
            bom = UTF8_BOM,
            title = escape_html(&data.title),
            body = data.html,
        )
    }
}

impl DocumentExporter for WordFileExporter {
    fn export(&self, data: &ExportData, format: ExportFormat) -> Result<PathBuf> {
        match format {
            ExportFormat::Word => {
                fs::create_dir_all(&self.output_dir)?;
                let path = self.output_dir.join(format!("{}.doc", data.file_name));
                fs::write(&path, Self::word_shell(data))?;
                info!("exported '{}' to {}", data.title, path.display());
                Ok(path)
            }
            ExportFormat::Pdf => Err(VozdocError::Export(
                "la exportación a PDF no está disponible en este equipo".to_string(),
            )),
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if let Some(rest) = data_dir.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        return Path::new(&home).join(rest);
    }
    PathBuf::from(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Informe Anual 2026"), "informe-anual-2026");
        assert_eq!(sanitize_file_name("Canción: ¡adiós!"), "cancion-adios");
        assert_eq!(sanitize_file_name("???"), "documento");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_html("\"ok\""), "&quot;ok&quot;");
    }

    #[test]
    fn test_word_export_writes_shell_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = WordFileExporter::new(dir.path());
        let data = ExportData::new("Mi Informe", "<b>hola</b>", "hola");
        let path = exporter.export(&data, ExportFormat::Word).unwrap();

        assert_eq!(path.file_name().unwrap(), "mi-informe.doc");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with('\u{feff}'));
        assert!(contents.contains("<b>hola</b>"));
        assert!(contents.contains("schemas-microsoft-com:office:word"));
    }

    #[test]
    fn test_pdf_export_is_a_recoverable_error() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = WordFileExporter::new(dir.path());
        let data = ExportData::new("Doc", "", "");
        let err = exporter.export(&data, ExportFormat::Pdf).unwrap_err();
        assert!(matches!(err, VozdocError::Export(_)));
    }

    #[test]
    fn test_untitled_fallback() {
        let data = ExportData::new("   ", "", "");
        assert_eq!(data.title, "Documento sin título");
        assert_eq!(data.file_name, "documento-sin-titulo");
    }
}
