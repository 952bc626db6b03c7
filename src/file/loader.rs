//! Loading HTML pages and schema files from disk or stdin.

use crate::document::HtmlDocument;
use crate::schema::Schema;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Contents of a schema file: a list of schemas, tried in order.
#[derive(Debug, Default, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub schemas: Vec<Schema>,
}

/// Reads an HTML file, decompressing it if it is gzipped.
///
/// A file counts as gzipped when its extension is `.gz` or when it starts with
/// the gzip magic bytes.
///
/// # Examples
///
/// ```no_run
/// use wxport::file::loader::load_html_file;
///
/// let html = load_html_file("page.html.gz").unwrap();
/// assert!(html.contains("<html"));
/// ```
pub fn load_html_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let bytes = fs::read(path_ref)
        .with_context(|| format!("Failed to read file {}", path_ref.display()))?;

    let has_gz_extension = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if has_gz_extension || bytes.starts_with(&GZIP_MAGIC) {
        decompress_gzip_bytes(&bytes)
            .with_context(|| format!("Failed to decompress {}", path_ref.display()))
    } else {
        String::from_utf8(bytes).with_context(|| format!("Invalid UTF-8 in {}", path_ref.display()))
    }
}

/// Reads and parses an HTML file.
pub fn load_html_document<P: AsRef<Path>>(path: P) -> Result<HtmlDocument> {
    load_html_file(path).map(|html| HtmlDocument::parse(&html))
}

/// Reads HTML from standard input, gzipped or not.
pub fn load_html_from_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;

    if buffer.starts_with(&GZIP_MAGIC) {
        decompress_gzip_bytes(&buffer).context("Failed to decompress gzipped stdin")
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in stdin")
    }
}

/// Loads schemas from a TOML, JSON or YAML file.
///
/// Every expression is parsed while loading, so a bad expression fails here
/// with the offending key in the error chain.
pub fn load_schemas<P: AsRef<Path>>(path: P) -> Result<Vec<Schema>> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read schema file {}", path_ref.display()))?;

    let format = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    parse_schemas(&content, &format)
        .with_context(|| format!("Failed to load schemas from {}", path_ref.display()))
}

/// Parses schema file content. `format` is a file extension: `toml`, `json`,
/// `yaml` or `yml`.
pub fn parse_schemas(content: &str, format: &str) -> Result<Vec<Schema>> {
    let file: SchemaFile = match format {
        "toml" => toml::from_str(content).context("Invalid TOML schema file")?,
        "json" => serde_json::from_str(content).context("Invalid JSON schema file")?,
        "yaml" | "yml" => serde_yaml::from_str(content).context("Invalid YAML schema file")?,
        other => anyhow::bail!("Unsupported schema file format '{}'", other),
    };

    tracing::debug!(count = file.schemas.len(), "loaded schemas");
    Ok(file.schemas)
}

fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("File may be corrupted or not valid UTF-8")?;
    Ok(content)
}
