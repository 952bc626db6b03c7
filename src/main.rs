use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use wxport::config::Config;
use wxport::document::HtmlDocument;
use wxport::file::loader::{load_html_file, load_html_from_stdin, load_schemas};
use wxport::logging::init_logging;
use wxport::schema::{Extractor, Record};

/// wxport - Extract structured records from HTML pages
#[derive(Parser)]
#[command(name = "wxport")]
#[command(version)]
#[command(about = "Extract structured records from HTML pages", long_about = None)]
struct Cli {
    /// HTML files to extract from (omit to read one page from stdin)
    files: Vec<PathBuf>,

    /// Schema file (TOML, JSON or YAML); defaults to the configured schema
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Page URL used for schema matching (defaults to the file path)
    #[arg(short, long)]
    url: Option<String>,

    /// Pretty-print output as a single JSON array
    #[arg(short, long)]
    pretty: bool,

    /// Log filter, e.g. "debug" or "wxport=trace" (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level)?;
    if let Some(e) = config_error {
        tracing::warn!("ignoring unreadable config, using defaults: {:#}", e);
    }

    let schema_path = cli
        .schema
        .or(config.schema)
        .context("No schema file given: pass --schema or set `schema` in the config file")?;
    let extractor = Extractor::new(load_schemas(&schema_path)?);
    if extractor.schemas().is_empty() {
        tracing::warn!(path = %schema_path.display(), "schema file defines no schemas");
    }
    let pretty = cli.pretty || config.pretty;

    let pages = if cli.files.is_empty() {
        if io::stdin().is_terminal() {
            anyhow::bail!("No input files given and stdin is not piped");
        }
        let url = cli.url.clone().unwrap_or_default();
        vec![(url, load_html_from_stdin()?)]
    } else {
        cli.files
            .iter()
            .map(|path| {
                let url = cli
                    .url
                    .clone()
                    .unwrap_or_else(|| path.to_string_lossy().into_owned());
                load_html_file(path).map(|html| (url, html))
            })
            .collect::<Result<Vec<_>>>()?
    };

    let mut records: Vec<Record> = Vec::with_capacity(pages.len());
    for (url, html) in pages {
        let document = HtmlDocument::parse(&html);
        match extractor.extract(&url, &document) {
            Some(record) => records.push(record),
            None => tracing::warn!(%url, "no schema matches page, skipped"),
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, &records).context("Failed to write output")?;
        writeln!(out)?;
    } else {
        for record in &records {
            serde_json::to_writer(&mut out, record).context("Failed to write output")?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(())
}
