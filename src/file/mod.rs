//! File I/O for HTML pages and schema files.
//!
//! HTML may be plain or gzip-compressed. Schema files may be TOML, JSON or
//! YAML, chosen by extension.

pub mod loader;
