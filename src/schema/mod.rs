//! Extraction schemas.
//!
//! A schema names the fields to extract from a page and decides which pages
//! it applies to. Schemas are usually loaded from a file:
//!
//! ```toml
//! [[schemas]]
//! match_page_url = "https://example.com/articles/**"
//! match_page_selector = ["article", "h1.title"]
//!
//! [schemas.keys]
//! title = "h1.title | trim"
//! tags = "ul.tags li | toArray | trim"
//! source = "||example.com"
//! ```
//!
//! Each expression is parsed once, when the schema is built.

pub mod url_pattern;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::QueryableDocument;
use crate::expression::{evaluate, Expression, Extraction, SyntaxError};
use crate::transform::{TransformChain, TransformLookup, TransformRegistry};

pub use url_pattern::UrlPattern;

/// One extracted record: field name to JSON value, in schema order.
pub type Record = IndexMap<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid expression for key '{key}': {source}")]
    InvalidExpression {
        key: String,
        #[source]
        source: SyntaxError,
    },

    #[error("Invalid URL pattern '{pattern}': {source}")]
    InvalidUrlPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// One selector or a list of selectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorList {
    One(String),
    Many(Vec<String>),
}

impl SelectorList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SelectorList::One(selector) => vec![selector],
            SelectorList::Many(selectors) => selectors,
        }
    }
}

/// Raw schema as written in a schema file, before expressions are parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// URL glob the page must match. `**` or absent matches every page.
    #[serde(default, alias = "matchPageUrl")]
    pub match_page_url: Option<String>,

    /// Selectors that must all match at least one node.
    #[serde(default, alias = "matchPageSelector")]
    pub match_page_selector: Option<SelectorList>,

    /// Field name to expression string.
    #[serde(default)]
    pub keys: IndexMap<String, String>,
}

/// A parsed schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "SchemaConfig")]
pub struct Schema {
    match_page_url: Option<UrlPattern>,
    match_page_selectors: Vec<String>,
    keys: IndexMap<String, Expression>,
}

impl Schema {
    /// A schema that matches every page and has no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every expression in `config`.
    pub fn from_config(config: SchemaConfig) -> Result<Self, SchemaError> {
        let match_page_url = config
            .match_page_url
            .map(|pattern| {
                UrlPattern::new(&pattern)
                    .map_err(|source| SchemaError::InvalidUrlPattern { pattern, source })
            })
            .transpose()?;

        let keys = config
            .keys
            .into_iter()
            .map(|(key, text)| match Expression::parse(&text) {
                Ok(expr) => Ok((key, expr)),
                Err(source) => Err(SchemaError::InvalidExpression { key, source }),
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        Ok(Self {
            match_page_url,
            match_page_selectors: config
                .match_page_selector
                .map(SelectorList::into_vec)
                .unwrap_or_default(),
            keys,
        })
    }

    /// Adds a field, parsing `expression`.
    pub fn with_key(mut self, key: impl Into<String>, expression: &str) -> Result<Self, SchemaError> {
        let key = key.into();
        let expr = Expression::parse(expression).map_err(|source| SchemaError::InvalidExpression {
            key: key.clone(),
            source,
        })?;
        self.keys.insert(key, expr);
        Ok(self)
    }

    pub fn with_url_pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        let compiled = UrlPattern::new(pattern).map_err(|source| SchemaError::InvalidUrlPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.match_page_url = Some(compiled);
        Ok(self)
    }

    pub fn with_required_selector(mut self, selector: impl Into<String>) -> Self {
        self.match_page_selectors.push(selector.into());
        self
    }

    pub fn keys(&self) -> &IndexMap<String, Expression> {
        &self.keys
    }

    /// Whether this schema applies to the page at `url`.
    ///
    /// The URL must match the pattern, and every required selector must match
    /// at least one node. An invalid required selector counts as no match.
    pub fn is_matching<D>(&self, url: &str, document: &D) -> bool
    where
        D: QueryableDocument + ?Sized,
    {
        if let Some(pattern) = &self.match_page_url {
            if !pattern.is_match(url) {
                debug!(pattern = pattern.as_str(), %url, "URL does not match");
                return false;
            }
        }

        self.match_page_selectors
            .iter()
            .all(|selector| match document.query(selector) {
                Ok(nodes) => !nodes.is_empty(),
                Err(e) => {
                    warn!(%selector, error = %e, "required selector is invalid");
                    false
                }
            })
    }

    /// Evaluates every field against `document`.
    ///
    /// Fields whose selector matches nothing, whose result is `undefined`, or
    /// whose evaluation fails are left out of the record. Failures are logged
    /// and never stop the other fields.
    pub fn extract<D, T>(&self, document: &D, transforms: &T) -> Record
    where
        D: QueryableDocument + ?Sized,
        T: TransformLookup + ?Sized,
    {
        let mut record = Record::with_capacity(self.keys.len());

        for (key, expr) in &self.keys {
            match evaluate(expr, document, transforms) {
                Ok(Extraction::Value(value)) => match value.to_json() {
                    Some(json) => {
                        record.insert(key.clone(), json);
                    }
                    None => debug!(%key, "field evaluated to undefined, skipped"),
                },
                Ok(Extraction::NoMatch) => debug!(%key, %expr, "no match, field skipped"),
                Err(e) => warn!(%key, %expr, error = %e, "field extraction failed"),
            }
        }

        record
    }
}

impl TryFrom<SchemaConfig> for Schema {
    type Error = SchemaError;

    fn try_from(config: SchemaConfig) -> Result<Self, Self::Error> {
        Schema::from_config(config)
    }
}

/// Applies the first matching schema to each page.
#[derive(Debug, Default)]
pub struct Extractor {
    schemas: Vec<Schema>,
    transforms: TransformRegistry,
}

impl Extractor {
    pub fn new(schemas: Vec<Schema>) -> Self {
        Self {
            schemas,
            transforms: TransformRegistry::new(),
        }
    }

    /// Uses `transforms` as the custom registry, consulted before the built-ins.
    pub fn with_transforms(mut self, transforms: TransformRegistry) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn find_schema<D>(&self, url: &str, document: &D) -> Option<&Schema>
    where
        D: QueryableDocument + ?Sized,
    {
        self.schemas
            .iter()
            .find(|schema| schema.is_matching(url, document))
    }

    /// Extracts a record from the page, or `None` when no schema applies.
    pub fn extract<D>(&self, url: &str, document: &D) -> Option<Record>
    where
        D: QueryableDocument + ?Sized,
    {
        let Some(schema) = self.find_schema(url, document) else {
            debug!(%url, "no schema matches page");
            return None;
        };
        let chain = TransformChain::with_custom(&self.transforms);
        Some(schema.extract(document, &chain))
    }
}
