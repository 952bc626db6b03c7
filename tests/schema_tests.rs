//! Integration tests for schema matching and record extraction.

use serde_json::json;
use wxport::document::HtmlDocument;
use wxport::expression::Datum;
use wxport::file::loader::parse_schemas;
use wxport::schema::{Extractor, Schema, SchemaError};
use wxport::transform::TransformRegistry;

const ARTICLE_PAGE: &str = r#"<html><body>
  <article>
    <h1 class="title">  Parsing HTML  </h1>
    <time datetime="2020-01-02">Jan 2</time>
    <ul class="tags"><li>rust</li><li>html</li></ul>
  </article>
</body></html>"#;

const LISTING_PAGE: &str = r#"<html><body>
  <section class="listing"><a href="/a">A</a><a href="/b">B</a></section>
</body></html>"#;

const SCHEMAS: &str = r#"
[[schemas]]
match_page_url = "https://blog.test/posts/**"
match_page_selector = ["article", "h1.title"]

[schemas.keys]
title = "h1.title | trim"
published = "time | attr(datetime)"
tags = "ul.tags li | toArray | text"
site = "||blog.test"
summary = "p.summary"

[[schemas]]
match_page_url = "**"
match_page_selector = "section.listing"

[schemas.keys]
links = "section.listing a | toArray | attr(href)"
"#;

fn extractor() -> Extractor {
    Extractor::new(parse_schemas(SCHEMAS, "toml").unwrap())
}

#[test]
fn test_first_matching_schema_builds_record() {
    let doc = HtmlDocument::parse(ARTICLE_PAGE);
    let record = extractor()
        .extract("https://blog.test/posts/2020/parsing", &doc)
        .unwrap();

    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({
            "title": "Parsing HTML",
            "published": "2020-01-02",
            "tags": ["rust", "html"],
            "site": "blog.test",
        })
    );
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["title", "published", "tags", "site"]);
}

#[test]
fn test_url_mismatch_falls_through_to_next_schema() {
    let doc = HtmlDocument::parse(LISTING_PAGE);
    let record = extractor().extract("https://other.test/", &doc).unwrap();
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"links": ["/a", "/b"]})
    );
}

#[test]
fn test_no_schema_matches() {
    let doc = HtmlDocument::parse("<p>nothing here</p>");
    let extractor = extractor();
    assert!(extractor.find_schema("https://blog.test/posts/x", &doc).is_none());
    assert!(extractor.extract("https://blog.test/posts/x", &doc).is_none());
}

#[test]
fn test_article_url_without_article_markup() {
    let doc = HtmlDocument::parse(LISTING_PAGE);
    let extractor = extractor();
    let schema = extractor
        .find_schema("https://blog.test/posts/x", &doc)
        .unwrap();
    assert!(schema.keys().contains_key("links"));
}

#[test]
fn test_custom_transforms_are_used() {
    let mut custom = TransformRegistry::new();
    custom.register("shout", |input, _args| {
        Ok(Datum::String(format!("{}!", input.to_text().trim())))
    });

    let schemas = vec![Schema::new().with_key("title", "h1 | shout").unwrap()];
    let extractor = Extractor::new(schemas).with_transforms(custom);

    let doc = HtmlDocument::parse(ARTICLE_PAGE);
    let record = extractor.extract("file:///tmp/page.html", &doc).unwrap();
    assert_eq!(record["title"], json!("Parsing HTML!"));
}

#[test]
fn test_url_pattern_character_class() {
    let doc = HtmlDocument::parse(LISTING_PAGE);
    let schema = Schema::new()
        .with_url_pattern("https://x.test/page-[0-9]")
        .unwrap();
    assert!(schema.is_matching("https://x.test/page-1", &doc));
    assert!(!schema.is_matching("https://x.test/page-a", &doc));
}

#[test]
fn test_invalid_url_pattern_is_reported() {
    let err = parse_schemas("[[schemas]]\nmatch_page_url = \"https://x.test/a**\"\n", "toml")
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid URL pattern"));

    let err = Schema::new().with_url_pattern("https://x.test/[").unwrap_err();
    assert!(matches!(err, SchemaError::InvalidUrlPattern { ref pattern, .. } if pattern == "https://x.test/["));
}

#[test]
fn test_invalid_expression_is_reported() {
    let err = Schema::new().with_key("bad", "h1 |").unwrap_err();
    assert!(matches!(err, SchemaError::InvalidExpression { ref key, .. } if key == "bad"));
    assert!(err
        .to_string()
        .starts_with("Invalid expression for key 'bad': Parse error"));
}
