//! Integration tests for evaluating expressions against HTML.

use wxport::document::HtmlDocument;
use wxport::expression::{evaluate, Datum, EvalError, Expression, Extraction};
use wxport::transform::{TransformChain, TransformError, TransformRegistry};

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sample</title></head>
<body>
  <div class="content">
    <h1>Hello</h1>
    <p class="byline">  by <a href="/authors/ada" data-id="42">Ada</a>  </p>
    <ul class="tags">
      <li> rust </li>
      <li>html</li>
      <li> parsing</li>
    </ul>
  </div>
</body>
</html>"#;

fn run(text: &str) -> Result<Extraction<'static>, EvalError> {
    // Leak the document so results can outlive the helper.
    let doc: &'static HtmlDocument = Box::leak(Box::new(HtmlDocument::parse(ARTICLE)));
    let expr = Expression::parse(text).unwrap();
    evaluate(&expr, doc, &TransformChain::builtin())
}

fn value(text: &str) -> Datum<'static> {
    run(text)
        .unwrap()
        .into_value()
        .unwrap_or_else(|| panic!("{text}: expected a value, got no match"))
}

fn strings<'d>(items: &[&str]) -> Datum<'d> {
    Datum::List(items.iter().map(|s| Datum::from(*s)).collect())
}

#[test]
fn test_plain_selector_text() {
    assert_eq!(value("div.content h1"), Datum::from("Hello"));
}

#[test]
fn test_literal_value() {
    assert_eq!(value("||fixed"), Datum::from("fixed"));
}

#[test]
fn test_no_match_is_not_an_error() {
    assert_eq!(run("table tr td").unwrap(), Extraction::NoMatch);
    assert_eq!(run("table | toUpperCase | unknownThing").unwrap(), Extraction::NoMatch);
}

#[test]
fn test_upper_case_before_and_after_to_array() {
    assert_eq!(value("h1 | toUpperCase"), Datum::from("HELLO"));
    assert_eq!(
        value("ul.tags li | toArray | trim | toUpperCase"),
        strings(&["RUST", "HTML", "PARSING"])
    );
}

#[test]
fn test_string_transform_concatenates_multiple_matches() {
    let doc = HtmlDocument::parse("<h1>a</h1><h1>b</h1>");
    let expr = Expression::parse("h1 | toUpperCase").unwrap();
    let out = evaluate(&expr, &doc, &TransformChain::builtin()).unwrap();
    assert_eq!(out, Extraction::Value(Datum::from("AB")));

    let expr = Expression::parse("h1 | toArray | toUpperCase").unwrap();
    let out = evaluate(&expr, &doc, &TransformChain::builtin()).unwrap();
    assert_eq!(out, Extraction::Value(strings(&["A", "B"])));
}

#[test]
fn test_blank_selector_is_no_match() {
    assert_eq!(run(" | trim").unwrap(), Extraction::NoMatch);
    assert_eq!(run("").unwrap(), Extraction::NoMatch);
    assert_eq!(value("p.byline | find('') | text"), Datum::from(""));
}

#[test]
fn test_attribute_access() {
    assert_eq!(value("p.byline a | attr(href)"), Datum::from("/authors/ada"));
    assert_eq!(value("p.byline a | attr('data-id')"), Datum::from("42"));
    assert_eq!(value("p.byline a | attr(title)"), Datum::Undefined);
}

#[test]
fn test_find_within_nodes() {
    assert_eq!(value("p.byline | find(a) | text"), Datum::from("Ada"));
}

#[test]
fn test_html_of_first_node() {
    assert_eq!(value("p.byline | html | trim"), Datum::from(r#"by <a href="/authors/ada" data-id="42">Ada</a>"#));
}

#[test]
fn test_join_and_slice() {
    assert_eq!(
        value("ul.tags li | toArray | trim | join(', ')"),
        Datum::from("rust, html, parsing")
    );
    assert_eq!(
        value("ul.tags li | slice(1) | text | join('/')"),
        Datum::from("html/ parsing")
    );
    assert_eq!(value("h1 | text | slice(-3)"), Datum::from("llo"));
}

#[test]
fn test_split_and_pad() {
    assert_eq!(
        value("p.byline a | attr(href) | split('/')"),
        strings(&["", "authors", "ada"])
    );
    assert_eq!(
        value("p.byline a | attr(data-id) | padStart(5, 0)"),
        Datum::from("00042")
    );
}

#[test]
fn test_unknown_transform_message() {
    let err = run("h1 | shout").unwrap_err();
    assert_eq!(err.to_string(), "Transform 'shout' is not defined");
}

#[test]
fn test_type_mismatch_message() {
    let err = run("h1 | text | join").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Transform 'join' expected an array but got a string"
    );
}

#[test]
fn test_custom_transform_shadows_builtin() {
    let mut custom = TransformRegistry::new();
    custom.register("trim", |_input, _args| Ok(Datum::from("custom")));
    custom.register("count", |input, _args| match input {
        Datum::List(items) => Ok(Datum::Number(items.len() as f64)),
        other => Err(TransformError::mismatch("array", &other)),
    });

    let doc = HtmlDocument::parse(ARTICLE);
    let chain = TransformChain::with_custom(&custom);

    let expr = Expression::parse("h1 | trim").unwrap();
    assert_eq!(
        evaluate(&expr, &doc, &chain).unwrap(),
        Extraction::Value(Datum::from("custom"))
    );

    let expr = Expression::parse("ul.tags li | toArray | count").unwrap();
    assert_eq!(
        evaluate(&expr, &doc, &chain).unwrap(),
        Extraction::Value(Datum::Number(3.0))
    );
}

#[test]
fn test_invalid_selector() {
    assert!(matches!(run("ul[ | text"), Err(EvalError::Query(_))));
}

#[test]
fn test_values_to_json() {
    assert_eq!(
        value("ul.tags li | toArray | trim").to_json(),
        Some(serde_json::json!(["rust", "html", "parsing"]))
    );
    assert_eq!(value("p.byline a | attr(title)").to_json(), None);
}
