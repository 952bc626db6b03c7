//! HTML documents backed by the `scraper` crate.

use std::fmt;
use std::rc::Rc;

use scraper::{ElementRef, Html, Selector};

use super::{DocumentError, NodeRef, NodeSet, QueryableDocument};

/// A parsed HTML document.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses a full HTML document. Parsing is lenient and never fails.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

}

impl fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlDocument").finish_non_exhaustive()
    }
}

impl QueryableDocument for HtmlDocument {
    fn query<'d>(&'d self, selector: &str) -> Result<NodeRef<'d>, DocumentError> {
        let nodes = match compile(selector)? {
            Some(compiled) => self.html.select(&compiled).collect(),
            None => Vec::new(),
        };
        Ok(Rc::new(Elements { nodes }))
    }
}

/// Compiles `selector`. A blank selector matches nothing and yields `None`.
fn compile(selector: &str) -> Result<Option<Selector>, DocumentError> {
    if selector.trim().is_empty() {
        return Ok(None);
    }
    Selector::parse(selector)
        .map(Some)
        .map_err(|e| DocumentError::InvalidSelector {
            selector: selector.to_string(),
            message: e.to_string(),
        })
}

/// Elements matched by a selector.
#[derive(Clone)]
pub struct Elements<'d> {
    nodes: Vec<ElementRef<'d>>,
}

impl fmt::Debug for Elements<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.nodes.iter().map(|n| n.value().name()).collect();
        f.debug_struct("Elements").field("nodes", &names).finish()
    }
}

impl<'d> NodeSet<'d> for Elements<'d> {
    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn text(&self) -> String {
        self.nodes.iter().flat_map(|node| node.text()).collect()
    }

    fn html(&self) -> Option<String> {
        self.nodes.first().map(|node| node.inner_html())
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.nodes
            .first()
            .and_then(|node| node.value().attr(name))
            .map(str::to_string)
    }

    fn split(&self) -> Vec<NodeRef<'d>> {
        self.nodes
            .iter()
            .map(|node| Rc::new(Elements { nodes: vec![*node] }) as NodeRef<'d>)
            .collect()
    }

    fn query(&self, selector: &str) -> Result<NodeRef<'d>, DocumentError> {
        let Some(compiled) = compile(selector)? else {
            return Ok(Rc::new(Elements { nodes: Vec::new() }));
        };
        let nodes = self
            .nodes
            .iter()
            .flat_map(|node| node.select(&compiled))
            .collect();
        Ok(Rc::new(Elements { nodes }))
    }
}
