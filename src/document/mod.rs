//! The document capability consumed by the evaluator.
//!
//! The evaluator never parses markup itself. It asks a [`QueryableDocument`]
//! for the nodes matching a selector and works with the returned [`NodeSet`].
//! [`html::HtmlDocument`] is the implementation backed by `scraper`.

pub mod html;

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

pub use html::HtmlDocument;

/// Shared handle to a node set borrowed from a document.
pub type NodeRef<'d> = Rc<dyn NodeSet<'d> + 'd>;

/// Errors raised by a document implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// A document that can be queried with CSS selectors.
pub trait QueryableDocument {
    /// Returns every node matching `selector`, in document order.
    fn query<'d>(&'d self, selector: &str) -> Result<NodeRef<'d>, DocumentError>;
}

/// An ordered set of nodes matched in a document.
pub trait NodeSet<'d>: fmt::Debug {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text content of every node, concatenated in document order.
    fn text(&self) -> String;

    /// Inner markup of the first node, `None` when the set is empty.
    fn html(&self) -> Option<String>;

    /// Attribute value of the first node.
    fn attr(&self, name: &str) -> Option<String>;

    /// One single-node set per member, in order.
    fn split(&self) -> Vec<NodeRef<'d>>;

    /// Descendants of every member that match `selector`.
    fn query(&self, selector: &str) -> Result<NodeRef<'d>, DocumentError>;
}
