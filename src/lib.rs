//! wxport extracts structured records from HTML pages.
//!
//! Each output field is described by a short expression: a CSS selector
//! followed by an optional chain of transforms, such as
//! `ul.tags li | toArray | trim | join(", ")`. Schemas group such expressions
//! with rules deciding which pages they apply to.

pub mod config;
pub mod document;
pub mod expression;
pub mod file;
pub mod logging;
pub mod schema;
pub mod transform;
