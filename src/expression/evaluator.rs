use tracing::trace;

use super::ast::{Expression, SelectorExpression};
use super::error::EvalError;
use super::value::Datum;
use crate::document::QueryableDocument;
use crate::transform::TransformLookup;

/// Successful outcome of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<'d> {
    Value(Datum<'d>),
    /// The selector matched nothing. Callers omit the field.
    NoMatch,
}

impl<'d> Extraction<'d> {
    pub fn into_value(self) -> Option<Datum<'d>> {
        match self {
            Extraction::Value(value) => Some(value),
            Extraction::NoMatch => None,
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Extraction::NoMatch)
    }
}

/// Evaluates parsed expressions against one document.
pub struct Evaluator<'d, 't, D: ?Sized, T: ?Sized> {
    document: &'d D,
    transforms: &'t T,
}

impl<'d, 't, D, T> Evaluator<'d, 't, D, T>
where
    D: QueryableDocument + ?Sized,
    T: TransformLookup + ?Sized,
{
    pub fn new(document: &'d D, transforms: &'t T) -> Self {
        Evaluator {
            document,
            transforms,
        }
    }

    /// Evaluates `expr`.
    ///
    /// Literals come back unchanged. A selector with no match yields
    /// [`Extraction::NoMatch`] without running any transform. With no
    /// transforms the result is the matched text; otherwise each transform is
    /// applied in order to the previous stage's output, starting from the raw
    /// node set.
    pub fn evaluate(&self, expr: &Expression) -> Result<Extraction<'d>, EvalError> {
        match expr {
            Expression::Literal(value) => Ok(Extraction::Value(Datum::String(value.clone()))),
            Expression::Selector(selector_expr) => self.evaluate_selector(selector_expr),
        }
    }

    fn evaluate_selector(&self, expr: &SelectorExpression) -> Result<Extraction<'d>, EvalError> {
        let nodes = self.document.query(&expr.selector)?;
        if nodes.is_empty() {
            return Ok(Extraction::NoMatch);
        }

        if expr.transforms.is_empty() {
            return Ok(Extraction::Value(Datum::String(nodes.text())));
        }

        let mut current = Datum::Nodes(nodes);
        for call in &expr.transforms {
            let transform = self
                .transforms
                .lookup(&call.name)
                .ok_or_else(|| EvalError::UnknownTransform(call.name.clone()))?;

            trace!(transform = %call.name, input = current.kind(), "applying transform");
            current = transform
                .apply(current, &call.args)
                .map_err(|source| EvalError::Transform {
                    name: call.name.clone(),
                    source,
                })?;
        }

        Ok(Extraction::Value(current))
    }
}

/// Evaluates `expr` against `document`, resolving transforms through `transforms`.
pub fn evaluate<'d, D, T>(
    expr: &Expression,
    document: &'d D,
    transforms: &T,
) -> Result<Extraction<'d>, EvalError>
where
    D: QueryableDocument + ?Sized,
    T: TransformLookup + ?Sized,
{
    Evaluator::new(document, transforms).evaluate(expr)
}
