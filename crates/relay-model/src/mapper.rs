//! The value derivation contract.
//!
//! A mapper derives the value of one element from literal arguments and the
//! values of sibling elements in the same row. Implementations live in
//! `relay-map`; elements only hold a shared reference resolved at fixup.

use std::fmt;
use std::sync::Arc;

use crate::{Element, ElementResult, SchemaError, SenderContext};

/// An element paired with its value in the current row.
#[derive(Debug, Clone)]
pub struct ElementAndValue {
    pub element: Element,
    pub value: String,
}

impl ElementAndValue {
    pub fn new(element: Element, value: impl Into<String>) -> Self {
        Self {
            element,
            value: value.into(),
        }
    }
}

/// Derives an element value from sibling values.
///
/// Mappers must be pure and non-blocking: they are called once per field per
/// row, possibly from several threads at once.
pub trait Mapper: fmt::Debug + Send + Sync {
    /// Name used in schema files, e.g. `concat` in `concat(a, b)`.
    fn name(&self) -> &'static str;

    /// Names of the values this mapper needs, in the order it expects them.
    ///
    /// Entries starting with `$` are special tokens (`$index`, `$currentDate`,
    /// `$mode:X`, `$string:X`) that the caller resolves itself instead of
    /// looking them up as sibling elements.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MapperArguments`] when `args` has the wrong shape.
    fn value_names(&self, element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError>;

    /// Computes the derived value.
    ///
    /// `values` holds every `$` token, possibly with a blank value, and the
    /// siblings that have a non-blank value. A sibling with no value is left
    /// out, so mappers must tolerate missing names.
    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        sender: Option<&SenderContext>,
    ) -> ElementResult;
}

/// Shared handle to a registered mapper.
pub type MapperRef = Arc<dyn Mapper>;

/// Builds the error a mapper returns when it receives the wrong number of arguments.
pub fn argument_error(mapper: &str, message: impl Into<String>) -> SchemaError {
    SchemaError::MapperArguments {
        mapper: mapper.to_string(),
        message: message.into(),
    }
}
