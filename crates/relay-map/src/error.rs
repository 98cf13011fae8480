use relay_model::SchemaError;
use thiserror::Error;

/// Fatal errors from [`process_value`](crate::process_value).
///
/// Data problems never show up here; they are diagnostics on the returned
/// [`ElementResult`](relay_model::ElementResult).
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("item index was {0}, but must be larger than 0")]
    InvalidItemIndex(usize),
    #[error("mapper for element {element}: {source}")]
    Mapper {
        element: String,
        #[source]
        source: SchemaError,
    },
}
