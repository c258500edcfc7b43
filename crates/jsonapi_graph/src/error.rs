use jsonapi_reflect::AccessError;
use thiserror::Error;

/// An error that occurred while serializing a document.
///
/// No partial document is produced: the first failure aborts the traversal.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// A [`Resource`](jsonapi_reflect::Resource) accessor failed.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// The document could not be rendered as JSON.
    #[error("failed to render the document: {0}")]
    Json(#[from] serde_json::Error),
}
