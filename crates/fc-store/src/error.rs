//! Error types for the normalized store
//!
//! Only writes can fail. Reads report absence through `Option`.

/// Errors while normalizing a response into the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Response data is not a JSON object
    #[error("result for '{document}' is not a JSON object")]
    NotAnObject { document: String },

    /// Response data lacks a field the document selects
    #[error("result for '{document}' is missing root field '{field}'")]
    MissingRootField { document: String, field: String },

    /// Object without `__typename` cannot be normalized
    #[error("object at {path} has no __typename")]
    MissingTypename { path: String },

    /// List holding both objects and scalars
    #[error("list at {path} mixes objects and scalars")]
    MixedList { path: String },
}

impl StoreError {
    /// Create missing root field error
    pub fn missing_root_field(document: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRootField {
            document: document.into(),
            field: field.into(),
        }
    }
}

/// Result type alias for store writes
pub type StoreResult<T> = Result<T, StoreError>;
