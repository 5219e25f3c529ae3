use thiserror::Error;

/// Failure to produce a usable catalog from its source.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The source could not be read (missing file, network failure, ...)
    #[error("catalog source {source_name} is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// The document is not structured data
    #[error("catalog document could not be parsed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document parsed but yielded no usable categories
    #[error("catalog document contains no usable categories")]
    Empty,
}

impl CatalogLoadError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// A category key or service code that does not resolve against the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Invalid category: '{0}'")]
    CategoryNotFound(String),

    #[error("Invalid service '{code}' for category '{category}'")]
    ServiceNotFound { category: String, code: String },
}

impl LookupError {
    /// Name of the request field that failed to resolve
    pub fn field(&self) -> &'static str {
        match self {
            Self::CategoryNotFound(_) => "category_key",
            Self::ServiceNotFound { .. } => "service_code",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_display_names_selection() {
        let err = LookupError::CategoryNotFound("tires".to_string());
        assert_eq!(err.to_string(), "Invalid category: 'tires'");
        assert_eq!(err.field(), "category_key");

        let err = LookupError::ServiceNotFound {
            category: "brakes".to_string(),
            code: "rotors".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid service 'rotors' for category 'brakes'");
        assert_eq!(err.field(), "service_code");
    }

    #[test]
    fn test_unavailable_error_names_source() {
        let err = CatalogLoadError::unavailable("file:catalog.json", "No such file or directory");
        assert!(err.to_string().contains("file:catalog.json"));
        assert!(err.to_string().contains("No such file"));
    }
}
