//! Error types for interface propagation.

/// Errors surfaced by the generation pipeline.
///
/// None of these are retried: generation is a deterministic function of its
/// inputs, so the same inputs always fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// A struct selector or capability reference does not match its grammar.
    #[error("malformed selector: {0}")]
    MalformedSelector(String),

    /// A struct, member, package or interface could not be found, or a
    /// member/reference does not denote an interface type.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// The assembled declarations do not form valid Go source, or the
    /// dispatch table would need more cases than it can enumerate.
    #[error("emission error: {0}")]
    Emission(String),
}

impl GenerateError {
    pub(crate) fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSelector(message.into())
    }

    pub(crate) fn emission(message: impl Into<String>) -> Self {
        Self::Emission(message.into())
    }
}

/// Failure reported by a [`PackageLoader`](crate::loader::PackageLoader).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("package {0:?} not found")]
    NotFound(String),
}

impl From<LoadError> for GenerateError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(path) => {
                GenerateError::Resolution(format!("error loading package {path:?}: not found"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failures_become_resolution_errors() {
        let err = GenerateError::from(LoadError::NotFound("net".to_string()));
        assert_eq!(
            err,
            GenerateError::Resolution("error loading package \"net\": not found".to_string())
        );
    }
}
