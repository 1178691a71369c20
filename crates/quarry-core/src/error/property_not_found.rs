use super::Error;

/// Error when a dotted path does not resolve against an entity schema.
///
/// Raised during compilation when a path segment matches neither a property
/// nor a relationship alias. Surfaced to the caller as a client error and
/// never retried.
#[derive(Debug)]
pub(super) struct PropertyNotFoundError {
    entity: Box<str>,
    path: Box<str>,
}

impl std::error::Error for PropertyNotFoundError {}

impl core::fmt::Display for PropertyNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "property not found: `{}` does not resolve on entity `{}`",
            self.path, self.entity
        )
    }
}

impl Error {
    /// Creates a property-not-found error for the given entity and path.
    pub fn property_not_found(entity: impl Into<String>, path: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::PropertyNotFound(PropertyNotFoundError {
            entity: entity.into().into(),
            path: path.into().into(),
        }))
    }

    /// Returns `true` if this error is a property-not-found error.
    pub fn is_property_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::PropertyNotFound(_))
    }
}
