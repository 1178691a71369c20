use super::Error;

/// Error when a filter request is structurally invalid.
///
/// This occurs when:
/// - An operator string is not in the supported set
/// - A path traverses through a property that is neither a collection nor a
///   reference relationship
/// - `between` is supplied with other than exactly two values
/// - An operator is not supported by the target flavor's capability
#[derive(Debug)]
pub(super) struct InvalidFilterCriteriaError {
    message: Box<str>,
}

impl std::error::Error for InvalidFilterCriteriaError {}

impl core::fmt::Display for InvalidFilterCriteriaError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid filter criteria: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid-filter-criteria error.
    pub fn invalid_filter_criteria(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidFilterCriteria(
            InvalidFilterCriteriaError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an invalid-filter-criteria error.
    pub fn is_invalid_filter_criteria(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidFilterCriteria(_))
    }
}
