use super::Error;

/// Error when a filter value cannot be coerced to a column's declared type.
///
/// The message names the offending value and the target type so the caller
/// can correct the request.
#[derive(Debug)]
pub(super) struct TypeConversionError {
    value: Box<str>,
    to_type: Box<str>,
}

impl std::error::Error for TypeConversionError {}

impl core::fmt::Display for TypeConversionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "type conversion failed: cannot convert `{}` to {}",
            self.value, self.to_type
        )
    }
}

impl Error {
    /// Creates a type conversion error naming the value and target type.
    pub fn type_conversion(value: impl core::fmt::Display, to_type: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::TypeConversion(TypeConversionError {
            value: value.to_string().into(),
            to_type: to_type.into().into(),
        }))
    }

    /// Returns `true` if this error is a type conversion error.
    pub fn is_type_conversion(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::TypeConversion(_))
    }
}
