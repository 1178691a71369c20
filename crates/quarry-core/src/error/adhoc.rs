use super::Error;

/// An ad-hoc error carrying only a message.
#[derive(Debug)]
pub(super) struct AdhocError {
    message: Box<str>,
}

impl std::error::Error for AdhocError {}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    /// Creates an error from format arguments.
    ///
    /// Prefer the structured constructors; this exists for one-off failures
    /// that do not warrant their own kind.
    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        Error::from(super::ErrorKind::Adhoc(AdhocError {
            message: std::fmt::format(args).into(),
        }))
    }
}

impl super::IntoError for core::fmt::Arguments<'_> {
    fn into_error(self) -> Error {
        Error::from_args(self)
    }
}
