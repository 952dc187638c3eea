use std::error::Error;
use std::fmt::{Debug, Display, Error as FmtError, Formatter};

pub struct AppErr(String, Option<Box<dyn Error>>);

impl AppErr {
    fn from_err<E>(kind: &str, error: E) -> AppErr
    where
        E: Error + 'static,
    {
        AppErr(format!("[{}] {}", kind, error), Some(Box::new(error)))
    }

    pub fn new(kind: &str, message: &str) -> AppErr {
        AppErr(format!("[{}] {}", kind, message), None)
    }

    /// The message of the underlying error without the `[kind]` prefix, or
    /// the plain message for errors raised with `AppErr::new`.
    pub fn cause_message(&self) -> String {
        match self.1 {
            Some(ref err) => err.to_string(),
            None => match self.0.find("] ") {
                Some(idx) => self.0[idx + 2..].to_string(),
                None => self.0.clone(),
            },
        }
    }
}

impl Display for AppErr {
    fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
        write!(f, "{}", self.0)
    }
}

impl Debug for AppErr {
    fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
        Display::fmt(self, f)
    }
}

impl Error for AppErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.1 {
            Some(ref err) => Some(err.as_ref()),
            None => None,
        }
    }
}

macro_rules! impl_from_error {
    ($type:ty) => {
        impl From<$type> for AppErr {
            fn from(err: $type) -> Self {
                AppErr::from_err(stringify!($type), err)
            }
        }
    };
}

// Error conversions
impl_from_error!(std::io::Error);
impl_from_error!(std::num::ParseIntError);
impl_from_error!(std::time::SystemTimeError);
impl_from_error!(serde_json::Error);
impl_from_error!(image::ImageError);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_display_includes_kind() {
        let err = AppErr::new("store", "no data directory");
        assert_eq!(err.to_string(), "[store] no data directory");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_from_io_error_keeps_source() {
        let err: AppErr = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.to_string(), "[std::io::Error] denied");
        assert_eq!(err.cause_message(), "denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_cause_message_strips_kind() {
        let err = AppErr::new("gsettings", "exited with status 1");
        assert_eq!(err.cause_message(), "exited with status 1");
    }
}
