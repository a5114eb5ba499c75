use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An internal invariant was violated.
    ///
    /// These indicate a bug in whatever built the plan or syntax tree, and
    /// should never be reported to a user as a problem with their query.
    Logical,
    /// Input provided by the caller (query text, settings) was invalid.
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical => write!(f, "Logical error"),
            Self::InvalidInput => write!(f, "Invalid input"),
        }
    }
}

#[derive(Debug)]
pub struct DbError {
    inner: Box<DbErrorInner>,
}

#[derive(Debug)]
struct DbErrorInner {
    kind: ErrorKind,
    msg: String,
    /// Extra key/value pairs providing context for the error.
    fields: Vec<(Cow<'static, str>, String)>,
    source: Option<Box<dyn Error + Send + Sync>>,
    backtrace: Backtrace,
}

impl DbError {
    /// Create a new error for invalid user input.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::InvalidInput, msg)
    }

    /// Create a new error indicating an internal invariant was violated.
    pub fn logical(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Logical, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                kind,
                msg: msg.into(),
                fields: Vec::new(),
                source: None,
                backtrace: Backtrace::capture(),
            }),
        }
    }

    pub fn with_source(mut self, source: Box<dyn Error + Send + Sync>) -> Self {
        self.inner.source = Some(source);
        self
    }

    /// Attach a field to the error.
    pub fn with_field(mut self, key: impl Into<Cow<'static, str>>, value: impl fmt::Display) -> Self {
        self.inner.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn is_logical(&self) -> bool {
        self.inner.kind == ErrorKind::Logical
    }

    pub fn message(&self) -> &str {
        &self.inner.msg
    }

    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.inner
            .fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.inner.backtrace
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        for (key, value) in &self.inner.fields {
            write!(f, "\n  {key}: {value}")?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }

        if self.inner.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\nBacktrace: {}", self.inner.backtrace)?;
        }

        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<fmt::Error> for DbError {
    fn from(value: fmt::Error) -> Self {
        DbError::logical("Format error").with_source(Box::new(value))
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        DbError::new("IO error").with_source(Box::new(value))
    }
}

pub trait ResultExt<T, E> {
    /// Wrap an error with additional context.
    fn context(self, msg: &'static str) -> Result<T, DbError>;

    /// Like `context`, but the message is only built on error.
    fn context_fn<F>(self, f: F) -> Result<T, DbError>
    where
        F: Fn() -> String;
}

impl<T, E: Error + Send + Sync + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn context(self, msg: &'static str) -> Result<T, DbError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::new(msg).with_source(Box::new(e))),
        }
    }

    fn context_fn<F>(self, f: F) -> Result<T, DbError>
    where
        F: Fn() -> String,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::new(f()).with_source(Box::new(e))),
        }
    }
}

pub trait OptionExt<T> {
    /// Return a logical error if the option is None.
    fn required(self, msg: &'static str) -> Result<T, DbError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, msg: &'static str) -> Result<T, DbError> {
        match self {
            Some(v) => Ok(v),
            None => Err(DbError::logical(format!("Missing required value: {msg}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_fields() {
        let err = DbError::logical("bad plan")
            .with_field("step", "Filter")
            .with_field("children", 2);

        let s = err.to_string();
        assert!(s.starts_with("bad plan"));
        assert!(s.contains("step: Filter"));
        assert!(s.contains("children: 2"));
        assert_eq!(Some("Filter"), err.get_field("step"));
    }

    #[test]
    fn kinds() {
        assert!(DbError::logical("a").is_logical());
        assert_eq!(ErrorKind::InvalidInput, DbError::new("a").kind());
    }

    #[test]
    fn required_is_logical() {
        let err = None::<u32>.required("explained query").unwrap_err();
        assert!(err.is_logical());
        assert_eq!("Missing required value: explained query", err.message());
    }

    #[test]
    fn context_keeps_source() {
        let res: std::result::Result<u32, _> = "x".parse::<u32>();
        let err = res.context("failed to parse indent").unwrap_err();
        assert_eq!("failed to parse indent", err.message());
        assert!(err.source().is_some());
    }
}
