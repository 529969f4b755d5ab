// Error kinds and context-carrying errors shared by the store, loader, cache and CLI.
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NotFound,
    NameConflict,
    UnsupportedFormat,
    MalformedRow,
    Corrupt,
    Io,
    BackingStore,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    path: Option<PathBuf>,
    table: Option<String>,
    line: Option<u64>,
    counts: Option<(usize, usize)>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            path: None,
            table: None,
            line: None,
            counts: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// 1-based line of the input file that caused a `MalformedRow`.
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    pub fn expected(&self) -> Option<usize> {
        self.counts.map(|(expected, _)| expected)
    }

    pub fn actual(&self) -> Option<usize> {
        self.counts.map(|(_, actual)| actual)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_counts(mut self, expected: usize, actual: usize) -> Self {
        self.counts = Some((expected, actual));
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {table})")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(line) = self.line {
            write!(f, " (line: {line})")?;
        }
        if let Some((expected, actual)) = self.counts {
            write!(f, " (expected: {expected}, actual: {actual})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::new(ErrorKind::BackingStore)
            .with_message(err.to_string())
            .with_source(err)
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::NameConflict => 4,
        ErrorKind::UnsupportedFormat => 5,
        ErrorKind::MalformedRow => 6,
        ErrorKind::Corrupt => 7,
        ErrorKind::Io => 8,
        ErrorKind::BackingStore => 9,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::NotFound, 3),
            (ErrorKind::NameConflict, 4),
            (ErrorKind::UnsupportedFormat, 5),
            (ErrorKind::MalformedRow, 6),
            (ErrorKind::Corrupt, 7),
            (ErrorKind::Io, 8),
            (ErrorKind::BackingStore, 9),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_row_context() {
        let err = Error::new(ErrorKind::MalformedRow)
            .with_message("row has the wrong number of fields")
            .with_path("data.csv")
            .with_line(5)
            .with_counts(2, 3);
        let text = err.to_string();
        assert!(text.starts_with("MalformedRow: row has the wrong number of fields"));
        assert!(text.contains("(path: data.csv)"));
        assert!(text.contains("(line: 5)"));
        assert!(text.contains("(expected: 2, actual: 3)"));
        assert_eq!(err.expected(), Some(2));
        assert_eq!(err.actual(), Some(3));
    }

    #[test]
    fn sqlite_errors_map_to_backing_store() {
        let conn = rusqlite::Connection::open_in_memory().expect("open");
        let err: Error = conn.execute("NOT SQL", []).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::BackingStore);
        assert!(std::error::Error::source(&err).is_some());
    }
}
