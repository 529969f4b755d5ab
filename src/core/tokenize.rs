//! Purpose: Split delimited text lines into trimmed fields for sniffing and bulk load.
//! Exports: `Dialect`, `Tokenizer`, `RowReader`, `Row`.
//! Role: Shared line reader for type inference and the load pass; owns no policy.
//! Invariants: Dialect is chosen once from the file suffix; unknown suffixes are rejected.
//! Invariants: Blank lines are skipped and never yield a row.
//! Invariants: Byte offsets reported by `RowReader` are valid `rewind` targets.
use std::io::{self, BufRead, Seek, SeekFrom};
use std::path::Path;

use bstr::ByteSlice;

use crate::core::error::{Error, ErrorKind};

const QUOTE: char = '"';
const ESCAPE: char = '\\';

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dialect {
    Csv,
    Tsv,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Dialect::Csv),
            Some("tsv") => Ok(Dialect::Tsv),
            _ => Err(Error::new(ErrorKind::UnsupportedFormat)
                .with_message("unrecognised file type")
                .with_hint("Use a .csv or .tsv file.")
                .with_path(path)),
        }
    }

    pub fn delimiter(self) -> char {
        match self {
            Dialect::Csv => ',',
            Dialect::Tsv => '\t',
        }
    }

    pub fn tokenizer(self) -> Tokenizer {
        Tokenizer::new(self.delimiter())
    }
}

/// Escaped-list tokenizer: the delimiter splits outside quotes, `"` toggles
/// quoting, and `\` makes the next character literal (`\n` is a newline).
#[derive(Clone, Copy, Debug)]
pub struct Tokenizer {
    delimiter: char,
}

impl Tokenizer {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn split(&self, line: &str) -> Vec<String> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = line.chars();
        while let Some(ch) = chars.next() {
            if ch == ESCAPE {
                match chars.next() {
                    Some('n') => field.push('\n'),
                    Some(next) => field.push(next),
                    None => field.push(ESCAPE),
                }
            } else if ch == QUOTE {
                quoted = !quoted;
            } else if ch == self.delimiter && !quoted {
                fields.push(field.trim().to_string());
                field.clear();
            } else {
                field.push(ch);
            }
        }
        fields.push(field.trim().to_string());
        fields
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    /// 1-based physical line number in the source.
    pub line: u64,
    pub fields: Vec<String>,
}

/// Lazy row sequence over a seekable source. Not restartable by itself; callers
/// rewind to a remembered offset.
pub struct RowReader<R> {
    inner: R,
    tokenizer: Tokenizer,
    offset: u64,
    line: u64,
    buf: Vec<u8>,
}

impl<R: BufRead + Seek> RowReader<R> {
    pub fn new(inner: R, tokenizer: Tokenizer) -> Self {
        Self {
            inner,
            tokenizer,
            offset: 0,
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Byte offset of the next unread line.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of physical lines consumed so far.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Seek back to `offset`, which must come from `offset()`; `line` is the
    /// count of lines before that point.
    pub fn rewind(&mut self, offset: u64, line: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.offset = offset;
        self.line = line;
        Ok(())
    }

    /// Read the next physical line, blank or not.
    pub fn next_line(&mut self) -> io::Result<Option<Row>> {
        self.buf.clear();
        let read = self.inner.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.offset += read as u64;
        self.line += 1;
        let bytes = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
        let text = bytes.to_str_lossy();
        Ok(Some(Row {
            line: self.line,
            fields: self.tokenizer.split(&text),
        }))
    }

    /// Read the next non-blank line.
    pub fn next_row(&mut self) -> io::Result<Option<Row>> {
        while let Some(row) = self.next_line()? {
            if !is_blank(&row.fields) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}

fn is_blank(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0].is_empty()
}
