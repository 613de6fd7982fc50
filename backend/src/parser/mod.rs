//! CSV reader for the raw directory export.
//!
//! Produces one [`RawRow`] per record, keyed by header name. No filtering or
//! validation happens here; every decision about a row belongs to the
//! normalizer.

use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::error::{ReaderError, ReaderResult};

/// One CSV record as a header -> cell mapping.
///
/// Every header column is present. Columns the header does not declare read
/// as the empty string, so lookups never fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRow {
    /// 1-based line of the record in the source file.
    #[serde(skip)]
    pub line: u64,
    #[serde(flatten)]
    cells: IndexMap<String, String>,
}

impl RawRow {
    pub fn new(line: u64) -> Self {
        Self {
            line,
            cells: IndexMap::new(),
        }
    }

    /// Builder used by tests and callers that assemble rows by hand.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Raw cell value, `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// Trimmed cell value.
    pub fn trimmed(&self, column: &str) -> &str {
        self.get(column).trim()
    }

    /// Boolean column: true only for a case-insensitive `TRUE`.
    pub fn flag(&self, column: &str) -> bool {
        self.trimmed(column).eq_ignore_ascii_case("TRUE")
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// How to split the input into fields.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Field delimiter (must be ASCII).
    pub delimiter: char,
    /// Ignore `delimiter` and guess from the header line.
    pub detect_delimiter: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            detect_delimiter: false,
        }
    }
}

/// Result of reading with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Records in file order
    pub rows: Vec<RawRow>,
    /// Column headers, trimmed
    pub headers: Vec<String>,
    /// Detected encoding
    pub encoding: String,
    /// Delimiter actually used
    pub delimiter: char,
}

/// Used when detection cannot name a decodable encoding.
const FALLBACK_ENCODING: &str = "windows-1252";

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is always reported as `utf-8`; chardet is only consulted for
/// inputs that are not. Guesses `encoding_rs` cannot decode become
/// `windows-1252`, the usual encoding of spreadsheet exports.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0.to_lowercase();
    match charset.as_str() {
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "ascii" | "utf-8" | "utf8" => FALLBACK_ENCODING.to_string(),
        other if Encoding::for_label(other.as_bytes()).is_some() => charset,
        _ => FALLBACK_ENCODING.to_string(),
    }
}

/// Decode bytes to a string using the given encoding label. Never fails:
/// unknown labels decode as `windows-1252`.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        label => Encoding::for_label(label.as_bytes())
            .unwrap_or(encoding_rs::WINDOWS_1252)
            .decode(bytes)
            .0
            .into_owned(),
    };

    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Guess the delimiter by counting candidates in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read and parse a CSV file.
pub fn read_csv_file<P: AsRef<Path>>(path: P, options: ReadOptions) -> ReaderResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ReaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_csv_bytes(&bytes, options)
}

/// Parse CSV bytes, detecting the encoding.
pub fn read_csv_bytes(bytes: &[u8], options: ReadOptions) -> ReaderResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_csv_str(&content, options, encoding)
}

/// Parse decoded CSV text.
pub fn parse_csv_str(content: &str, options: ReadOptions, encoding: String) -> ReaderResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(ReaderError::Empty);
    }

    let delimiter = if options.detect_delimiter {
        detect_delimiter(content)
    } else {
        options.delimiter
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter))
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ReaderError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let mut row = RawRow::new(line);
        for (i, header) in headers.iter().enumerate() {
            row.insert(header.clone(), record.get(i).unwrap_or(""));
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), columns = headers.len(), %encoding, "parsed CSV");

    Ok(ParseResult {
        rows,
        headers,
        encoding,
        delimiter,
    })
}

fn delimiter_byte(delimiter: char) -> u8 {
    if delimiter.is_ascii() {
        delimiter as u8
    } else {
        b','
    }
}
