//! Survey table reader with encoding and delimiter auto-detection.
//!
//! Turns a delimited export into [`Row`]s keyed by normalized header name.
//! Mapping rows onto attendees happens in [`crate::models`].

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Delimiters considered by [`detect_delimiter`], in tie-break order
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// One data row, addressable by normalized column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based line number in the source file
    pub line: usize,
    values: HashMap<String, String>,
}

impl Row {
    /// Build a row from `(column, value)` pairs; column names are normalized.
    pub fn from_pairs(line: usize, pairs: &[(&str, &str)]) -> Self {
        let values = pairs
            .iter()
            .map(|(k, v)| (normalize_header(k), v.to_string()))
            .collect();
        Self { line, values }
    }

    /// Value of a column, or `""` if the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn has(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub rows: Vec<Row>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Normalized column headers, in file order
    pub headers: Vec<String>,
}

/// Normalize a header for matching: `"Residential College"` → `"residential_college"`.
pub fn normalize_header(header: &str) -> String {
    let lower = header.trim().trim_start_matches('\u{feff}').to_lowercase();
    NON_ALNUM.replace_all(&lower, "_").trim_matches('_').to_string()
}

/// Detect the encoding of raw bytes using chardet.
///
/// Always returns a label that [`decode_content`] accepts.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other if Encoding::for_label(other.as_bytes()).is_some() => other.to_string(),
        _ => "utf-8".to_string(),
    }
}

/// Decode bytes using the given encoding label.
///
/// Malformed sequences are replaced rather than rejected; a leading BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let codec = Encoding::for_label(encoding.trim().as_bytes())
        .ok_or_else(|| CsvError::Encoding(format!("unsupported encoding '{}'", encoding)))?;

    let (text, _, _) = codec.decode(bytes);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &CANDIDATE_DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded CSV text with an explicit delimiter.
///
/// Headers are trimmed; cell values are kept byte-exact. Rows whose cells
/// are all blank are skipped. Short rows read as empty for the missing
/// columns; extra cells are ignored.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<(Vec<String>, Vec<Row>)> {
    if !delimiter.is_ascii() {
        return Err(CsvError::Parse(format!("delimiter '{}' is not ASCII", delimiter)));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let values = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();

        rows.push(Row { line, values });
    }

    Ok((headers, rows))
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let (headers, rows) = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "id,name\n1,Alice\n2,Bob";
        let (headers, rows) = parse_str(csv, ',').unwrap();

        assert_eq!(headers, vec!["id", "name"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), "Alice");
        assert_eq!(rows[1].get("id"), "2");
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_quoted_delimiter_kept() {
        let csv = "id,difficulty\n1,\"Moderate: a few ups and downs, some rough terrain\"";
        let (_, rows) = parse_str(csv, ',').unwrap();

        assert_eq!(
            rows[0].get("difficulty"),
            "Moderate: a few ups and downs, some rough terrain"
        );
    }

    #[test]
    fn test_headers_normalized() {
        let csv = "ID;Residential College;Preference 1\n7;Davenport;2";
        let (headers, rows) = parse_str(csv, ';').unwrap();

        assert_eq!(headers, vec!["id", "residential_college", "preference_1"]);
        assert_eq!(rows[0].get("residential_college"), "Davenport");
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Preference 1 "), "preference_1");
        assert_eq!(normalize_header("\u{feff}id"), "id");
        assert_eq!(normalize_header("Pronouns (optional)"), "pronouns_optional");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let csv = "a,b\n1,2\n\n,\n3,4\n";
        let (_, rows) = parse_str(csv, ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("a"), "3");
    }

    #[test]
    fn test_cell_padding_preserved() {
        let csv = " ID , Pronouns \n 007 ,he/him \n";
        let (headers, rows) = parse_str(csv, ',').unwrap();

        assert_eq!(headers, vec!["id", "pronouns"]);
        assert_eq!(rows[0].get("id"), " 007 ");
        assert_eq!(rows[0].get("pronouns"), "he/him ");

        let mut attendee = crate::models::Attendee::from_row(&rows[0]).unwrap();
        crate::enrich::assign_pronouns(&mut attendee);
        assert_eq!(attendee.id, " 007 ");
        assert_eq!(attendee.pronouns_code, 3.0);
    }

    #[test]
    fn test_short_and_long_rows() {
        let csv = "a,b,c\n1\n1,2,3,4";
        let (_, rows) = parse_str(csv, ',').unwrap();

        assert_eq!(rows[0].get("a"), "1");
        assert_eq!(rows[0].get("c"), "");
        assert!(!rows[0].has("c"));
        assert_eq!(rows[1].get("c"), "3");
    }

    #[test]
    fn test_empty_csv_error() {
        let result = parse_str("", ',');
        assert!(matches!(result, Err(CsvError::NoHeaders)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_strips_bom() {
        let csv = "\u{feff}id,name\n1,Alice";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.headers, vec!["id", "name"]);
        assert_eq!(result.rows[0].get("id"), "1");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let result = decode_content(b"abc", "not-a-charset");
        assert!(matches!(result, Err(CsvError::Encoding(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = parse_csv_file_auto("/definitely/not/here.csv");
        assert!(matches!(result, Err(CsvError::Io(_))));
    }
}
