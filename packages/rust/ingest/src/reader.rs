//! CSV file → ordered rows keyed by the header line.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use kbagent_shared::{KbAgentError, Result, Row};
use tracing::{debug, instrument};

/// Read every data row of the CSV file at `path`, in file order.
///
/// Fails with [`KbAgentError::NotFound`] if the file does not exist and with
/// [`KbAgentError::Encoding`] if it is not valid UTF-8.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_csv(path: &Path) -> Result<Vec<Row>> {
    if !path.exists() {
        return Err(KbAgentError::not_found(path.display().to_string()));
    }

    let file = File::open(path).map_err(|e| KbAgentError::io(path, e))?;
    let rows = read_rows(file, &path.display().to_string())?;

    debug!(rows = rows.len(), "csv read");
    Ok(rows)
}

/// Parse CSV content from any reader. `source_name` is used in error messages.
///
/// Parsing is lenient about column counts: a short row yields only the keys it
/// has values for, a long row is cut to the header's width.
pub fn read_rows<R: Read>(input: R, source_name: &str) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(source_name, e))?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(source_name, e))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn csv_error(source_name: &str, err: csv::Error) -> KbAgentError {
    match err.kind() {
        csv::ErrorKind::Utf8 { .. } => KbAgentError::encoding(source_name, err.to_string()),
        _ => KbAgentError::parse(format!("{source_name}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn rows(content: &str) -> Vec<Row> {
        read_rows(content.as_bytes(), "inline.csv").expect("parse csv")
    }

    #[test]
    fn rows_follow_header_order() {
        let parsed = rows("name,age,city\nAlice,30,Paris\nBob,41,Oslo\n");
        assert_eq!(parsed.len(), 2);

        let keys: Vec<&str> = parsed[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "age", "city"]);
        assert_eq!(parsed[1]["name"], "Bob");
        assert_eq!(parsed[1]["city"], "Oslo");
    }

    #[test]
    fn header_only_file_has_no_rows() {
        assert!(rows("name,age\n").is_empty());
        assert!(rows("").is_empty());
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let parsed = rows("name,notes\n\"Smith, J\",\"likes \"\"tea\"\"\"\n");
        assert_eq!(parsed[0]["name"], "Smith, J");
        assert_eq!(parsed[0]["notes"], "likes \"tea\"");
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let parsed = rows("a,b,c\n1,2\n1,2,3,4\n");
        assert_eq!(parsed[0].len(), 2);
        assert!(!parsed[0].contains_key("c"));
        assert_eq!(parsed[1].len(), 3);
        assert_eq!(parsed[1]["c"], "3");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = read_rows(&b"name\n\xff\xfe\n"[..], "bad.csv").unwrap_err();
        assert_eq!(err.kind(), "encoding");
        assert!(err.to_string().contains("bad.csv"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "product,price\nlamp,12\nchair,40\ndesk,90\n").unwrap();

        let parsed = read_csv(file.path()).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2]["product"], "desk");
    }
}
