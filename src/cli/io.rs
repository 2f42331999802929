//! JSON I/O handling for CLI
//!
//! - Input: one JSON object per line
//! - Output: one JSON object per line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a single JSON request
pub fn read_request(reader: &mut impl BufRead) -> CliResult<Value> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(serde_json::from_str(&line)?)
}

/// Iterate over non-blank request lines.
///
/// Lines are returned raw so a malformed request can be answered without
/// ending the loop.
pub fn read_request_lines(reader: impl BufRead) -> impl Iterator<Item = CliResult<String>> {
    reader
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
}

/// Write a success response
pub fn write_response(writer: &mut impl Write, data: Value) -> CliResult<()> {
    write_line(writer, &json!({ "status": "ok", "data": data }))
}

/// Write an error response
pub fn write_error(writer: &mut impl Write, code: &str, message: &str) -> CliResult<()> {
    write_line(
        writer,
        &json!({ "status": "error", "code": code, "message": message }),
    )
}

fn write_line(writer: &mut impl Write, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_request() {
        let mut input = Cursor::new("{\"op\": \"get_type\"}\n");
        let request = read_request(&mut input).unwrap();
        assert_eq!(request["op"], "get_type");
    }

    #[test]
    fn test_read_request_empty() {
        let mut input = Cursor::new("\n");
        assert!(read_request(&mut input).is_err());
    }

    #[test]
    fn test_request_lines_skip_blanks() {
        let input = Cursor::new("a\n\n  \nb\n");
        let lines: Vec<String> = read_request_lines(input).map(Result::unwrap).collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_responses_are_single_lines() {
        let mut out = Vec::new();
        write_response(&mut out, json!({"count": 2})).unwrap();
        write_error(&mut out, "INVALID_ARGUMENT", "bad").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let ok: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(ok["status"], "ok");
        assert_eq!(ok["data"]["count"], 2);
        let err: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(err["code"], "INVALID_ARGUMENT");
    }
}
