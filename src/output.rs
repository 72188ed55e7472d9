//! JSON output utilities for CLI commands
//!
//! `--json` mode emits NDJSON: one `{"event": ...}` object per line, so CI
//! consumers can stream progress without parsing human-oriented text.

use std::io::{self, Write};

/// Write a single NDJSON event (one JSON object per line)
pub fn write_event(out: &mut impl Write, event: &serde_json::Value) -> io::Result<()> {
    let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes a raw JSON value to stdout
pub fn emit(event: serde_json::Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, &event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_event_is_single_line_json() {
        let mut buffer = Vec::new();
        write_event(
            &mut buffer,
            &serde_json::json!({ "event": "start", "command": "scan" }),
        )
        .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.lines().count(), 1);

        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["event"], "start");
        assert_eq!(parsed["command"], "scan");
    }

    #[test]
    fn test_write_event_ndjson_stream() {
        let mut buffer = Vec::new();
        write_event(&mut buffer, &serde_json::json!({ "event": "start" })).unwrap();
        write_event(&mut buffer, &serde_json::json!({ "event": "complete" })).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
        }
    }
}
