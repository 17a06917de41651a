//! Capture file format and hex helpers.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// One captured interrupt IN report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReport {
    pub timestamp_us: u64,
    pub report_id: u8,
    /// Space-separated `0xNN` bytes.
    pub data: String,
}

/// A capture session of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFile {
    pub vendor_id: String,
    pub product_id: String,
    pub captures: Vec<CaptureReport>,
}

impl CaptureFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read capture file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse capture file '{}'", path.display()))
    }

    pub fn vendor_id(&self) -> Result<u16> {
        parse_hex_u16(&self.vendor_id).map_err(anyhow::Error::msg)
    }

    pub fn product_id(&self) -> Result<u16> {
        parse_hex_u16(&self.product_id).map_err(anyhow::Error::msg)
    }
}

pub fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

/// Parse bytes written as `0x01 0x02`, `01 02`, `01,02` or `0102`.
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token.trim_start_matches("0x").trim_start_matches("0X");
        if token.is_empty() {
            continue;
        }
        if token.len() % 2 != 0 {
            bail!("odd number of hex digits in '{token}'");
        }
        for pair in token.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).context("non-ASCII hex digit")?;
            let byte = u8::from_str_radix(pair, 16)
                .with_context(|| format!("invalid hex byte '{pair}'"))?;
            out.push(byte);
        }
    }
    Ok(out)
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ── BDD-style scenario tests ────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    /// GIVEN bytes in every supported spelling
    /// WHEN parse_hex_bytes is called
    /// THEN they all decode to the same bytes
    #[test]
    fn given_hex_spellings_when_parsed_then_same_bytes() -> TestResult {
        let expected = vec![0x00, 0x14, 0xAB];
        assert_eq!(parse_hex_bytes("0x00 0x14 0xAB")?, expected);
        assert_eq!(parse_hex_bytes("00 14 ab")?, expected);
        assert_eq!(parse_hex_bytes("00,14,AB")?, expected);
        assert_eq!(parse_hex_bytes("0014AB")?, expected);
        Ok(())
    }

    /// GIVEN malformed hex
    /// WHEN parse_hex_bytes is called
    /// THEN an error is returned
    #[test]
    fn given_malformed_hex_when_parsed_then_error() {
        assert!(parse_hex_bytes("0x1").is_err());
        assert!(parse_hex_bytes("zz").is_err());
    }

    /// GIVEN vendor and product IDs with and without prefix
    /// WHEN parsed
    /// THEN the numeric IDs are returned
    #[test]
    fn given_capture_ids_when_parsed_then_numeric() -> TestResult {
        let file = CaptureFile {
            vendor_id: "0x045E".to_string(),
            product_id: "028E".to_string(),
            captures: Vec::new(),
        };
        assert_eq!(file.vendor_id()?, 0x045E);
        assert_eq!(file.product_id()?, 0x028E);
        Ok(())
    }

    /// GIVEN a capture file on disk
    /// WHEN loaded
    /// THEN every report is preserved
    #[test]
    fn given_capture_file_when_loaded_then_reports_preserved() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("capture.json");
        let file = CaptureFile {
            vendor_id: "0x045E".to_string(),
            product_id: "0x028E".to_string(),
            captures: vec![CaptureReport {
                timestamp_us: 100,
                report_id: 0,
                data: "0x00 0x14".to_string(),
            }],
        };
        std::fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        assert_eq!(CaptureFile::load(&path)?, file);
        Ok(())
    }

    /// GIVEN a missing file
    /// WHEN loaded
    /// THEN the error names the path
    #[test]
    fn given_missing_file_when_loaded_then_error_names_path() {
        let err = CaptureFile::load(Path::new("/nonexistent/capture.json"));
        let message = err.map(|_| String::new()).unwrap_or_else(|e| format!("{e:#}"));
        assert!(message.contains("/nonexistent/capture.json"));
    }

    #[test]
    fn hex_output_is_uppercase_and_spaced() {
        assert_eq!(to_hex(&[0x0A, 0xFF]), "0A FF");
        assert_eq!(to_hex(&[]), "");
    }
}
