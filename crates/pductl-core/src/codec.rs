// ── Configuration file codec ──
//
// The device file is an INI dialect:
//
//   ; comment
//   [SectionName]
//   key=value
//
// Lines are trimmed before classification. Assignments split on the first
// `=` only, so values may themselves contain `=`. The encoder prepends a
// comment header that the decoder skips like any other comment, ends every
// line with CRLF, and refuses entries the decoder could not read back.

use chrono::{DateTime, FixedOffset, Local};
use thiserror::Error;

use crate::document::ConfigDocument;

/// Why a configuration text could not be decoded. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Configuration text is empty")]
    EmptyInput,

    #[error("Line {line}: section header {text:?} has no closing ']'")]
    MalformedSection { line: usize, text: String },

    #[error("Line {line}: expected key=value, found {text:?}")]
    MalformedAssignment { line: usize, text: String },

    #[error("Line {line}: assignment {text:?} appears before any [section]")]
    AssignmentOutsideSection { line: usize, text: String },

    #[error("Configuration is not valid UTF-8 (first bad byte at offset {offset})")]
    InvalidUtf8 { offset: usize },

    #[error("{}", unrepresentable_message(section, key.as_deref(), reason))]
    Unrepresentable {
        section: String,
        key: Option<String>,
        reason: &'static str,
    },
}

fn unrepresentable_message(section: &str, key: Option<&str>, reason: &str) -> String {
    match key {
        Some(key) => format!("Setting {section:?}.{key:?} cannot be written: {reason}"),
        None => format!("Section {section:?} cannot be written: {reason}"),
    }
}

/// Informational header written above every encoded file.
///
/// Never parsed back; it only tells a human reading the device's
/// `config.ini` who wrote it and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderConfig {
    pub writer_version: String,
    pub provenance: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            writer_version: env!("CARGO_PKG_VERSION").to_owned(),
            provenance: vec!["Generated by pductl".to_owned()],
        }
    }
}

// ── Decoding ────────────────────────────────────────────────────────

/// Parse configuration text into a [`ConfigDocument`].
pub fn decode(text: &str) -> Result<ConfigDocument, FormatError> {
    if text.trim().is_empty() {
        return Err(FormatError::EmptyInput);
    }

    let mut doc = ConfigDocument::new();
    let mut current: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let line_no = idx + 1;

        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let (name, _) =
                header
                    .split_once(']')
                    .ok_or_else(|| FormatError::MalformedSection {
                        line: line_no,
                        text: line.to_owned(),
                    })?;
            doc.insert_section(name);
            current = Some(name.to_owned());
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(FormatError::MalformedAssignment {
                line: line_no,
                text: line.to_owned(),
            });
        };
        let Some(section) = current.as_deref() else {
            return Err(FormatError::AssignmentOutsideSection {
                line: line_no,
                text: line.to_owned(),
            });
        };
        doc.set(section, key, value);
    }

    Ok(doc)
}

/// Decode raw bytes as downloaded from (or cached for) a device.
pub fn decode_bytes(bytes: &[u8]) -> Result<ConfigDocument, FormatError> {
    let text = std::str::from_utf8(bytes).map_err(|e| FormatError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;
    decode(text)
}

// ── Validation ──────────────────────────────────────────────────────

fn has_line_break(text: &str) -> bool {
    text.contains(['\r', '\n'])
}

/// Check that `name` survives an encode/decode round trip as a section name.
pub fn check_section(name: &str) -> Result<(), FormatError> {
    let reason = if has_line_break(name) {
        Some("contains a line break")
    } else if name.contains(']') {
        Some("contains ']'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(FormatError::Unrepresentable {
            section: name.to_owned(),
            key: None,
            reason,
        }),
        None => Ok(()),
    }
}

/// Check that `key=value` inside `[section]` survives an encode/decode
/// round trip unchanged.
pub fn check_setting(section: &str, key: &str, value: &str) -> Result<(), FormatError> {
    check_section(section)?;

    let reason = if has_line_break(key) || has_line_break(value) {
        Some("contains a line break")
    } else if key.contains('=') {
        Some("key contains '='")
    } else if key.starts_with([';', '[']) {
        Some("key starts with ';' or '['")
    } else if key.starts_with(char::is_whitespace) {
        Some("key starts with whitespace")
    } else if value.ends_with(char::is_whitespace) {
        Some("value ends with whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(FormatError::Unrepresentable {
            section: section.to_owned(),
            key: Some(key.to_owned()),
            reason,
        }),
        None => Ok(()),
    }
}

// ── Encoding ────────────────────────────────────────────────────────

/// Serialize a document, stamping the header with the current local time.
pub fn encode(doc: &ConfigDocument, header: &HeaderConfig) -> Result<String, FormatError> {
    encode_at(doc, header, Local::now().fixed_offset())
}

/// Serialize a document with an explicit header timestamp.
///
/// Every line ends with CRLF. Entries that [`check_setting`] rejects make
/// the whole encode fail with [`FormatError::Unrepresentable`]; nothing is
/// dropped or rewritten.
pub fn encode_at(
    doc: &ConfigDocument,
    header: &HeaderConfig,
    written_at: DateTime<FixedOffset>,
) -> Result<String, FormatError> {
    let mut out = String::new();

    out.push_str(&format!(
        "; Config written at {}\r\n",
        written_at.format("%Y-%m-%d %H:%M:%S %:z")
    ));
    out.push_str(&format!(
        "; PDU writer version {}\r\n",
        header.writer_version.replace(['\r', '\n'], " ")
    ));
    for line in &header.provenance {
        out.push_str(&format!("; {}\r\n", line.replace(['\r', '\n'], " ")));
    }

    for (name, section) in doc.sections() {
        check_section(name)?;
        out.push_str(&format!("[{name}]\r\n"));
        for (key, value) in section {
            check_setting(name, key, value)?;
            out.push_str(&format!("{key}={value}\r\n"));
        }
    }

    Ok(out)
}
