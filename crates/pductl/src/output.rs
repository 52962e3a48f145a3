//! Output formatting: INI or JSON.
//!
//! INI output omits the generated header; it is the document as the
//! device would read it. JSON renders sections as objects, in file order.

use std::io::{self, Write};

use pductl_core::ConfigDocument;

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a whole document in the chosen format.
pub fn render_document(format: OutputFormat, doc: &ConfigDocument) -> Result<String, CliError> {
    match format {
        OutputFormat::Ini => Ok(render_ini(doc)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(doc)?),
    }
}

/// Render a single setting value.
pub fn render_value(format: OutputFormat, value: &str) -> Result<String, CliError> {
    match format {
        OutputFormat::Ini => Ok(value.to_owned()),
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
    }
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_ini(doc: &ConfigDocument) -> String {
    let mut lines = Vec::new();
    for (name, section) in doc.sections() {
        lines.push(format!("[{name}]"));
        lines.extend(section.iter().map(|(key, value)| format!("{key}={value}")));
    }
    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        doc.set("SystemID", "Name", "unit1");
        doc.set("SystemID", "Contact", "Alice");
        doc.set("NetworkTCP/IP", "IPAddress", "192.168.1.1");
        doc
    }

    #[test]
    fn ini_keeps_document_order() {
        let out = render_document(OutputFormat::Ini, &sample()).unwrap();
        assert_eq!(
            out,
            "[SystemID]\nName=unit1\nContact=Alice\n[NetworkTCP/IP]\nIPAddress=192.168.1.1"
        );
    }

    #[test]
    fn json_nests_sections() {
        let out = render_document(OutputFormat::Json, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["SystemID"]["Contact"], "Alice");
        assert!(out.find("SystemID").unwrap() < out.find("NetworkTCP/IP").unwrap());
    }

    #[test]
    fn json_value_is_quoted() {
        assert_eq!(render_value(OutputFormat::Json, "a\"b").unwrap(), r#""a\"b""#);
        assert_eq!(render_value(OutputFormat::Ini, "a\"b").unwrap(), "a\"b");
    }
}
