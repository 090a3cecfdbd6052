//! Pass/fail report written to standard output

use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use triton_smoke_shared::Result;

/// Outcome of one check against the server's answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    /// Rendered input tensors, in request order
    pub input: Vec<String>,
    /// Rendered expected value
    pub expected: String,
    /// Rendered observed value; a JSON array when a shape is reported
    pub output: Value,
    pub successful: bool,
}

impl ResultRecord {
    pub fn new(
        input: Vec<String>,
        expected: impl Into<String>,
        output: impl Into<Value>,
        successful: bool,
    ) -> Self {
        Self {
            input,
            expected: expected.into(),
            output: output.into(),
            successful,
        }
    }
}

/// Pretty JSON array with four-space indentation
pub fn render_report(records: &[ResultRecord]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes the rendered report followed by a newline
pub fn write_report<W: Write + ?Sized>(out: &mut W, records: &[ResultRecord]) -> Result<()> {
    let rendered = render_report(records)?;
    writeln!(out, "{}", rendered)?;
    out.flush()?;
    Ok(())
}
