use crate::extract::ExceptionRecord;
use crate::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{self, Write};

/// The json document describing all exceptions found in a single log file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashReport<'a> {
    #[serde(borrow)]
    pub filename: Cow<'a, str>,
    #[serde(borrow)]
    pub exceptions: Vec<ExceptionRecord<'a>>,
}

impl<'a> CrashReport<'a> {
    pub fn new(filename: impl Into<Cow<'a, str>>, exceptions: Vec<ExceptionRecord<'a>>) -> Self {
        CrashReport {
            filename: filename.into(),
            exceptions,
        }
    }
}

/// Serialize `report` as json into `out`.
///
/// The only possible failure is `out` refusing the write.
pub fn write_json<W: Write>(mut out: W, report: &CrashReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report).map_err(io::Error::from)?;
    debug!(
        "serialized {} exceptions for {}",
        report.exceptions.len(),
        report.filename
    );
    Ok(())
}

#[cfg(test)]
fn to_value(report: &CrashReport) -> serde_json::Value {
    let mut buff = Vec::new();
    write_json(&mut buff, report).unwrap();
    serde_json::from_slice(&buff).unwrap()
}

#[test]
fn test_empty_report() {
    let report = CrashReport::new("empty.log", Vec::new());
    assert_eq!(
        serde_json::json!({"filename": "empty.log", "exceptions": []}),
        to_value(&report)
    );
}

#[test]
fn test_record_fields() {
    let report = CrashReport::new(
        "app.log",
        vec![ExceptionRecord {
            line: "42".into(),
            ty: "ValueError".into(),
            message: r#"bad "input" \ here"#.into(),
        }],
    );
    assert_eq!(
        serde_json::json!({
            "filename": "app.log",
            "exceptions": [
                {"line": "42", "type": "ValueError", "message": r#"bad "input" \ here"#}
            ]
        }),
        to_value(&report)
    );
}

#[test]
fn test_field_order() {
    let report = CrashReport::new(
        "order.log",
        vec![ExceptionRecord {
            line: "1".into(),
            ty: "E".into(),
            message: "m".into(),
        }],
    );
    let mut buff = Vec::new();
    write_json(&mut buff, &report).unwrap();
    let json = String::from_utf8(buff).unwrap();

    let positions: Vec<usize> = [
        "\"filename\"",
        "\"exceptions\"",
        "\"line\"",
        "\"type\"",
        "\"message\"",
    ]
    .iter()
    .map(|key| json.find(key).unwrap())
    .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, positions);
}

#[test]
fn test_control_characters_escaped() {
    let report = CrashReport::new(
        "tab.log",
        vec![ExceptionRecord {
            line: "3".into(),
            ty: "OSError".into(),
            message: "a\tb\r".into(),
        }],
    );
    let mut buff = Vec::new();
    write_json(&mut buff, &report).unwrap();
    let json = String::from_utf8(buff).unwrap();
    assert!(json.contains(r#""message": "a\tb\r""#));

    let parsed: CrashReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report, parsed);
}
