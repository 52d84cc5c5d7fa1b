use crash_log_parser::{parse_file, CrashParser, CrashReport, Error};
use std::fs::read;
use std::io::{self, Write};
use test_case::test_case;

#[test_case("empty.log", &[])]
#[test_case("single.log", &[("42", "ValueError", "bad input")])]
#[test_case("no_context.log", &[("7", "KeyError", "missing key")])]
#[test_case("no_trace.log", &[])]
#[test_case("multiple.log", &[
    ("88", "KeyError", "'user_id'"),
    ("214", "ConnectionRefusedError", "[Errno 111] Connection refused"),
])]
fn smoke_test(name: &str, expected: &[(&str, &str, &str)]) {
    let path = format!("test_data/{}", name);
    let content = read(&path).expect("failed to read");
    let records = crash_log_parser::extract(&content);
    let found: Vec<(&str, &str, &str)> = records
        .iter()
        .map(|record| (record.line.as_ref(), record.ty.as_ref(), record.message.as_ref()))
        .collect();
    assert_eq!(expected, found.as_slice());
}

#[test_case("empty.log")]
#[test_case("single.log")]
#[test_case("multiple.log")]
#[test_case("service.log")]
fn parse_file_round_trip(name: &str) {
    let path = format!("test_data/{}", name);
    let mut out = Vec::new();
    parse_file(&path, &mut out).expect("failed to parse");

    let parsed: CrashReport = serde_json::from_slice(&out).expect("invalid json");
    let content = read(&path).unwrap();
    assert_eq!(path, parsed.filename);
    assert_eq!(crash_log_parser::extract(&content), parsed.exceptions);
}

#[test]
fn empty_exceptions_are_an_array() {
    let mut out = Vec::new();
    parse_file("test_data/empty.log", &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        serde_json::json!({"filename": "test_data/empty.log", "exceptions": []}),
        value
    );
}

#[test]
fn missing_file_is_open_error() {
    let mut out = Vec::new();
    let error = parse_file("test_data/does_not_exist.log", &mut out).unwrap_err();
    assert!(matches!(error, Error::FileOpen { .. }));
    assert!(error.is_open_error());
    assert_eq!(io::ErrorKind::NotFound, error.io_error().kind());
    assert!(error.to_string().starts_with("failed to open test_data/does_not_exist.log: "));
    assert!(out.is_empty());
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn unwritable_output_is_io_error() {
    let parser = CrashParser::open("test_data/single.log").unwrap();
    let error = parser.write(BrokenPipe).unwrap_err();
    assert!(matches!(error, Error::Io(_)));
    assert!(!error.is_open_error());
    assert_eq!(io::ErrorKind::BrokenPipe, error.io_error().kind());
}

#[test]
fn unwritable_json_sink_is_io_error() {
    let report = CrashReport::new("app.log", Vec::new());
    let error = crash_log_parser::write_json(BrokenPipe, &report).unwrap_err();
    assert_eq!(io::ErrorKind::BrokenPipe, error.io_error().kind());
}

#[test]
fn parser_from_bytes() {
    let parser = CrashParser::from_bytes(
        "inline.log",
        &b"File \"job.py\", line 3, in run\nTimeoutError: took too long\n"[..],
    );
    assert_eq!("inline.log", parser.filename());
    let report = parser.report();
    assert_eq!("inline.log", report.filename);
    assert_eq!(1, report.exceptions.len());
    assert_eq!("TimeoutError", report.exceptions[0].ty);
    assert_eq!(report.exceptions, parser.records().collect::<Vec<_>>());
}
