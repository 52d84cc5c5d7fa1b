use log::trace;
use once_cell::sync::Lazy;
use regex::bytes::{CaptureMatches, Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::iter::FusedIterator;

/// A `File "...", line N, in ...` frame, an optional context line and the `Type: message` line.
///
/// Unicode is disabled so matching works on raw bytes and `\w`, `\d` and `\s` stay ascii.
/// `.` is spelled `[^\r\n]` so a carriage return never becomes part of a header or context capture.
static TRACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?-u)File "[^\r\n]+", line (\d+), in [^\r\n]+\s+(?:[^\r\n]*\s+)?(\w+): ([^\n]+)(?:\n|$)"#,
    )
    .expect("trace regex failed to compile")
});

/// A single exception extracted from a crash trace.
///
/// Fields borrow from the scanned text unless the capture contained invalid utf8.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord<'a> {
    /// Source line number, kept as the digits that appeared in the trace
    #[serde(borrow)]
    pub line: Cow<'a, str>,
    /// Exception type name, ascii word characters only
    #[serde(rename = "type", borrow)]
    pub ty: Cow<'a, str>,
    /// Rest of the exception line, without the line terminator
    #[serde(borrow)]
    pub message: Cow<'a, str>,
}

impl<'a> ExceptionRecord<'a> {
    fn from_captures(captures: &Captures<'a>) -> Self {
        ExceptionRecord {
            line: group(captures, 1),
            ty: group(captures, 2),
            message: group(captures, 3),
        }
    }
}

fn group<'a>(captures: &Captures<'a>, index: usize) -> Cow<'a, str> {
    captures
        .get(index)
        .map(|m| String::from_utf8_lossy(m.as_bytes()))
        .unwrap_or_default()
}

/// Iterator over the exceptions in a log, in the order they appear.
///
/// Matches never overlap, scanning resumes at the end of the previous match.
pub struct Records<'a> {
    captures: CaptureMatches<'static, 'a>,
}

impl<'a> Records<'a> {
    pub fn new(text: &'a [u8]) -> Self {
        Records {
            captures: TRACE_REGEX.captures_iter(text),
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = ExceptionRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let captures = self.captures.next()?;
        let record = ExceptionRecord::from_captures(&captures);
        trace!(
            "matched {} at line {} ({} bytes)",
            record.ty,
            record.line,
            captures.get(0).map_or(0, |m| m.len())
        );
        Some(record)
    }
}

impl FusedIterator for Records<'_> {}

/// Lazily scan `text` for crash traces
pub fn records<T: AsRef<[u8]> + ?Sized>(text: &T) -> Records<'_> {
    Records::new(text.as_ref())
}

/// Scan all of `text` and collect every exception found.
///
/// Text without any trace yields an empty list.
pub fn extract<T: AsRef<[u8]> + ?Sized>(text: &T) -> Vec<ExceptionRecord<'_>> {
    records(text).collect()
}

#[cfg(test)]
fn record<'a>(line: &'a str, ty: &'a str, message: &'a str) -> ExceptionRecord<'a> {
    ExceptionRecord {
        line: line.into(),
        ty: ty.into(),
        message: message.into(),
    }
}

#[test]
fn test_extract_empty() {
    assert_eq!(Vec::<ExceptionRecord>::new(), extract(""));
}

#[test]
fn test_extract_with_context_line() {
    let input = "File \"app.py\", line 42, in run\nTraceback stuff\nValueError: bad input\n";
    assert_eq!(vec![record("42", "ValueError", "bad input")], extract(input));
}

#[test]
fn test_extract_without_context_line() {
    let input = "File \"app.py\", line 7, in main\nKeyError: missing key";
    assert_eq!(vec![record("7", "KeyError", "missing key")], extract(input));
}

#[test]
fn test_extract_innermost_frame() {
    let input = r#"Traceback (most recent call last):
  File "app.py", line 10, in <module>
    main()
  File "app.py", line 6, in main
    run()
RuntimeError: boom
"#;
    assert_eq!(vec![record("6", "RuntimeError", "boom")], extract(input));
}

#[test]
fn test_extract_keeps_text_order() {
    let input = "File \"a.py\", line 1, in f\nAError: first\nnoise\nmore noise\nFile \"b.py\", line 2, in g\n  g()\nBError: second\n";
    assert_eq!(
        vec![
            record("1", "AError", "first"),
            record("2", "BError", "second")
        ],
        extract(input)
    );
}

#[test]
fn test_extract_no_trace() {
    assert!(extract("INFO File handling complete\nWARN: nothing to see").is_empty());
}

#[test]
fn test_type_requires_word_characters() {
    let input = "File \"app.py\", line 3, in f\nmodule.Error: dotted\n";
    assert!(extract(input).is_empty());
}

#[test]
fn test_line_requires_digits() {
    let input = "File \"app.py\", line ?, in f\nValueError: no line\n";
    assert!(extract(input).is_empty());
}

#[test]
fn test_optional_line_can_end_mid_line() {
    // the context line may stop at any whitespace, so a later `word: ` wins
    let input = "File \"app.py\", line 5, in f\nRuntimeError: code 5 Detail: disk full\n";
    assert_eq!(vec![record("5", "Detail", "disk full")], extract(input));
}

#[test]
fn test_message_keeps_carriage_return() {
    let input = "File \"app.py\", line 9, in f\r\n    f()\r\nOSError: gone\r\n";
    assert_eq!(vec![record("9", "OSError", "gone\r")], extract(input));
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let input = b"File \"app.py\", line 4, in f\nValueError: bad \xff byte\n";
    let records = extract(&input[..]);
    assert_eq!(1, records.len());
    assert_eq!("bad \u{fffd} byte", records[0].message);
    assert!(matches!(records[0].ty, Cow::Borrowed("ValueError")));
}
