pub use crate::error::{Error, Result};
pub use crate::extract::{extract, records, ExceptionRecord, Records};
pub use crate::report::{write_json, CrashReport};
use log::debug;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

mod error;
mod extract;
mod report;

/// Read the complete contents of the log at `path`.
///
/// A failure to open the file is reported as [`Error::FileOpen`], failures after that as [`Error::Io`].
pub fn read_log(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|reason| Error::FileOpen {
        path: path.to_path_buf(),
        reason,
    })?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    debug!("read {} bytes from {}", content.len(), path.display());
    Ok(content)
}

/// A crash log loaded into memory, ready to be extracted and serialized.
pub struct CrashParser {
    filename: String,
    content: Vec<u8>,
}

impl CrashParser {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_log(path)?;
        Ok(CrashParser {
            filename: path.to_string_lossy().into_owned(),
            content,
        })
    }

    pub fn from_bytes(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        CrashParser {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn records(&self) -> Records<'_> {
        records(&self.content)
    }

    pub fn report(&self) -> CrashReport<'_> {
        CrashReport::new(self.filename.as_str(), self.records().collect())
    }

    /// Write the json report to `out`.
    ///
    /// The document is rendered in full before anything is written,
    /// so `out` never receives a partial document from a failed serialization.
    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        let report = self.report();
        let mut buff = Vec::new();
        write_json(&mut buff, &report)?;
        buff.push(b'\n');
        out.write_all(&buff)?;
        out.flush()?;
        debug!("wrote {} bytes", buff.len());
        Ok(())
    }
}

/// Extract all exceptions from the log at `path` and write them to `out` as json
pub fn parse_file<P: AsRef<Path>, W: Write>(path: P, out: W) -> Result<()> {
    CrashParser::open(path)?.write(out)
}
