//! Caller-supplied destination for build output and failure reports

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// A line-oriented, cloneable writer shared by everything taking part in one build
#[derive(Clone)]
pub struct DiagnosticsSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl fmt::Debug for DiagnosticsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsSink").finish_non_exhaustive()
    }
}

impl DiagnosticsSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// A sink writing into memory, plus a handle to read what was written
    pub fn capture() -> (Self, CapturedOutput) {
        let buffer = CapturedOutput::default();
        (Self::new(buffer.clone()), buffer)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes a single line; embedded line breaks are split into separate lines
    pub fn line(&self, line: &str) {
        let mut writer = self.lock();
        for part in line.lines() {
            // a broken sink must not fail the build it reports on
            let _ = writer.write_all(part.as_bytes());
            let _ = writer.write_all(b"\n");
        }
        if line.is_empty() {
            let _ = writer.write_all(b"\n");
        }
    }

    /// Writes `error` followed by its chain of causes
    pub fn report(&self, error: &(dyn std::error::Error + 'static)) {
        self.line(&format!("Error: {}", error));
        let mut source = error.source();
        while let Some(cause) = source {
            self.line(&format!("Caused by: {}", cause));
            source = cause.source();
        }
        self.flush();
    }

    pub fn flush(&self) {
        let _ = self.lock().flush();
    }
}

/// In-memory buffer behind [`DiagnosticsSink::capture`]
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
