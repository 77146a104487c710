use std::io::{Result as IoResult, Write};
use std::process::Stdio;

/// Memory-backed stdout for a command whose output is redirected.
///
/// Built-ins write into it directly; external programs are given a pipe whose
/// contents are copied in once the child has finished writing.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    buf: Vec<u8>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return collected bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl crate::command::Stdout for CaptureBuffer {
    fn stdio(&self) -> Option<Stdio> {
        None
    }
}
