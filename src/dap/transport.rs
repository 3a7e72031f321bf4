//! DAP transport layer: Content-Length framed JSON messages.
//!
//! The transport is split into reader and writer halves so a dedicated
//! reader thread can pump adapter messages while requesters hold the writer.

use anyhow::anyhow;
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout};

/// Reading half of a DAP connection.
pub trait DapRead: Send {
    /// Read a single DAP message (with Content-Length framing).
    fn read_message(&mut self) -> anyhow::Result<Value>;
}

/// Writing half of a DAP connection.
pub trait DapWrite: Send {
    /// Write a single DAP message (with Content-Length framing).
    fn write_message(&mut self, message: &Value) -> anyhow::Result<()>;
}

impl DapRead for Box<dyn DapRead> {
    fn read_message(&mut self) -> anyhow::Result<Value> {
        (**self).read_message()
    }
}

impl DapWrite for Box<dyn DapWrite> {
    fn write_message(&mut self, message: &Value) -> anyhow::Result<()> {
        (**self).write_message(message)
    }
}

pub struct PipeReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> PipeReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
        }
    }
}

impl<R: Read + Send> DapRead for PipeReader<R> {
    fn read_message(&mut self) -> anyhow::Result<Value> {
        let mut content_length: Option<usize> = None;
        loop {
            let mut line = String::new();
            let read_n = self.reader.read_line(&mut line)?;
            if read_n == 0 {
                return Err(anyhow!("DAP connection closed"));
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break;
            }
            if let Some(v) = line.strip_prefix("Content-Length:") {
                content_length = Some(v.trim().parse()?);
            }
        }

        let len = content_length.ok_or_else(|| anyhow!("Missing Content-Length header"))?;
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        let msg: Value = serde_json::from_slice(&buf)?;
        Ok(msg)
    }
}

pub struct PipeWriter<W: Write> {
    writer: W,
}

impl<W: Write> PipeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { writer: inner }
    }
}

impl<W: Write + Send> DapWrite for PipeWriter<W> {
    fn write_message(&mut self, message: &Value) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(message)?;
        write!(self.writer, "Content-Length: {}\r\n\r\n", payload.len())?;
        self.writer.write_all(&payload)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Take the stdio pipes of a spawned adapter process and wrap them into
/// transport halves. The child must be spawned with piped stdin/stdout.
pub fn stdio(
    child: &mut Child,
) -> anyhow::Result<(PipeReader<ChildStdout>, PipeWriter<ChildStdin>)> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("adapter stdout is not piped"))?;
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("adapter stdin is not piped"))?;
    Ok((PipeReader::new(stdout), PipeWriter::new(stdin)))
}
