//! Append-only JSONL file sink.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Shared handle to the log file. Clones write to the same file.
#[derive(Clone)]
pub struct AppendWriter {
    inner: Arc<Mutex<LineWriter<File>>>,
}

impl AppendWriter {
    /// Open `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(LineWriter::new(file))),
        })
    }
}

impl Write for AppendWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // One lock per line keeps concurrent events from interleaving.
        self.inner.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// [`MakeWriter`] handing out clones of one [`AppendWriter`].
#[derive(Clone)]
pub struct AppendWriterFactory {
    writer: AppendWriter,
}

impl AppendWriterFactory {
    pub fn new(writer: AppendWriter) -> Self {
        Self { writer }
    }
}

impl<'a> MakeWriter<'a> for AppendWriterFactory {
    type Writer = AppendWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_parent_dirs_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("out.jsonl");

        let mut first = AppendWriter::open(&path).unwrap();
        first.write_all(b"one\n").unwrap();
        let mut second = AppendWriter::open(&path).unwrap();
        second.write_all(b"two\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_factory_clones_share_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.jsonl");
        let factory = AppendWriterFactory::new(AppendWriter::open(&path).unwrap());

        factory.make_writer().write_all(b"a\n").unwrap();
        factory.make_writer().write_all(b"b\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }
}
