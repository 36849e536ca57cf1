//! Per-frame result log.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::tracker::Region;

/// Append-only `x,y,width,height` log, one line per processed frame.
///
/// Each line is flushed as soon as it is written, so an aborted run leaves a
/// well-formed prefix of the log behind.
pub struct ResultSink<W: Write> {
    writer: W,
    lines_written: usize,
}

impl ResultSink<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::io(format!("failed to create {}", path.display()), e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ResultSink<W> {
    /// Log into any writer, e.g. a `Vec<u8>` in tests.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lines_written: 0,
        }
    }

    /// Write one frame's region.
    pub fn append(&mut self, region: &Region) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{}",
            region.x, region.y, region.width, region.height
        )
        .and_then(|_| self.writer.flush())
        .map_err(|e| Error::io("failed to write result log", e))?;
        self.lines_written += 1;
        Ok(())
    }

    /// Lines appended so far.
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| Error::io("failed to flush result log", e))?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_per_region() {
        let mut sink = ResultSink::new(Vec::new());
        sink.append(&Region::new(10.0, 20.0, 100.0, 100.0)).unwrap();
        sink.append(&Region::new(5.5, 5.0, 50.0, 50.25)).unwrap();
        assert_eq!(sink.lines_written(), 2);

        let text = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(text, "10,20,100,100\n5.5,5,50,50.25\n");
        for line in text.lines() {
            assert_eq!(line.split(',').count(), 4);
        }
    }

    #[test]
    fn test_file_is_readable_before_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let mut sink = ResultSink::create(&path).unwrap();
        sink.append(&Region::new(1.0, 2.0, 3.0, 4.0)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1,2,3,4\n");
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let result = ResultSink::create(dir.path().join("missing").join("output.txt"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
