//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Path that stands for stdin or stdout.
pub const STDIO: &str = "-";

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}

/// Open `path` for reading; `-` is stdin.
pub fn open_input(path: &Path) -> io::Result<Box<dyn Read>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Create `path` for writing; `-` is stdout.
pub fn open_output(path: &Path) -> io::Result<Box<dyn Write>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Size of the file at `path`, if it is a regular file.
pub fn input_len(path: &Path) -> Option<u64> {
    if is_stdio(path) {
        return None;
    }
    std::fs::metadata(path).ok().map(|m| m.len())
}

/// Writer that counts the bytes passing through it.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    /// Wrap `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes written so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Space saved by `encoded` relative to `original`, in percent.
pub fn space_savings(original: u64, encoded: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (1.0 - encoded as f64 / original as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_savings() {
        assert_eq!(space_savings(0, 10), 0.0);
        assert_eq!(space_savings(200, 50), 75.0);
        assert!(space_savings(100, 150) < 0.0);
    }

    #[test]
    fn test_counting_writer() {
        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"hello").unwrap();
        writer.write_all(b", world").unwrap();
        assert_eq!(writer.count(), 12);
    }

    #[test]
    fn test_stdio_has_no_length() {
        assert_eq!(input_len(Path::new("-")), None);
        assert_eq!(input_len(Path::new("/definitely/not/here")), None);
    }
}
