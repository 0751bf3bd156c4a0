//! Log sink that mirrors stderr into the agent's log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writes every record to stderr and appends it to a file.
///
/// Handed to `env_logger` as a pipe target. A file that cannot be opened or
/// written degrades to stderr only.
pub struct LogTee {
    file: Option<File>,
}

impl LogTee {
    pub fn open(path: &Path) -> Self {
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("[LOGGING ERROR] cannot open {}: {e}", path.display());
                None
            },
        };
        Self { file }
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

impl Write for LogTee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = &mut self.file
            && let Err(e) = file.write_all(buf)
        {
            eprintln!("[LOGGING ERROR] {e}");
            self.file = None;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = &mut self.file {
            file.flush()?;
        }
        io::stderr().flush()
    }
}
