use std::fs::OpenOptions;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use thiserror::Error;

use crate::persist::{write_atomically, PersistError};

/// Default mailbox file name, relative to the working directory.
pub const DEFAULT_MAILBOX_FILE: &str = "ipc_chat.txt";

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("mailbox {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Single-slot, file-backed handoff between the input and display processes.
///
/// Writing replaces any unread message. Reading takes the message and leaves
/// the file empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    path: PathBuf,
}

impl Mailbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the empty backing file if absent. Existing content is kept.
    pub fn ensure_exists(&self) -> Result<(), MailboxError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map(|_| ())
            .map_err(|source| self.io_error(source))
    }

    pub fn write(&self, text: &str) -> Result<(), MailboxError> {
        write_atomically(&self.path, text).map_err(|source| MailboxError::Write {
            path: self.path.clone(),
            source,
        })?;
        engine_debug!("mailbox write len={} path={:?}", text.len(), self.path);
        Ok(())
    }

    /// Returns the pending message (empty if none or if the file is absent)
    /// and truncates the file.
    pub fn read_and_clear(&self) -> Result<String, MailboxError> {
        let mut file = match OpenOptions::new().read(true).write(true).open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
            Err(err) => return Err(self.io_error(err)),
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| self.io_error(source))?;
        if bytes.is_empty() {
            return Ok(String::new());
        }

        file.set_len(0).map_err(|source| self.io_error(source))?;
        let contents = String::from_utf8_lossy(&bytes).into_owned();
        engine_debug!("mailbox read len={} path={:?}", contents.len(), self.path);
        Ok(contents)
    }

    fn io_error(&self, source: io::Error) -> MailboxError {
        MailboxError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
