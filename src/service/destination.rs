use crate::models::error::{LogStoreError, Result};
use crate::models::log_record::LogRecord;
use crate::service::formatter::{DefaultFormatter, Formatter};
use log::warn;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

/// Something that accepts log records and produces a side effect.
///
/// `send` never returns an error: a destination that fails to deliver a record
/// reports the failure as a diagnostic and drops the record.
pub trait Destination: Send + Sync {
    fn send(&self, record: &LogRecord);
}

impl<F> Destination for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn send(&self, record: &LogRecord) {
        self(record)
    }
}

/// Prints formatted records to stdout in debug builds, does nothing otherwise.
pub struct ConsoleDestination {
    formatter: Box<dyn Formatter>,
}

impl ConsoleDestination {
    pub fn new() -> Self {
        Self::with_formatter(DefaultFormatter)
    }

    pub fn with_formatter(formatter: impl Formatter + 'static) -> Self {
        ConsoleDestination {
            formatter: Box::new(formatter),
        }
    }

    fn write_to(&self, out: &mut impl Write, record: &LogRecord) -> io::Result<()> {
        writeln!(out, "{}", self.formatter.format(record))
    }
}

impl Default for ConsoleDestination {
    fn default() -> Self {
        Self::new()
    }
}

impl Destination for ConsoleDestination {
    fn send(&self, record: &LogRecord) {
        if cfg!(debug_assertions) {
            let mut stdout = io::stdout().lock();
            if let Err(e) = self.write_to(&mut stdout, record) {
                warn!("Dropping log record: failed to write to stdout: {}", e);
            }
        }
    }
}

// One handle per file on disk, shared by every live destination writing to it.
// Entries are weak so a file is closed once its last destination is dropped.
static OPEN_FILES: Lazy<Mutex<HashMap<PathBuf, SharedFile>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

struct SharedFile {
    handle: Weak<Mutex<File>>,
    identity: Option<(u64, u64)>,
}

#[cfg(unix)]
fn file_identity(metadata: &Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn file_identity(_metadata: &Metadata) -> Option<(u64, u64)> {
    None
}

fn shared_handle(path: &Path) -> Result<Arc<Mutex<File>>> {
    let open_error = |cause| LogStoreError::FileOpen {
        path: path.to_path_buf(),
        cause,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)?;
    let identity = file_identity(&file.metadata().map_err(open_error)?);
    let key = fs::canonicalize(path).map_err(open_error)?;

    let mut open_files = OPEN_FILES.lock().unwrap_or_else(|e| e.into_inner());
    open_files.retain(|_, shared| shared.handle.strong_count() > 0);

    // A deleted or rotated file leaves a handle to the old inode behind.
    if let Some(shared) = open_files.get(&key) {
        if shared.identity == identity {
            if let Some(handle) = shared.handle.upgrade() {
                return Ok(handle);
            }
        }
    }

    let handle = Arc::new(Mutex::new(file));
    open_files.insert(
        key,
        SharedFile {
            handle: Arc::downgrade(&handle),
            identity,
        },
    );
    Ok(handle)
}

/// Appends formatted records, one per line, to a file.
pub struct FileDestination {
    path: PathBuf,
    handle: Arc<Mutex<File>>,
    formatter: Box<dyn Formatter>,
}

impl FileDestination {
    /// Opens `path` for appending, creating it if it does not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_formatter(path, DefaultFormatter)
    }

    pub fn with_formatter(
        path: impl AsRef<Path>,
        formatter: impl Formatter + 'static,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let handle = shared_handle(&path)?;
        Ok(FileDestination {
            path,
            handle,
            formatter: Box::new(formatter),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut file = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .map_err(|cause| LogStoreError::FileWrite {
                path: self.path.clone(),
                cause,
            })
    }
}

impl Destination for FileDestination {
    fn send(&self, record: &LogRecord) {
        let line = self.formatter.format(record);
        if let Err(e) = self.write_line(&line) {
            warn!("Dropping log record: {}", e);
        }
    }
}
