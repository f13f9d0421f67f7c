use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::common::error::Result;

/// Open a file for read-only access.
pub fn open_ro(path: &Path) -> Result<File> {
    Ok(File::open(path)?)
}

/// Open a file for read/write access without truncating it.
pub fn open_rw(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().read(true).write(true).open(path)?)
}
