//! Output-file policy
//!
//! Every artifact this tool emits goes through [`write_file`], which
//! implements the create-or-overwrite contract:
//!
//! - target absent → create it
//! - target exists with zero size → overwrite regardless of the flag
//! - target exists non-empty, overwrite disabled → silently keep the
//!   existing content (no error, no write)
//! - target exists, overwrite enabled → remove and recreate
//!
//! The batch tool is re-runnable; keeping existing non-empty files is how a
//! partial re-run avoids clobbering keys that are already deployed.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

/// Write `contents` to `path` under the overwrite policy
///
/// Returns `true` if the file was written, `false` if an existing non-empty
/// file was kept.
pub fn write_file(path: &Path, contents: &[u8], overwrite: bool) -> Result<bool> {
    match fs::metadata(path) {
        Err(err) if err.kind() == ErrorKind::NotFound => {
            fs::write(path, contents)?;
            Ok(true)
        }
        Err(err) => Err(err.into()),
        Ok(meta) => {
            if meta.len() > 0 && !overwrite {
                return Ok(false);
            }
            fs::remove_file(path)?;
            fs::write(path, contents)?;
            Ok(true)
        }
    }
}
