use std::fs;
use std::path::Path;

use crate::error::BatchError;

/// Read a newline-delimited list of image paths.
///
/// Lines are trimmed and blank lines dropped; order is preserved and
/// duplicates are kept (a later entry simply overwrites the earlier result at
/// merge time). A missing or unreadable list file fails the whole run.
pub fn read_image_list(path: &Path) -> Result<Vec<String>, BatchError> {
    if !path.exists() {
        return Err(BatchError::ImageListMissing(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| BatchError::ImageListRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
