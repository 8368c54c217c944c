// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::Path;

use tracing::info;

use complaint_desk_domain::Directory;

use crate::error::PersistenceError;

/// Loads the directory snapshot (users and departments) from a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the snapshot file
///
/// # Errors
///
/// Returns `PersistenceError::DirectoryLoadFailed` if the file cannot be
/// read or does not hold a valid directory.
pub fn load_directory<P: AsRef<Path>>(path: P) -> Result<Directory, PersistenceError> {
    let path: &Path = path.as_ref();
    let contents: String = std::fs::read_to_string(path)
        .map_err(|e| PersistenceError::DirectoryLoadFailed(format!("{}: {e}", path.display())))?;

    let directory: Directory = parse_directory(&contents)?;
    info!(
        users = directory.users.len(),
        departments = directory.departments.len(),
        "Loaded directory snapshot from {}",
        path.display()
    );
    Ok(directory)
}

/// Parses a directory snapshot from JSON text.
///
/// # Errors
///
/// Returns `PersistenceError::DirectoryLoadFailed` if the text is not a
/// valid directory snapshot.
pub fn parse_directory(contents: &str) -> Result<Directory, PersistenceError> {
    serde_json::from_str(contents).map_err(|e| PersistenceError::DirectoryLoadFailed(e.to_string()))
}
