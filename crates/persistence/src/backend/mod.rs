// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tabular sheet backends.
//!
//! A sheet is an ordered list of rows of string cells, addressed by a
//! 1-based row number, with no native row locking. Complaint semantics
//! (locating, decoding, version checks) live in the store on top of it.
//!
//! ## Backend Support
//!
//! - `sqlite` — `SQLite` via Diesel, one table row per sheet row
//! - `memory` — plain in-process rows for tests and ephemeral runs

pub mod memory;
pub mod sqlite;

use crate::error::PersistenceError;

/// Row-level access to a tabular sheet.
pub trait SheetBackend {
    /// Reads every row, header included. Index `i` holds row `i + 1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet cannot be read.
    fn read_rows(&mut self) -> Result<Vec<Vec<String>>, PersistenceError>;

    /// Overwrites every cell of an existing row.
    ///
    /// # Arguments
    ///
    /// * `row_number` - The 1-based row number
    /// * `cells` - The complete row contents
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::RowOutOfRange` if the row does not exist,
    /// or another error if the write fails.
    fn write_row(&mut self, row_number: usize, cells: &[String]) -> Result<(), PersistenceError>;

    /// Appends a row after the last one.
    ///
    /// # Returns
    ///
    /// The 1-based row number of the new row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn append_row(&mut self, cells: &[String]) -> Result<usize, PersistenceError>;
}
