// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::SheetBackend;
use crate::error::PersistenceError;
use crate::row::header_row;

/// A sheet held in process memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySheet {
    rows: Vec<Vec<String>>,
}

impl MemorySheet {
    /// Creates a sheet containing only the header row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![header_row()],
        }
    }

    /// Creates a sheet from raw rows, header included if any.
    #[must_use]
    pub const fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Returns the raw rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl SheetBackend for MemorySheet {
    fn read_rows(&mut self) -> Result<Vec<Vec<String>>, PersistenceError> {
        Ok(self.rows.clone())
    }

    fn write_row(&mut self, row_number: usize, cells: &[String]) -> Result<(), PersistenceError> {
        let row: &mut Vec<String> = row_number
            .checked_sub(1)
            .and_then(|index| self.rows.get_mut(index))
            .ok_or(PersistenceError::RowOutOfRange { row_number })?;
        *row = cells.to_vec();
        Ok(())
    }

    fn append_row(&mut self, cells: &[String]) -> Result<usize, PersistenceError> {
        self.rows.push(cells.to_vec());
        Ok(self.rows.len())
    }
}
