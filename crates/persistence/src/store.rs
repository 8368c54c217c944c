// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Complaint store on top of a sheet backend.
//!
//! The sheet has no row locking and rows may move between a read and a
//! write, so every write re-reads the sheet, re-locates the row by id and
//! checks the version the caller loaded before replacing the whole row.

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use complaint_desk_domain::{Complaint, ComplaintId, NotificationEmail};

use crate::backend::SheetBackend;
use crate::error::PersistenceError;
use crate::row::{COL_ID, JSON_COLUMNS, decode_row, encode_row, is_header};

/// A located complaint row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRow {
    /// The 1-based row number at the time of the read.
    pub row_number: usize,
    /// The raw cells of the row.
    pub cells: Vec<String>,
}

/// Store adapter for complaint records.
pub struct ComplaintStore<B: SheetBackend> {
    backend: B,
}

/// Finds the row holding `id` among freshly read rows.
fn find_row(rows: &[Vec<String>], id: &ComplaintId) -> Option<LocatedRow> {
    let start: usize = usize::from(rows.first().is_some_and(|row| is_header(row)));

    rows.iter()
        .enumerate()
        .skip(start)
        .find(|(_, row)| {
            row.get(COL_ID)
                .is_some_and(|cell| ComplaintId::new(cell) == *id)
        })
        .map(|(index, row)| LocatedRow {
            row_number: index + 1,
            cells: row.clone(),
        })
}

impl<B: SheetBackend> ComplaintStore<B> {
    /// Creates a store over the given backend.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Locates the row holding a complaint.
    ///
    /// Ids are compared after normalization, so `'17` and `17.0` match `17`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet cannot be read.
    pub fn locate(&mut self, id: &ComplaintId) -> Result<Option<LocatedRow>, PersistenceError> {
        let rows: Vec<Vec<String>> = self.backend.read_rows()?;
        Ok(find_row(&rows, id))
    }

    /// Loads a complaint by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no row holds a valid complaint
    /// with this id, or another error if the sheet cannot be read.
    pub fn load(&mut self, id: &ComplaintId) -> Result<Complaint, PersistenceError> {
        let located: LocatedRow = self
            .locate(id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Complaint {id}")))?;

        decode_row(&located.cells).ok_or_else(|| {
            warn!(
                complaint_id = id.value(),
                row_number = located.row_number,
                "Located row does not decode"
            );
            PersistenceError::NotFound(format!("Complaint {id}"))
        })
    }

    /// Lists every decodable complaint in sheet order.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet cannot be read.
    pub fn list(&mut self) -> Result<Vec<Complaint>, PersistenceError> {
        let rows: Vec<Vec<String>> = self.backend.read_rows()?;
        let start: usize = usize::from(rows.first().is_some_and(|row| is_header(row)));

        let complaints: Vec<Complaint> = rows
            .iter()
            .skip(start)
            .filter_map(|row| decode_row(row))
            .collect();

        debug!(
            rows = rows.len().saturating_sub(start),
            complaints = complaints.len(),
            "Listed complaints"
        );
        Ok(complaints)
    }

    /// Appends a new complaint.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateId` if a row already holds this
    /// id, or another error if the write fails.
    pub fn append(&mut self, complaint: &Complaint) -> Result<usize, PersistenceError> {
        if self.locate(&complaint.id)?.is_some() {
            return Err(PersistenceError::DuplicateId(complaint.id.to_string()));
        }

        let cells: Vec<String> = encode_row(complaint)?;
        let row_number: usize = self.backend.append_row(&cells)?;
        info!(
            complaint_id = complaint.id.value(),
            row_number, "Appended complaint"
        );
        Ok(row_number)
    }

    /// Re-reads the current row and checks it is still the version the
    /// caller loaded.
    fn verify_current(
        &mut self,
        expected: &Complaint,
    ) -> Result<LocatedRow, PersistenceError> {
        let located: LocatedRow = self
            .locate(&expected.id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Complaint {}", expected.id)))?;

        let current: Complaint =
            decode_row(&located.cells).ok_or(PersistenceError::CorruptRow {
                row_number: located.row_number,
            })?;

        if current.updated_at != expected.updated_at {
            warn!(
                complaint_id = expected.id.value(),
                "Stored complaint changed since it was read"
            );
            return Err(PersistenceError::StaleWrite {
                complaint_id: expected.id.to_string(),
            });
        }

        Ok(located)
    }

    /// Replaces a complaint that the caller previously loaded.
    ///
    /// # Arguments
    ///
    /// * `expected` - The complaint as the caller loaded it
    /// * `next` - The new complaint state
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the row disappeared,
    /// `PersistenceError::StaleWrite` if it was modified in the meantime,
    /// or another error if the read or write fails.
    pub fn commit(&mut self, expected: &Complaint, next: &Complaint) -> Result<(), PersistenceError> {
        let located: LocatedRow = self.verify_current(expected)?;

        let cells: Vec<String> = encode_row(next)?;
        self.backend.write_row(located.row_number, &cells)?;

        debug!(
            complaint_id = next.id.value(),
            row_number = located.row_number,
            status = next.status.as_str(),
            "Committed complaint"
        );
        Ok(())
    }

    /// Records that the closure notice was delivered.
    ///
    /// Only the notification field changes; `updated_at` is left alone so
    /// that clients holding the closed record do not see a conflict.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the complaint is gone, or
    /// another error if the read or write fails.
    pub fn record_notification_email(
        &mut self,
        id: &ComplaintId,
        to: &str,
        sent_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        let located: LocatedRow = self
            .locate(id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Complaint {id}")))?;
        let mut complaint: Complaint =
            decode_row(&located.cells).ok_or(PersistenceError::CorruptRow {
                row_number: located.row_number,
            })?;

        complaint.notification_email = Some(NotificationEmail {
            sent: true,
            sent_at: Some(sent_at),
            to: Some(to.to_string()),
        });

        let cells: Vec<String> = encode_row(&complaint)?;
        self.backend.write_row(located.row_number, &cells)?;

        info!(complaint_id = id.value(), to, "Recorded closure notification");
        Ok(())
    }

    /// Rewrites literal `null` JSON cells as empty cells.
    ///
    /// # Returns
    ///
    /// The number of rows that were changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet cannot be read or written.
    pub fn repair_null_cells(&mut self) -> Result<usize, PersistenceError> {
        let rows: Vec<Vec<String>> = self.backend.read_rows()?;
        let start: usize = usize::from(rows.first().is_some_and(|row| is_header(row)));
        let mut repaired: usize = 0;

        for (index, row) in rows.iter().enumerate().skip(start) {
            let mut cells: Vec<String> = row.clone();
            let mut changed: bool = false;

            for column in JSON_COLUMNS {
                if let Some(cell) = cells.get_mut(column).filter(|c| c.trim() == "null") {
                    cell.clear();
                    changed = true;
                }
            }

            if changed {
                self.backend.write_row(index + 1, &cells)?;
                repaired += 1;
            }
        }

        info!(repaired, "Repaired null JSON cells");
        Ok(repaired)
    }
}
