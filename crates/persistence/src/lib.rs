// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the complaint desk.
//!
//! Complaints live in a tabular sheet: one header row followed by one row
//! per complaint, with nested structures stored as JSON cells. The sheet
//! itself is a dumb row store behind the `SheetBackend` trait; the
//! `ComplaintStore` adds the complaint semantics.
//!
//! ## Backend Support
//!
//! - **`SQLite`** (default) — diesel-managed table with embedded migrations,
//!   file-backed in production and in-memory for tests
//! - **Memory** — plain rows, for unit tests and ephemeral runs
//!
//! ## Write Discipline
//!
//! The sheet has no row locks and rows can be reordered by hand, so a row
//! number is only trusted right after it was read. Every write:
//!
//! 1. Re-reads all rows
//! 2. Re-locates the complaint by normalized id
//! 3. Compares the stored `updated_at` with the version the caller loaded
//! 4. Replaces the whole row
//!
//! A version mismatch surfaces as `PersistenceError::StaleWrite`.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod backend;
mod diesel_schema;
mod directory;
mod error;
mod row;
mod store;

#[cfg(test)]
mod tests;

pub use backend::SheetBackend;
pub use backend::memory::MemorySheet;
pub use backend::sqlite::SqliteSheet;
pub use directory::{load_directory, parse_directory};
pub use error::PersistenceError;
pub use row::{COLUMNS, decode_row, encode_row, header_row};
pub use store::{ComplaintStore, LocatedRow};
