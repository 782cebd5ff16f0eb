//! Local SQLite store for registration drafts.
//!
//! Drafts come from a `localStorage` export of the old site, where forms
//! that failed to submit were parked. They stay here until `migrate` has
//! pushed them to the API.

mod db;
mod import;
mod models;
mod queries;

#[cfg(test)]
mod tests;

pub use db::{DatabaseError, DraftStore};
pub use import::{ImportError, ParsedExport, parse_export};
pub use models::{Draft, NewDraft};
