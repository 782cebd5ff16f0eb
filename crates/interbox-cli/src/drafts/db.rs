//! SQLite database for the drafts store.

pub use interbox_core::db::DatabaseError;

interbox_core::define_database!(DraftStore, "Drafts database migrations complete");
