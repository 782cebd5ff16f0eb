//! INTERBØX developer CLI library.
//!
//! Draft import from old `localStorage` exports, reconciliation and
//! migration against the API, charge-status polling and token minting.

pub mod api;
pub mod config;
pub mod drafts;
pub mod drafts_cmd;
pub mod poll_cmd;
pub mod poller;
pub mod reconcile;
pub mod sync_cmd;
pub mod token_cmd;
