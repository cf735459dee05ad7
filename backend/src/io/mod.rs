//! # IO Module
//!
//! The interface layer between callers and the ledger service.
//!
//! - **rest**: Axum handlers under `/api/ledger`, translating ledger errors to
//!   HTTP status codes and returning events alongside the ledger view
//!
//! The CLI in `main.rs` talks to the service directly and renders the same
//! events as terminal notifications.

pub mod rest;
