//! invoicing-core: the invoice computation and issuance core.
//!
//! Multi-tenant invoice assembly: per-organization per-day document
//! numbering, fixed-point monetary totals, and authenticated encryption of
//! tax identifiers at rest. Embedded in-process by the surrounding request
//! layer; this crate exposes no network surface of its own.

pub mod crypto;
pub mod models;
pub mod money;
pub mod numbering;
pub mod services;
pub mod store;
