//! Domain model for accounts, sessions and notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own input normalization and validation rules shared by every caller.
//!
//! # Invariants
//! - Every persisted object is identified by a stable integer id.
//! - Every note is owned by exactly one user.

pub mod note;
pub mod session;
pub mod user;
pub mod validation;
