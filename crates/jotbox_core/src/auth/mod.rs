//! Credential hashing primitives.
//!
//! # Responsibility
//! - Turn plaintext passwords into salted one-way hashes.
//! - Verify plaintext passwords against stored hashes.
//!
//! # Invariants
//! - Plaintext passwords are never persisted, logged or returned.

pub mod password;
