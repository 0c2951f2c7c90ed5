//! Jokes crypto library
//!
//! Salted Argon2 hashing for stored credentials, AES-256-GCM sealing for the
//! session cookie payload, and key derivation from the configured secret.

pub mod keys;
pub mod password;
pub mod seal;
