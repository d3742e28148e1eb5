//! Credential store.
//!
//! Every account carries a one-way hash of its authorization secret. This
//! module turns secrets into Argon2id PHC strings and checks presented
//! secrets against them.

mod secret;

pub use secret::{CredentialError, hash_secret, verify_secret};
