//! Core business logic for Bursar.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Ledger rules, credential hashing and account-number generation live here.
//!
//! # Modules
//!
//! - `credential` - Secret hashing and verification
//! - `account` - Account creation rules and number generation
//! - `ledger` - Transfer and settlement decisions

pub mod account;
pub mod credential;
pub mod ledger;
