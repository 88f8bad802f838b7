//! Credential hashing

mod hasher;

pub use hasher::Sha256PasswordHasher;
