//! Password hashing port

/// One-way credential hashing.
///
/// `hash` output is self-describing: `verify` needs nothing but the stored
/// string.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> String;

    fn verify(&self, password: &str, hashed: &str) -> bool;
}
