use kowalski_application::PasswordHasher;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Salted SHA-256, stored as `<salt hex>$<digest hex>`.
#[derive(Debug, Clone, Default)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    fn digest(salt: &[u8], password: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hasher.finalize().to_vec()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        format!(
            "{}${}",
            hex::encode(salt),
            hex::encode(Self::digest(&salt, password))
        )
    }

    fn verify(&self, password: &str, hashed: &str) -> bool {
        let Some((salt, digest)) = hashed.split_once('$') else {
            return false;
        };
        let (Ok(salt), Ok(digest)) = (hex::decode(salt), hex::decode(digest)) else {
            return false;
        };
        constant_time_eq(&Self::digest(&salt, password), &digest)
    }
}
