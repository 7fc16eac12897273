use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use thiserror::Error;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("argon2 failure: {0}")]
    Argon2(#[from] argon2::Error),

    #[error("stored salt is not valid base64: {0}")]
    Salt(#[from] base64::DecodeError),
}

/// Base64 digest plus the base64 salt it was derived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub hash: String,
    pub salt: String,
}

/// Password hashing collaborator. Every call to `hash` draws a fresh salt.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<HashedPassword, HashError>;

    /// False on mismatch and on malformed stored values.
    fn verify(&self, password: &str, hash: &str, salt: &str) -> bool;
}

/// Argon2id with a random 16-byte salt per password.
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Custom cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HashError> {
        let params = Params::new(m_cost, t_cost, p_cost, Some(HASH_LEN))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    fn derive(&self, password: &str, salt: &[u8]) -> Result<[u8; HASH_LEN], HashError> {
        let mut out = [0u8; HASH_LEN];
        self.argon2
            .hash_password_into(password.as_bytes(), salt, &mut out)?;
        Ok(out)
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<HashedPassword, HashError> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let digest = self.derive(password, &salt)?;
        Ok(HashedPassword {
            hash: STANDARD.encode(digest),
            salt: STANDARD.encode(salt),
        })
    }

    fn verify(&self, password: &str, hash: &str, salt: &str) -> bool {
        let Ok(salt) = STANDARD.decode(salt) else {
            return false;
        };
        let Ok(expected) = STANDARD.decode(hash) else {
            return false;
        };
        match self.derive(password, &salt) {
            Ok(digest) => constant_time_eq(&digest, &expected),
            Err(e) => {
                tracing::warn!("password verification failed: {}", e);
                false
            }
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
