/// Salted one-way password hashes
///
/// A stored hash is an Argon2id PHC string: algorithm, version, cost
/// parameters, a random 16-byte salt and the 32-byte digest, e.g.
/// `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<digest>`. The plaintext never
/// leaves this module.
///
/// Cost: 64 MiB of memory, 3 passes, 4 lanes. Both functions are CPU-bound
/// for tens of milliseconds; async callers run them on the blocking pool.
///
/// # Example
///
/// ```
/// use agriscan_shared::auth::password::{hash_password, verify_password};
///
/// let stored = hash_password("secret").unwrap();
/// assert!(verify_password("secret", &stored).unwrap());
/// assert!(!verify_password("Secret", &stored).unwrap());
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

const MEMORY_KIB: u32 = 64 * 1024;
const PASSES: u32 = 3;
const LANES: u32 = 4;
const DIGEST_LEN: usize = 32;

/// Hashing or verification could not run
///
/// A wrong password is not an error; see [`verify_password`].
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Password verification failed: {0}")]
    Verify(String),
}

fn argon2id() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_KIB, PASSES, LANES, Some(DIGEST_LEN))
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes `password` under a fresh random salt and returns the PHC string
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2id()?
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks `password` against a stored PHC string in constant time
///
/// Cost parameters come from the stored string, so hashes made under older
/// settings still verify. Returns `Ok(false)` for a wrong password.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let phc = PasswordHash::new(stored).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &phc) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}
