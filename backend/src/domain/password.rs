//! Salted password hashing and verification.
//!
//! Credentials are derived with Argon2id. Each account owns a random salt
//! generated once at registration; the digest is the raw Argon2 output for
//! `(password, salt)` under the configured cost parameters. Both are stored as
//! lowercase hex so they survive any text column.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use tracing::error;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Errors raised while configuring or running the password hasher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashingError {
    /// The Argon2 cost parameters were rejected.
    #[error("invalid password hashing parameters: {message}")]
    InvalidParams { message: String },
    /// Argon2 failed while deriving a digest.
    #[error("password hashing failed: {message}")]
    Hash { message: String },
    /// A stored salt or digest was not valid hex of the expected length.
    #[error("stored {component} is malformed")]
    Malformed { component: &'static str },
}

/// Per-account random salt.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Wrap raw salt bytes.
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a salt from its stored hex form.
    pub fn from_hex(encoded: &str) -> Result<Self, PasswordHashingError> {
        let mut bytes = [0_u8; SALT_LEN];
        hex::decode_to_slice(encoded, &mut bytes)
            .map_err(|_| PasswordHashingError::Malformed { component: "salt" })?;
        Ok(Self(bytes))
    }

    /// Printable hex encoding used for storage.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

/// One-way Argon2 output for a password and salt.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PasswordDigest([u8; DIGEST_LEN]);

impl PasswordDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a digest from its stored hex form.
    pub fn from_hex(encoded: &str) -> Result<Self, PasswordHashingError> {
        let mut bytes = [0_u8; DIGEST_LEN];
        hex::decode_to_slice(encoded, &mut bytes).map_err(|_| PasswordHashingError::Malformed {
            component: "digest",
        })?;
        Ok(Self(bytes))
    }

    /// Printable hex encoding used for storage.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Compare without short-circuiting on the first differing byte.
    pub fn constant_time_eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Stored credential pair for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCredential {
    salt: Salt,
    digest: PasswordDigest,
}

impl PasswordCredential {
    /// Pair a salt with the digest derived from it.
    pub fn new(salt: Salt, digest: PasswordDigest) -> Self {
        Self { salt, digest }
    }

    /// Credential that no password verifies against.
    ///
    /// Used to spend the same hashing effort when no account matched.
    pub fn placeholder() -> Self {
        Self {
            salt: Salt([0_u8; SALT_LEN]),
            digest: PasswordDigest([0_u8; DIGEST_LEN]),
        }
    }

    /// Account salt.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// Stored digest.
    pub fn digest(&self) -> &PasswordDigest {
        &self.digest
    }
}

/// Argon2 cost parameters.
///
/// Defaults follow the `argon2` crate's recommendation (19 MiB, two passes,
/// one lane).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashingParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl PasswordHashingParams {
    /// Build explicit cost parameters.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }
}

impl Default for PasswordHashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Salted credential derivation and verification.
///
/// Pure over its inputs; cloning is cheap and clones share no state.
///
/// # Examples
/// ```
/// use social_backend::domain::{PasswordAuthenticator, PasswordHashingParams};
///
/// let auth = PasswordAuthenticator::new(PasswordHashingParams::new(8, 1, 1)).unwrap();
/// let salt = auth.generate_salt();
/// let digest = auth.hash("foobar", &salt).unwrap();
/// assert!(auth.verify("foobar", &salt, &digest));
/// assert!(!auth.verify("invalid", &salt, &digest));
/// ```
#[derive(Clone)]
pub struct PasswordAuthenticator {
    argon2: Argon2<'static>,
    params: PasswordHashingParams,
}

impl PasswordAuthenticator {
    /// Build an Argon2id authenticator with the given cost parameters.
    pub fn new(params: PasswordHashingParams) -> Result<Self, PasswordHashingError> {
        let argon_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(DIGEST_LEN),
        )
        .map_err(|err| PasswordHashingError::InvalidParams {
            message: err.to_string(),
        })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params),
            params,
        })
    }

    /// Cost parameters in use.
    pub fn params(&self) -> PasswordHashingParams {
        self.params
    }

    /// Produce a fresh salt from the operating system CSPRNG.
    pub fn generate_salt(&self) -> Salt {
        let mut bytes = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Salt(bytes)
    }

    /// Derive the digest for `password` under `salt`.
    pub fn hash(&self, password: &str, salt: &Salt) -> Result<PasswordDigest, PasswordHashingError> {
        let mut output = [0_u8; DIGEST_LEN];
        self.argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut output)
            .map_err(|err| PasswordHashingError::Hash {
                message: err.to_string(),
            })?;
        Ok(PasswordDigest(output))
    }

    /// Recompute the digest and compare it with `expected` in constant time.
    pub fn verify(&self, password: &str, salt: &Salt, expected: &PasswordDigest) -> bool {
        match self.hash(password, salt) {
            Ok(digest) => digest.constant_time_eq(expected),
            Err(err) => {
                error!(error = %err, "failed to derive password digest during verification");
                false
            }
        }
    }

    /// Verify `password` against a stored credential.
    pub fn verify_credential(&self, password: &str, credential: &PasswordCredential) -> bool {
        self.verify(password, credential.salt(), credential.digest())
    }

    /// Generate a salt and derive the matching credential for a new account.
    pub fn derive_credential(
        &self,
        password: &str,
    ) -> Result<PasswordCredential, PasswordHashingError> {
        let salt = self.generate_salt();
        let digest = self.hash(password, &salt)?;
        Ok(PasswordCredential::new(salt, digest))
    }
}

impl fmt::Debug for PasswordAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordAuthenticator")
            .field("algorithm", &"argon2id")
            .field("params", &self.params)
            .finish()
    }
}
