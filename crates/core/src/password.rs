//! Password hashing for the credential store.
//!
//! Hashes are PBKDF2-HMAC-SHA256 encoded as
//! `pbkdf2-sha256.<iterations>.<salt>.<hash>`, with salt and hash in unpadded
//! standard base64. The encoding carries its own iteration count so that the
//! default can be raised without invalidating stored entries.
//!
//! The separator is `.` rather than `$` because entries are pasted into `.env`
//! files, where an unquoted `$name` is expanded as a variable.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const SEPARATOR: char = '.';
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Iteration count used by [`hash_password`].
pub const DEFAULT_ITERATIONS: u32 = 600_000;

struct EncodedHash {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl EncodedHash {
    fn parse(encoded: &str) -> Option<Self> {
        let mut parts = encoded.split(SEPARATOR);
        if parts.next()? != SCHEME {
            return None;
        }
        let iterations = parts.next()?.parse::<u32>().ok().filter(|n| *n > 0)?;
        let salt = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
        let hash = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
        if parts.next().is_some() || salt.is_empty() || hash.len() != HASH_LEN {
            return None;
        }
        Some(Self {
            iterations,
            salt,
            hash,
        })
    }
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    out
}

/// Hash a password with a fresh random salt and [`DEFAULT_ITERATIONS`].
pub fn hash_password(password: &str) -> String {
    hash_password_with_iterations(password, DEFAULT_ITERATIONS)
}

/// Hash a password with an explicit iteration count.
///
/// A count of zero is raised to one.
pub fn hash_password_with_iterations(password: &str, iterations: u32) -> String {
    let iterations = iterations.max(1);
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let hash = derive(password.as_bytes(), &salt, iterations);
    encode(iterations, &salt, &hash)
}

fn encode(iterations: u32, salt: &[u8], hash: &[u8]) -> String {
    format!(
        "{SCHEME}{SEPARATOR}{iterations}{SEPARATOR}{}{SEPARATOR}{}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    )
}

/// A well-formed hash that no password matches.
///
/// Verifying against it costs the same as verifying against a real hash with the
/// same iteration count, so unknown users can be checked at the same price as known ones.
pub fn unmatchable_hash(iterations: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    // An all-zero PBKDF2 output is not reachable in practice.
    encode(iterations.max(1), &salt, &[0u8; HASH_LEN])
}

/// Iteration count recorded in an encoded hash.
pub fn iterations_of(encoded: &str) -> Option<u32> {
    EncodedHash::parse(encoded).map(|h| h.iterations)
}

/// Check a password against an encoded hash in constant time.
///
/// Malformed encodings never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Some(parsed) = EncodedHash::parse(encoded) else {
        return false;
    };
    let computed = derive(password.as_bytes(), &parsed.salt, parsed.iterations);
    computed.as_slice().ct_eq(parsed.hash.as_slice()).into()
}

pub fn is_well_formed(encoded: &str) -> bool {
    EncodedHash::parse(encoded).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let encoded = hash_password_with_iterations("correct horse", 1_000);
        assert!(encoded.starts_with("pbkdf2-sha256.1000."));
        assert!(verify_password("correct horse", &encoded));
        assert!(!verify_password("battery staple", &encoded));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password_with_iterations("same", 1_000);
        let b = hash_password_with_iterations("same", 1_000);
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        for bad in [
            "",
            "plaintext",
            "bcrypt.10.abc.def",
            "pbkdf2-sha256.0.c2FsdA.aGFzaA",
            "pbkdf2-sha256.1000.c2FsdA.dG9vLXNob3J0",
            "pbkdf2-sha256.1000.!!!.aGFzaA",
            "pbkdf2-sha256$1000$c2FsdA$aGFzaA",
        ] {
            assert!(!is_well_formed(bad), "{bad} should be malformed");
            assert!(!verify_password("anything", bad));
        }
    }

    #[test]
    fn trailing_segments_are_rejected() {
        let encoded = hash_password_with_iterations("pw", 1_000);
        assert!(is_well_formed(&encoded));
        assert!(!is_well_formed(&format!("{encoded}.extra")));
    }

    #[test]
    fn unmatchable_hash_is_well_formed_and_rejects_everything() {
        let dummy = unmatchable_hash(1_234);
        assert!(is_well_formed(&dummy));
        assert_eq!(iterations_of(&dummy), Some(1_234));
        for candidate in ["", "password", "correct horse"] {
            assert!(!verify_password(candidate, &dummy));
        }
    }

    #[test]
    fn encoded_hash_has_no_dollar_signs() {
        let encoded = hash_password_with_iterations("pw", 1_000);
        assert!(!encoded.contains('$'), "{encoded}");
    }
}
