//! scrypt password hashing shared by account creation and verification.

use super::Error;
use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};
use scrypt::Params;
use subtle::ConstantTimeEq;

/// log2 of the scrypt cost parameter (N = 16384).
pub const SCRYPT_LOG_N: u8 = 14;
pub const SCRYPT_R: u32 = 8;
pub const SCRYPT_P: u32 = 1;
/// Length in bytes of the stored derived key.
pub const HASH_SIZE: usize = 64;
pub const SALT_SIZE: usize = 32;

fn params() -> Result<Params, Error> {
    Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, HASH_SIZE).map_err(|_| Error::Kdf)
}

/// Derive the key for `password` and `salt`.
///
/// # Errors
/// Returns [`Error::Kdf`] if scrypt rejects the parameters.
pub fn derive(password: &[u8], salt: &[u8]) -> Result<Vec<u8>, Error> {
    let mut output = vec![0u8; HASH_SIZE];
    scrypt::scrypt(password, salt, &params()?, &mut output).map_err(|_| Error::Kdf)?;
    Ok(output)
}

/// Hash a new password with a fresh random salt.
///
/// Returns `(hash, salt)`, both standard base64, in the form the user store keeps them.
///
/// # Errors
/// Returns an error if the system RNG or the KDF fails.
pub fn hash_password(password: &str) -> Result<(String, String), Error> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| Error::Configuration(format!("failed to generate salt: {e}")))?;

    let hash = derive(password.as_bytes(), &salt)?;

    Ok((Base64::encode_string(&hash), Base64::encode_string(&salt)))
}

/// Check `password` against a stored base64 hash and salt.
///
/// The derived key is always computed in full and compared in constant time,
/// so the cost does not depend on where a mismatch occurs.
///
/// # Errors
/// Returns [`Error::Encoding`] if the stored values are not valid base64, or
/// [`Error::Kdf`] if key derivation fails.
pub fn verify_password(password: &str, stored_hash: &str, stored_salt: &str) -> Result<bool, Error> {
    let expected = Base64::decode_vec(stored_hash).map_err(|_| Error::Encoding("password hash"))?;
    let salt = Base64::decode_vec(stored_salt).map_err(|_| Error::Encoding("salt"))?;

    let derived = derive(password.as_bytes(), &salt)?;

    Ok(bool::from(derived.as_slice().ct_eq(expected.as_slice())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Record produced by the user store for password "secret".
    const STORED_HASH: &str = "Jy7mfxUKTb2GtL+tFWQ6iXHh14SSMU7OhaAtZhrkaIUZPFhxi6CYryTIRAN2W7BCnfpWUxsVcLcqAEFcQXYzng==";
    const STORED_SALT: &str = "cU1rR2JBeWJTVExRQWhCQVhNN3p1aVNVdkluMkZ4VEtGb05FU3prZFRPUT0=";

    #[test]
    fn verifies_user_store_record() {
        assert!(verify_password("secret", STORED_HASH, STORED_SALT).unwrap());
    }

    #[test]
    fn rejects_wrong_password() {
        assert!(!verify_password("wrong", STORED_HASH, STORED_SALT).unwrap());
        assert!(!verify_password("", STORED_HASH, STORED_SALT).unwrap());
    }

    #[test]
    fn single_byte_difference_fails_at_any_position() {
        let (hash, salt) = hash_password("abcd").unwrap();
        assert!(verify_password("abcd", &hash, &salt).unwrap());

        for candidate in ["xbcd", "axcd", "abxd", "abcx", "abc", "abcde"] {
            assert!(
                !verify_password(candidate, &hash, &salt).unwrap(),
                "{candidate} should not verify"
            );
        }
    }

    #[test]
    fn truncated_stored_hash_never_matches() {
        let (hash, salt) = hash_password("secret").unwrap();
        let full = Base64::decode_vec(&hash).unwrap();
        let prefix = Base64::encode_string(&full[..32]);

        assert!(!verify_password("secret", &prefix, &salt).unwrap());
    }

    #[test]
    fn salts_are_unique() {
        let (hash_a, salt_a) = hash_password("secret").unwrap();
        let (hash_b, salt_b) = hash_password("secret").unwrap();
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
        assert_eq!(Base64::decode_vec(&hash_a).unwrap().len(), HASH_SIZE);
    }

    #[test]
    fn invalid_encoding_is_an_error() {
        assert!(matches!(
            verify_password("secret", "not base64!", STORED_SALT),
            Err(Error::Encoding("password hash"))
        ));
        assert!(matches!(
            verify_password("secret", STORED_HASH, "%%%"),
            Err(Error::Encoding("salt"))
        ));
    }
}
