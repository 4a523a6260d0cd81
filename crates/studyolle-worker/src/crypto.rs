use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::util::random_bytes;

const OUTPUT_LEN: usize = 32;
const SALT_LEN: usize = 16;

/// A derived password as stored on the account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPassword {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
    pub iterations: i32,
}

pub fn hash_password(secret: &[u8], salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut out = vec![0u8; OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(secret, salt, iterations.max(1), &mut out);
    out
}

/// Hash a raw password with a fresh random salt.
pub fn encode_password(raw: &str, iterations: u32) -> EncodedPassword {
    let salt = random_bytes(SALT_LEN);
    let iterations = iterations.max(1);
    EncodedPassword {
        hash: hash_password(raw.as_bytes(), &salt, iterations),
        salt,
        iterations: i32::try_from(iterations).unwrap_or(i32::MAX),
    }
}

pub fn verify_password_hash(secret: &[u8], salt: &[u8], expected: &[u8], iterations: u32) -> bool {
    if expected.len() != OUTPUT_LEN {
        return false;
    }

    // Derive and constant-time compare.
    let out = hash_password(secret, salt, iterations);
    subtle::ConstantTimeEq::ct_eq(out.as_slice(), expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_password_verifies_only_the_original() {
        let encoded = encode_password("12345678", 10);
        assert_ne!(encoded.hash, b"12345678".to_vec());
        assert!(verify_password_hash(b"12345678", &encoded.salt, &encoded.hash, 10));
        assert!(!verify_password_hash(b"12345679", &encoded.salt, &encoded.hash, 10));
    }

    #[test]
    fn salts_differ_between_encodings() {
        let a = encode_password("same-password", 5);
        let b = encode_password("same-password", 5);
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }
}
