//! ECDSA signature operations over the STARK curve

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use stark_primitives::Felt;
use starknet_crypto::FieldElement;
use zeroize::Zeroize;

use crate::CryptoError;

/// ECDSA signature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component
    pub r: Felt,
    /// s component
    pub s: Felt,
}

impl Signature {
    /// Create signature from r, s components
    pub fn new(r: Felt, s: Felt) -> Self {
        Signature { r, s }
    }

    /// `[r, s]` as felts, the form carried in a transaction
    pub fn to_vec(&self) -> Vec<Felt> {
        vec![self.r, self.s]
    }

    /// `[r, s]` as wire hex strings
    pub fn to_hex_strings(&self) -> Vec<String> {
        vec![self.r.to_hex(), self.s.to_hex()]
    }
}

/// Private key on the STARK curve
///
/// Note: Clone is intentionally not implemented to prevent accidental key duplication.
pub struct SigningKey {
    secret: FieldElement,
}

impl SigningKey {
    /// Generate a random key
    pub fn new_random() -> Self {
        let mut bytes = [0u8; 32];
        loop {
            OsRng.fill_bytes(&mut bytes);
            // below 2^251, which is under the curve order
            bytes[0] &= 0x07;
            if let Ok(secret) = FieldElement::from_bytes_be(&bytes) {
                if secret != FieldElement::ZERO {
                    bytes.zeroize();
                    return SigningKey { secret };
                }
            }
        }
    }

    /// Create from a secret scalar
    pub fn from_secret(secret: Felt) -> Result<Self, CryptoError> {
        if secret.is_zero() {
            return Err(CryptoError::InvalidPrivateKey);
        }
        Ok(SigningKey {
            secret: secret.into(),
        })
    }

    /// Parse a hex private key (with or without "0x")
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let digits = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        if digits.is_empty() || digits.len() > 64 {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let mut padded = format!("{:0>64}", digits);
        let decoded = hex::decode(&padded);
        padded.zeroize();
        let mut bytes = decoded.map_err(|_| CryptoError::InvalidPrivateKey)?;

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let secret = FieldElement::from_bytes_be(&key);
        key.zeroize();
        let secret = secret.map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_secret(Felt::from(secret))
    }

    /// Secret scalar as hex, for export to a keystore or terminal
    pub fn secret_hex(&self) -> String {
        Felt::from(self.secret).to_hex()
    }

    /// Derive the public key (x coordinate)
    pub fn public_key(&self) -> Felt {
        Felt::from(starknet_crypto::get_public_key(&self.secret))
    }

    /// Sign a message hash with a deterministic RFC 6979 nonce
    pub fn sign(&self, hash: &Felt) -> Result<Signature, CryptoError> {
        let message = hash.as_field_element();
        let k = starknet_crypto::rfc6979_generate_k(message, &self.secret, None);
        let signature = starknet_crypto::sign(&self.secret, message, &k)
            .map_err(|e| CryptoError::SigningFailed(format!("{:?}", e)))?;
        Ok(Signature {
            r: Felt::from(signature.r),
            s: Felt::from(signature.s),
        })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.secret = FieldElement::ZERO;
    }
}

/// Verify a signature against a public key
pub fn verify(public_key: &Felt, hash: &Felt, signature: &Signature) -> Result<bool, CryptoError> {
    starknet_crypto::verify(
        public_key.as_field_element(),
        hash.as_field_element(),
        signature.r.as_field_element(),
        signature.s.as_field_element(),
    )
    .map_err(|e| CryptoError::VerificationFailed(format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str =
        "0x0139fe4d6f02e666e86a6f58e65060f115cd3c185bd9e98bd829636931458f79";

    // ==================== Key handling ====================

    #[test]
    fn test_public_key_of_one_is_generator() {
        let key = SigningKey::from_secret(Felt::ONE).unwrap();
        assert_eq!(
            key.public_key(),
            Felt::from_hex("0x1ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca")
                .unwrap()
        );
    }

    #[test]
    fn test_from_hex_with_and_without_prefix() {
        let a = SigningKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let b = SigningKey::from_hex(&TEST_PRIVATE_KEY[2..]).unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_from_hex_rejects_invalid() {
        assert!(SigningKey::from_hex("0xnothex").is_err());
        assert!(SigningKey::from_hex("").is_err());
        assert!(SigningKey::from_hex("0x0").is_err());
        assert!(SigningKey::from_hex(&format!("0x{}", "1".repeat(65))).is_err());
    }

    #[test]
    fn test_secret_hex_round_trip() {
        let key = SigningKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let again = SigningKey::from_hex(&key.secret_hex()).unwrap();
        assert_eq!(key.public_key(), again.public_key());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = SigningKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("139fe4d6f02e666e86a6f58e65060f115cd3c185bd9e98bd829636931458f79"));
        assert!(debug.contains("public_key"));
    }

    #[test]
    fn test_random_keys_differ() {
        let a = SigningKey::new_random();
        let b = SigningKey::new_random();
        assert_ne!(a.public_key(), b.public_key());
    }

    // ==================== Signing ====================

    #[test]
    fn test_sign_and_verify() {
        let key = SigningKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let hash = Felt::from_hex("0x6fea80189363a786037ed3e7ba546dad0ef7de49fccae0e31eb658b7dd4ea76")
            .unwrap();
        let signature = key.sign(&hash).unwrap();
        assert!(verify(&key.public_key(), &hash, &signature).unwrap());
    }

    #[test]
    fn test_sign_is_deterministic() {
        let key = SigningKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let hash = Felt::from(12345u64);
        assert_eq!(key.sign(&hash).unwrap(), key.sign(&hash).unwrap());
    }

    #[test]
    fn test_verify_wrong_hash() {
        let key = SigningKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let signature = key.sign(&Felt::from(1u64)).unwrap();
        assert!(!verify(&key.public_key(), &Felt::from(2u64), &signature).unwrap_or(false));
    }

    #[test]
    fn test_signature_hex_strings() {
        let signature = Signature::new(Felt::from(0xau64), Felt::from(0xbu64));
        assert_eq!(signature.to_hex_strings(), vec!["0xa", "0xb"]);
        assert_eq!(signature.to_vec(), vec![Felt::from(0xau64), Felt::from(0xbu64)]);
    }
}
