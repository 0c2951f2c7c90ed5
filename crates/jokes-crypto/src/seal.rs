use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use anyhow::{Result, anyhow};

const NONCE_LEN: usize = 12;

/// Encrypt and authenticate `plaintext` with AES-256-GCM.
/// Returns `nonce || ciphertext`.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a `nonce || ciphertext` blob produced by [`seal`].
/// Fails on truncation, tampering or the wrong key.
pub fn open(key: &[u8; 32], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return Err(anyhow!("Sealed payload too short"));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| anyhow!("Decryption failed: {}", e))?;

    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_key;

    #[test]
    fn sealed_payload_opens_with_same_key() {
        let key = derive_key("secret", "test");
        let payload = b"{\"userId\":\"abc\"}";

        let sealed = seal(&key, payload).unwrap();
        assert!(!sealed.windows(payload.len()).any(|w| w == payload));

        assert_eq!(open(&key, &sealed).unwrap(), payload);
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&derive_key("one", "test"), b"payload").unwrap();
        assert!(open(&derive_key("two", "test"), &sealed).is_err());
    }

    #[test]
    fn tampered_or_truncated_payload_fails() {
        let key = derive_key("secret", "test");
        let mut sealed = seal(&key, b"payload").unwrap();

        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(open(&key, &sealed).is_err());

        assert!(open(&key, &sealed[..5]).is_err());
    }
}
