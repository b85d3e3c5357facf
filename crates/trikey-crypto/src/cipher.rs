//! AES-256-CBC with PKCS#7 padding over in-memory buffers
//!
//! Container format (binary):
//! ```text
//! [16 bytes: IV][N × 16 bytes: ciphertext]
//! ```
//!
//! Padding validation is the only corruption check. A wrong key, wrong IV or
//! flipped byte usually breaks the padding, but some corruptions decrypt to a
//! wrong yet validly padded plaintext, which is returned without error.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use trikey_core::{TrikeyError, TrikeyResult};

use crate::keys::{CombinedKey, Iv};
use crate::{BLOCK_SIZE, MIN_CONTAINER_SIZE};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Pad and encrypt `plaintext`, chaining from `iv`.
///
/// Returns the ciphertext body only; see [`seal`] for the full container.
pub fn encrypt(plaintext: &[u8], key: &CombinedKey, iv: &Iv) -> TrikeyResult<Vec<u8>> {
    let encryptor = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| TrikeyError::Crypto(format!("cipher init failed: {e}")))?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt a ciphertext body and strip its padding.
///
/// Fails with `Crypto` when the body is not a non-empty multiple of the block
/// size or when the final block's padding is inconsistent.
pub fn decrypt(body: &[u8], key: &CombinedKey, iv: &Iv) -> TrikeyResult<Vec<u8>> {
    if body.is_empty() || body.len() % BLOCK_SIZE != 0 {
        return Err(TrikeyError::Crypto(format!(
            "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
            body.len()
        )));
    }
    let decryptor = Aes256CbcDec::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| TrikeyError::Crypto(format!("cipher init failed: {e}")))?;
    decryptor.decrypt_padded_vec_mut::<Pkcs7>(body).map_err(|_| {
        TrikeyError::Crypto("decryption failed: invalid padding (wrong key or corrupted data)".into())
    })
}

/// Encrypt and prefix the IV, producing a complete container.
pub fn seal(plaintext: &[u8], key: &CombinedKey, iv: &Iv) -> TrikeyResult<Vec<u8>> {
    let body = encrypt(plaintext, key, iv)?;
    let mut container = Vec::with_capacity(BLOCK_SIZE + body.len());
    container.extend_from_slice(iv);
    container.extend_from_slice(&body);
    Ok(container)
}

/// Split a container into IV and body and decrypt it.
///
/// Containers shorter than two blocks are rejected with `CorruptData` before
/// the cipher is touched.
pub fn open(container: &[u8], key: &CombinedKey) -> TrikeyResult<Vec<u8>> {
    if container.len() < MIN_CONTAINER_SIZE {
        return Err(TrikeyError::CorruptData {
            len: container.len(),
            min: MIN_CONTAINER_SIZE,
        });
    }
    let (iv_bytes, body) = container.split_at(BLOCK_SIZE);
    let mut iv: Iv = [0u8; BLOCK_SIZE];
    iv.copy_from_slice(iv_bytes);
    decrypt(body, key, &iv)
}
