//! trikey-crypto: single-file symmetric encryption
//!
//! Cipher: AES-256 in CBC mode with PKCS#7 padding.
//!
//! Pipeline: generate key material → combine fragments → encrypt → write container + key file
//!
//! Key material:
//! ```text
//! key1, key2, key3, iv   (16 random bytes each, from an injected CSPRNG)
//! CombinedKey = (key1 || key2 || key3)[..32]     ← key3 never reaches the cipher
//! ```
//!
//! Ciphertext container (binary, offset-based, no magic/version/tag):
//! ```text
//! [16 bytes: IV][N × 16 bytes: AES-256-CBC output, PKCS#7 padded]
//! ```
//!
//! There is no integrity tag: a wrong key or corrupted byte is only detected
//! when it happens to break the padding.

pub mod cipher;
pub mod file_io;
pub mod hex_codec;
pub mod keys;
pub mod pipeline;
pub mod sidecar;

pub use cipher::{decrypt, encrypt, open, seal};
pub use keys::{combine_keys, CombinedKey, KeyFragment, KeyMaterial, KeyMaterialGenerator};
pub use pipeline::{decrypt_file, decrypt_file_with_keys, encrypt_file, DecryptReport, EncryptReport};

/// AES block size; also the size of every key fragment and the IV
pub const BLOCK_SIZE: usize = 16;

/// AES-256 key size (the cipher's maximum key length)
pub const KEY_SIZE: usize = 32;

/// Smallest well-formed container: IV plus one padded block
pub const MIN_CONTAINER_SIZE: usize = BLOCK_SIZE + BLOCK_SIZE;

/// Default suffix for the key file written next to the ciphertext
pub const DEFAULT_SIDECAR_SUFFIX: &str = ".key.txt";
