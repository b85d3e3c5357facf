//! Key material: random fragment generation and fragment combination

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use trikey_core::{TrikeyError, TrikeyResult};
use zeroize::{Zeroize, Zeroizing};

use crate::{BLOCK_SIZE, KEY_SIZE};

/// Initialization vector. Not secret: it is stored in clear as the container prefix.
pub type Iv = [u8; BLOCK_SIZE];

/// One 128-bit key fragment. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyFragment {
    bytes: [u8; BLOCK_SIZE],
}

impl KeyFragment {
    pub fn from_bytes(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.bytes
    }
}

impl Drop for KeyFragment {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for KeyFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFragment")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// The 256-bit AES key handed to the cipher. Zeroized on drop.
#[derive(Clone)]
pub struct CombinedKey {
    bytes: [u8; KEY_SIZE],
}

impl CombinedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for CombinedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for CombinedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Everything generated for one encryption: three fragments and the IV.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub key1: KeyFragment,
    pub key2: KeyFragment,
    pub key3: KeyFragment,
    pub iv: Iv,
}

impl KeyMaterial {
    /// The cipher key these fragments produce (see [`combine_keys`]).
    pub fn combined(&self) -> CombinedKey {
        combine_keys(&self.key1, &self.key2, &self.key3)
    }
}

/// Produces fresh key material from a cryptographically secure RNG.
///
/// The RNG is owned by the generator so callers (and tests) choose the source;
/// [`KeyMaterialGenerator::os`] uses the operating system's entropy source.
pub struct KeyMaterialGenerator<R> {
    rng: R,
}

impl KeyMaterialGenerator<OsRng> {
    pub fn os() -> Self {
        Self::new(OsRng)
    }
}

impl Default for KeyMaterialGenerator<OsRng> {
    fn default() -> Self {
        Self::os()
    }
}

impl<R: RngCore + CryptoRng> KeyMaterialGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw key1, key2, key3 and the IV, in that order.
    ///
    /// An RNG failure is fatal for the operation and is not retried.
    pub fn generate(&mut self) -> TrikeyResult<KeyMaterial> {
        let key1 = KeyFragment::from_bytes(self.block()?);
        let key2 = KeyFragment::from_bytes(self.block()?);
        let key3 = KeyFragment::from_bytes(self.block()?);
        let iv = self.block()?;
        tracing::debug!("generated key material (3 fragments + IV)");
        Ok(KeyMaterial {
            key1,
            key2,
            key3,
            iv,
        })
    }

    fn block(&mut self) -> TrikeyResult<[u8; BLOCK_SIZE]> {
        let mut block = [0u8; BLOCK_SIZE];
        self.rng
            .try_fill_bytes(&mut block)
            .map_err(|e| TrikeyError::EntropySource(e.to_string()))?;
        Ok(block)
    }
}

/// Fold three fragments into the 256-bit cipher key.
///
/// The fragments are concatenated as `key1 || key2 || key3` (48 bytes) and the
/// first 32 bytes are kept. With 16-byte fragments this means **only key1 and
/// key2 determine the key; key3 never reaches the cipher.** key3 is still
/// generated, written to the key file and asked for on decryption. Existing
/// ciphertext/key-file pairs depend on this exact derivation, so it must not
/// be changed to mix in key3.
pub fn combine_keys(key1: &KeyFragment, key2: &KeyFragment, key3: &KeyFragment) -> CombinedKey {
    let mut combined = Zeroizing::new([0u8; 3 * BLOCK_SIZE]);
    combined[..BLOCK_SIZE].copy_from_slice(key1.as_bytes());
    combined[BLOCK_SIZE..2 * BLOCK_SIZE].copy_from_slice(key2.as_bytes());
    combined[2 * BLOCK_SIZE..].copy_from_slice(key3.as_bytes());

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&combined[..KEY_SIZE]);
    CombinedKey::from_bytes(key)
}
