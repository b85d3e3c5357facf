//! File-level encrypt/decrypt operations
//!
//! These are the operations front-ends call with plain paths and hex strings.
//! Each one either completes or returns an error before leaving a new output
//! behind; none of them print or retry.

use std::path::{Path, PathBuf};

use rand::{CryptoRng, RngCore};
use trikey_core::{TrikeyError, TrikeyResult};

use crate::keys::{combine_keys, KeyFragment, KeyMaterial, KeyMaterialGenerator};
use crate::{cipher, file_io, hex_codec, sidecar};

/// Result of a successful [`encrypt_file`]
#[derive(Debug)]
pub struct EncryptReport {
    /// Ciphertext container path
    pub output: PathBuf,
    /// Key file path
    pub sidecar: PathBuf,
    pub plaintext_len: usize,
    pub ciphertext_len: usize,
    /// The generated fragments and IV, for display to the user
    pub material: KeyMaterial,
}

/// Result of a successful [`decrypt_file`]
#[derive(Debug, Clone)]
pub struct DecryptReport {
    pub output: PathBuf,
    pub ciphertext_len: usize,
    pub plaintext_len: usize,
}

/// Encrypt `input` into `output` with fresh key material and write the key
/// file at `output` + `sidecar_suffix`.
///
/// Both destinations are overwritten without warning. If the key file cannot
/// be written the ciphertext is removed again, so on error neither file is
/// left behind. `output` and the key file must both differ from `input` and
/// from each other; that is checked before anything is generated or written.
pub fn encrypt_file<R: RngCore + CryptoRng>(
    generator: &mut KeyMaterialGenerator<R>,
    input: &Path,
    output: &Path,
    sidecar_suffix: &str,
) -> TrikeyResult<EncryptReport> {
    if !input.exists() {
        return Err(TrikeyError::FileNotFound(input.to_path_buf()));
    }
    let sidecar_path = sidecar::sidecar_path(output, sidecar_suffix);
    check_destinations(input, output, &sidecar_path)?;

    let material = generator.generate()?;
    let key = material.combined();

    let plaintext = file_io::read_plaintext(input)?;
    let container = cipher::seal(&plaintext, &key, &material.iv)?;

    file_io::write_whole(output, &container)?;
    if let Err(e) = sidecar::write(&sidecar_path, &material) {
        if let Err(cleanup) = std::fs::remove_file(output) {
            tracing::warn!(
                path = %output.display(),
                error = %cleanup,
                "could not remove ciphertext after key file write failed"
            );
        }
        return Err(e);
    }

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        sidecar = %sidecar_path.display(),
        bytes = plaintext.len(),
        "encrypted file"
    );

    Ok(EncryptReport {
        output: output.to_path_buf(),
        sidecar: sidecar_path,
        plaintext_len: plaintext.len(),
        ciphertext_len: container.len(),
        material,
    })
}

/// Reject destination layouts where one write would clobber the input or the
/// other output.
fn check_destinations(input: &Path, output: &Path, sidecar: &Path) -> TrikeyResult<()> {
    let input = resolve(input);
    let output_resolved = resolve(output);
    let sidecar_resolved = resolve(sidecar);

    if output_resolved == sidecar_resolved {
        return Err(TrikeyError::InvalidArgument(format!(
            "key file would overwrite the ciphertext at {} (empty key-file suffix?)",
            output.display()
        )));
    }
    if output_resolved == input {
        return Err(TrikeyError::InvalidArgument(format!(
            "output {} is the input file",
            output.display()
        )));
    }
    if sidecar_resolved == input {
        return Err(TrikeyError::InvalidArgument(format!(
            "key file {} is the input file",
            sidecar.display()
        )));
    }
    Ok(())
}

/// Canonical form of `path`; for a path that does not exist yet, its
/// canonical parent joined with the file name.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    parent
        .canonicalize()
        .map(|p| p.join(name))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Decrypt `input` into `output` using hex-encoded key fragments.
///
/// All three fragments are validated before any file is touched. key3 must
/// be well-formed but does not influence the cipher key (see
/// [`combine_keys`]).
pub fn decrypt_file(
    input: &Path,
    output: &Path,
    key1_hex: &str,
    key2_hex: &str,
    key3_hex: &str,
) -> TrikeyResult<DecryptReport> {
    let key1 = KeyFragment::from_bytes(hex_codec::decode_block(key1_hex)?);
    let key2 = KeyFragment::from_bytes(hex_codec::decode_block(key2_hex)?);
    let key3 = KeyFragment::from_bytes(hex_codec::decode_block(key3_hex)?);
    decrypt_file_with_keys(input, output, &key1, &key2, &key3)
}

/// Decrypt `input` into `output` with already-decoded fragments.
///
/// A wrong key1/key2 usually fails padding validation, but can also yield
/// garbage that happens to be validly padded; that output is written as-is.
pub fn decrypt_file_with_keys(
    input: &Path,
    output: &Path,
    key1: &KeyFragment,
    key2: &KeyFragment,
    key3: &KeyFragment,
) -> TrikeyResult<DecryptReport> {
    let container = file_io::read_whole(input)?;
    let key = combine_keys(key1, key2, key3);
    let plaintext = cipher::open(&container, &key)?;

    file_io::write_whole(output, &plaintext)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        bytes = plaintext.len(),
        "decrypted file"
    );

    Ok(DecryptReport {
        output: output.to_path_buf(),
        ciphertext_len: container.len(),
        plaintext_len: plaintext.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_SIDECAR_SUFFIX, MIN_CONTAINER_SIZE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn seeded() -> KeyMaterialGenerator<StdRng> {
        KeyMaterialGenerator::new(StdRng::seed_from_u64(42))
    }

    fn hex_keys(material: &KeyMaterial) -> (String, String, String) {
        (
            hex_codec::encode(material.key1.as_bytes()),
            hex_codec::encode(material.key2.as_bytes()),
            hex_codec::encode(material.key3.as_bytes()),
        )
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("hello.txt");
        let enc = tmp.path().join("hello.enc");
        let dec = tmp.path().join("hello.out");
        std::fs::write(&src, b"Hello, world!").unwrap();

        let report = encrypt_file(&mut seeded(), &src, &enc, DEFAULT_SIDECAR_SUFFIX).unwrap();
        assert_eq!(report.plaintext_len, 13);
        assert_eq!(report.ciphertext_len, MIN_CONTAINER_SIZE);
        assert_eq!(std::fs::read(&enc).unwrap().len(), 32);
        assert_eq!(report.sidecar, tmp.path().join("hello.enc.key.txt"));
        assert!(report.sidecar.exists());

        let (k1, k2, k3) = hex_keys(&report.material);
        let out = decrypt_file(&enc, &dec, &k1, &k2, &k3).unwrap();
        assert_eq!(out.plaintext_len, 13);
        assert_eq!(std::fs::read(&dec).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_container_starts_with_generated_iv() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("in");
        let enc = tmp.path().join("out");
        std::fs::write(&src, vec![7u8; 100]).unwrap();

        let report = encrypt_file(&mut seeded(), &src, &enc, ".k").unwrap();
        let container = std::fs::read(&enc).unwrap();
        assert_eq!(&container[..16], &report.material.iv);
        assert_eq!(container.len(), 16 + 112);
    }

    #[test]
    fn test_encrypt_missing_input_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let enc = tmp.path().join("out.enc");

        let err = encrypt_file(&mut seeded(), &tmp.path().join("nope"), &enc, ".k").unwrap_err();
        assert!(matches!(err, TrikeyError::FileNotFound(_)));
        assert!(!enc.exists());
        assert!(!tmp.path().join("out.enc.k").exists());
    }

    #[test]
    fn test_encrypt_empty_input_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("empty");
        let enc = tmp.path().join("out.enc");
        std::fs::write(&src, b"").unwrap();

        let err = encrypt_file(&mut seeded(), &src, &enc, ".k").unwrap_err();
        assert!(matches!(err, TrikeyError::EmptyFile(_)));
        assert!(!enc.exists());
    }

    #[test]
    fn test_encrypt_removes_ciphertext_when_key_file_fails() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("in.txt");
        let enc = tmp.path().join("out.enc");
        std::fs::write(&src, b"payload").unwrap();
        // the key file path is an existing directory, so writing it fails
        std::fs::create_dir(tmp.path().join("out.enc.k")).unwrap();

        let err = encrypt_file(&mut seeded(), &src, &enc, ".k").unwrap_err();
        assert!(matches!(err, TrikeyError::Io(_)));
        assert!(!enc.exists(), "ciphertext must not survive a failed key write");
    }

    #[test]
    fn test_encrypt_empty_suffix_is_rejected_before_writing() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("in.txt");
        let enc = tmp.path().join("in.enc");
        std::fs::write(&src, b"Hello, world!").unwrap();

        let err = encrypt_file(&mut seeded(), &src, &enc, "").unwrap_err();
        assert!(matches!(err, TrikeyError::InvalidArgument(_)));
        assert!(!enc.exists());
        assert_eq!(std::fs::read(&src).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_encrypt_in_place_keeps_input() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("doc.txt");
        std::fs::write(&src, b"only copy").unwrap();
        // a failing key file write must not get the chance to clean up the input
        std::fs::create_dir(tmp.path().join("doc.txt.key.txt")).unwrap();

        let err = encrypt_file(&mut seeded(), &src, &src, DEFAULT_SIDECAR_SUFFIX).unwrap_err();
        assert!(matches!(err, TrikeyError::InvalidArgument(_)));
        assert_eq!(std::fs::read(&src).unwrap(), b"only copy");

        // same file reached through a different spelling
        let dotted = tmp.path().join(".").join("doc.txt");
        let err = encrypt_file(&mut seeded(), &src, &dotted, ".k").unwrap_err();
        assert!(matches!(err, TrikeyError::InvalidArgument(_)));
        assert_eq!(std::fs::read(&src).unwrap(), b"only copy");
    }

    #[test]
    fn test_encrypt_key_file_over_input_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("doc.txt");
        std::fs::write(&src, b"only copy").unwrap();

        let err =
            encrypt_file(&mut seeded(), &src, &tmp.path().join("doc"), ".txt").unwrap_err();
        assert!(matches!(err, TrikeyError::InvalidArgument(_)));
        assert_eq!(std::fs::read(&src).unwrap(), b"only copy");
        assert!(!tmp.path().join("doc").exists());
    }

    #[test]
    fn test_decrypt_with_other_key3_succeeds() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("in.txt");
        let enc = tmp.path().join("in.enc");
        let dec = tmp.path().join("in.dec");
        std::fs::write(&src, b"key3 is decorative").unwrap();

        let report = encrypt_file(&mut seeded(), &src, &enc, ".k").unwrap();
        let (k1, k2, _) = hex_keys(&report.material);
        let other_k3 = "00".repeat(16);

        decrypt_file(&enc, &dec, &k1, &k2, &other_k3).unwrap();
        assert_eq!(std::fs::read(&dec).unwrap(), b"key3 is decorative");
    }

    #[test]
    fn test_decrypt_with_other_key1_fails_or_differs() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("in.txt");
        let enc = tmp.path().join("in.enc");
        let dec = tmp.path().join("in.dec");
        std::fs::write(&src, b"Hello, world!").unwrap();

        let report = encrypt_file(&mut seeded(), &src, &enc, ".k").unwrap();
        let (_, k2, k3) = hex_keys(&report.material);
        let wrong_k1 = "5A".repeat(16);

        match decrypt_file(&enc, &dec, &wrong_k1, &k2, &k3) {
            Err(e) => assert!(matches!(e, TrikeyError::Crypto(_))),
            Ok(_) => assert_ne!(std::fs::read(&dec).unwrap(), b"Hello, world!"),
        }
    }

    #[test]
    fn test_decrypt_bad_hex_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let dec = tmp.path().join("out");
        let good = "00".repeat(16);

        // input does not even exist: hex validation must come first
        let err = decrypt_file(&tmp.path().join("missing"), &dec, "zz", &good, &good).unwrap_err();
        assert!(matches!(err, TrikeyError::InvalidHex(_)));
        let err = decrypt_file(&tmp.path().join("missing"), &dec, &good, &good, &"00".repeat(15))
            .unwrap_err();
        assert!(matches!(err, TrikeyError::InvalidHex(_)));
        assert!(!dec.exists());
    }

    #[test]
    fn test_decrypt_short_container() {
        let tmp = TempDir::new().unwrap();
        let enc = tmp.path().join("short.enc");
        let dec = tmp.path().join("short.out");
        let good = "00".repeat(16);

        for len in [0usize, 8, 16] {
            std::fs::write(&enc, vec![0u8; len]).unwrap();
            let err = decrypt_file(&enc, &dec, &good, &good, &good).unwrap_err();
            assert!(matches!(err, TrikeyError::CorruptData { .. }));
        }
        assert!(!dec.exists());
    }

    #[test]
    fn test_decrypt_missing_input() {
        let tmp = TempDir::new().unwrap();
        let good = "00".repeat(16);
        let err = decrypt_file(
            &tmp.path().join("missing.enc"),
            &tmp.path().join("out"),
            &good,
            &good,
            &good,
        )
        .unwrap_err();
        assert!(matches!(err, TrikeyError::FileNotFound(_)));
    }
}
