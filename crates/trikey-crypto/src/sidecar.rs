//! Key file written next to each ciphertext
//!
//! Format (text, one field per line, fixed order):
//! ```text
//! Key1 (HEX): <32 hex chars>
//! Key2 (HEX): <32 hex chars>
//! Key3 (HEX): <32 hex chars>
//! IV   (HEX): <32 hex chars>
//! ```
//!
//! Labels and spacing match the files the tool has always produced.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use trikey_core::{TrikeyError, TrikeyResult};
use zeroize::Zeroizing;

use crate::file_io;
use crate::hex_codec;
use crate::keys::{KeyFragment, KeyMaterial};
use crate::BLOCK_SIZE;

/// Path of the key file for a ciphertext at `output`: the output path with `suffix` appended.
pub fn sidecar_path(output: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Render the four-line record.
pub fn render(material: &KeyMaterial) -> Zeroizing<String> {
    Zeroizing::new(format!(
        "Key1 (HEX): {}\nKey2 (HEX): {}\nKey3 (HEX): {}\nIV   (HEX): {}\n",
        hex_codec::encode(material.key1.as_bytes()),
        hex_codec::encode(material.key2.as_bytes()),
        hex_codec::encode(material.key3.as_bytes()),
        hex_codec::encode(&material.iv),
    ))
}

/// Write the key file at `path`, silently replacing any existing file.
pub fn write(path: &Path, material: &KeyMaterial) -> TrikeyResult<()> {
    let record = render(material);
    file_io::write_whole(path, record.as_bytes())
}

/// Parse a key file's contents.
///
/// Lines may come in any order and blank lines are ignored, but each of
/// Key1, Key2, Key3 and IV must appear exactly once.
pub fn parse(text: &str) -> TrikeyResult<KeyMaterial> {
    let mut fields: [Option<[u8; BLOCK_SIZE]>; 4] = [None; 4];

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lineno = idx + 1;
        let (label, value) = line
            .split_once(':')
            .ok_or_else(|| TrikeyError::Sidecar(format!("line {lineno}: missing ':'")))?;

        let slot = match label.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["Key1", "(HEX)"] => 0,
            ["Key2", "(HEX)"] => 1,
            ["Key3", "(HEX)"] => 2,
            ["IV", "(HEX)"] => 3,
            _ => {
                return Err(TrikeyError::Sidecar(format!(
                    "line {lineno}: unknown label '{}'",
                    label.trim()
                )))
            }
        };
        if fields[slot].is_some() {
            return Err(TrikeyError::Sidecar(format!(
                "line {lineno}: duplicate '{}' entry",
                label.trim()
            )));
        }
        fields[slot] = Some(hex_codec::decode_block(value)?);
    }

    let [Some(key1), Some(key2), Some(key3), Some(iv)] = fields else {
        return Err(TrikeyError::Sidecar(
            "expected Key1, Key2, Key3 and IV entries".into(),
        ));
    };

    Ok(KeyMaterial {
        key1: KeyFragment::from_bytes(key1),
        key2: KeyFragment::from_bytes(key2),
        key3: KeyFragment::from_bytes(key3),
        iv,
    })
}

/// Read and parse the key file at `path`.
pub fn read(path: &Path) -> TrikeyResult<KeyMaterial> {
    let raw = Zeroizing::new(file_io::read_whole(path)?);
    let text = std::str::from_utf8(&raw)
        .map_err(|e| TrikeyError::Sidecar(format!("{}: not UTF-8: {e}", path.display())))?;
    parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixed_material() -> KeyMaterial {
        KeyMaterial {
            key1: KeyFragment::from_bytes([0x01; BLOCK_SIZE]),
            key2: KeyFragment::from_bytes([0xAB; BLOCK_SIZE]),
            key3: KeyFragment::from_bytes([0xFF; BLOCK_SIZE]),
            iv: [0x10; BLOCK_SIZE],
        }
    }

    #[test]
    fn test_render_exact_format() {
        let rendered = render(&fixed_material());
        let expected = format!(
            "Key1 (HEX): {}\nKey2 (HEX): {}\nKey3 (HEX): {}\nIV   (HEX): {}\n",
            "01".repeat(16),
            "AB".repeat(16),
            "FF".repeat(16),
            "10".repeat(16),
        );
        assert_eq!(rendered.as_str(), expected);
    }

    #[test]
    fn test_write_then_decode_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.bin.key.txt");
        let material = fixed_material();

        write(&path, &material).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let values: Vec<&str> = text
            .lines()
            .map(|l| l.split_once(": ").unwrap().1)
            .collect();

        assert_eq!(values.len(), 4);
        assert_eq!(&hex_codec::decode_block(values[0]).unwrap(), material.key1.as_bytes());
        assert_eq!(&hex_codec::decode_block(values[1]).unwrap(), material.key2.as_bytes());
        assert_eq!(&hex_codec::decode_block(values[2]).unwrap(), material.key3.as_bytes());
        assert_eq!(hex_codec::decode_block(values[3]).unwrap(), material.iv);
    }

    #[test]
    fn test_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keys.txt");
        let material = fixed_material();

        write(&path, &material).unwrap();
        let parsed = read(&path).unwrap();

        assert_eq!(parsed.key1, material.key1);
        assert_eq!(parsed.key2, material.key2);
        assert_eq!(parsed.key3, material.key3);
        assert_eq!(parsed.iv, material.iv);
    }

    #[test]
    fn test_parse_lenient_layout() {
        let text = format!(
            "\nIV (HEX): {}\r\nKey3 (HEX):{}\nkey-less line?\n",
            "10".repeat(16),
            "ff".repeat(16)
        );
        // a line without ':' is an error even when other lines are fine
        assert!(matches!(parse(&text), Err(TrikeyError::Sidecar(_))));

        let text = format!(
            "\nIV (HEX): {}\r\nKey3 (HEX):{}\nKey2 (HEX): {}\n\nKey1 (HEX): {}\n",
            "10".repeat(16),
            "ff".repeat(16),
            "ab".repeat(16),
            "01".repeat(16),
        );
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.key1, fixed_material().key1);
        assert_eq!(parsed.key3, fixed_material().key3);
        assert_eq!(parsed.iv, [0x10; BLOCK_SIZE]);
    }

    #[test]
    fn test_parse_missing_entry() {
        let text = format!(
            "Key1 (HEX): {0}\nKey2 (HEX): {0}\nIV   (HEX): {0}\n",
            "00".repeat(16)
        );
        assert!(matches!(parse(&text), Err(TrikeyError::Sidecar(_))));
    }

    #[test]
    fn test_parse_duplicate_entry() {
        let text = format!(
            "Key1 (HEX): {0}\nKey1 (HEX): {0}\nKey2 (HEX): {0}\nKey3 (HEX): {0}\nIV   (HEX): {0}\n",
            "00".repeat(16)
        );
        assert!(matches!(parse(&text), Err(TrikeyError::Sidecar(_))));
    }

    #[test]
    fn test_parse_bad_hex_field() {
        let text = format!(
            "Key1 (HEX): {0}\nKey2 (HEX): zz{1}\nKey3 (HEX): {0}\nIV   (HEX): {0}\n",
            "00".repeat(16),
            "00".repeat(15)
        );
        assert!(matches!(parse(&text), Err(TrikeyError::InvalidHex(_))));
    }

    #[test]
    fn test_sidecar_path_appends_suffix() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/report.pdf.enc"), ".key.txt"),
            PathBuf::from("/tmp/report.pdf.enc.key.txt")
        );
        assert_eq!(
            sidecar_path(Path::new("out"), ".keys"),
            PathBuf::from("out.keys")
        );
    }
}
