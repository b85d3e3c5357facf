//! Interactive menu: the default front-end when `trikey` runs without a command.
//!
//! Every action goes through the same boundary operations as the one-shot
//! commands; a failed action is reported and the menu is shown again.

use anyhow::Result;
use secrecy::SecretString;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use trikey_core::{SearchKind, TrikeyConfig};

use crate::{run_decrypt, run_encrypt, run_find, KeySource};

pub fn run(config: &TrikeyConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    run_with(config, &mut input)
}

/// Drive the menu from any line source. Returns on "exit" or end of input.
pub fn run_with<R: BufRead>(config: &TrikeyConfig, input: &mut R) -> Result<()> {
    loop {
        println!();
        println!("Main menu:");
        println!("  1. Encryptor");
        println!("  2. Find files and folders");
        println!("  3. Exit");
        let Some(choice) = prompt(input, "> ")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => {
                if !encryptor(config, input)? {
                    return Ok(());
                }
            }
            "2" => {
                if !finder(config, input)? {
                    return Ok(());
                }
            }
            "3" => {
                println!("Goodbye.");
                return Ok(());
            }
            other => println!("✖ Unknown option: {other}"),
        }
    }
}

/// Encrypt/decrypt submenu. Returns `false` when input ran out.
fn encryptor<R: BufRead>(config: &TrikeyConfig, input: &mut R) -> Result<bool> {
    loop {
        println!();
        println!("  1. Encrypt a file");
        println!("  2. Decrypt a file");
        println!("  3. Back");
        let Some(choice) = prompt(input, "> ")? else {
            return Ok(false);
        };
        match choice.trim() {
            "1" => {
                let Some(source) = prompt(input, "Path of the file to encrypt: ")? else {
                    return Ok(false);
                };
                let Some(dest) = prompt(input, "Where to save the encrypted file: ")? else {
                    return Ok(false);
                };
                run_encrypt(
                    config,
                    &PathBuf::from(source.trim()),
                    &PathBuf::from(dest.trim()),
                    config.progress.enabled,
                );
            }
            "2" => {
                let Some(source) = prompt(input, "Path of the encrypted file: ")? else {
                    return Ok(false);
                };
                let Some(dest) = prompt(input, "Where to save the decrypted file: ")? else {
                    return Ok(false);
                };
                let Some(key1) = prompt(input, "Key1 (HEX): ")? else {
                    return Ok(false);
                };
                let Some(key2) = prompt(input, "Key2 (HEX): ")? else {
                    return Ok(false);
                };
                let Some(key3) = prompt(input, "Key3 (HEX): ")? else {
                    return Ok(false);
                };
                let keys = KeySource::Hex {
                    key1: SecretString::from(key1),
                    key2: SecretString::from(key2),
                    key3: SecretString::from(key3),
                };
                run_decrypt(
                    config,
                    &PathBuf::from(source.trim()),
                    &PathBuf::from(dest.trim()),
                    &keys,
                    config.progress.enabled,
                );
            }
            "3" => return Ok(true),
            other => println!("✖ Unknown option: {other}"),
        }
    }
}

/// Name search. Returns `false` when input ran out.
fn finder<R: BufRead>(config: &TrikeyConfig, input: &mut R) -> Result<bool> {
    let kind = loop {
        let Some(kind) = prompt(input, "Type (f = file, dir = directory): ")? else {
            return Ok(false);
        };
        match kind.parse::<SearchKind>() {
            Ok(kind) => break kind,
            Err(_) => println!("✖ Unknown type!"),
        }
    };
    let Some(needle) = prompt(input, "Name to search for (extension optional): ")? else {
        return Ok(false);
    };

    run_find(config, kind, &needle, None, false);

    println!();
    Ok(prompt(input, "Press Enter to return...")?.is_some())
}

/// Print `label`, read one line, strip the line ending. `None` on end of input.
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
