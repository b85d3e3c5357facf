//! trikey: single-file encryption with three-fragment key material
//!
//! Commands:
//!   encrypt <input> <output>   - encrypt, writing <output> and <output>.key.txt
//!   decrypt <input> <output>   - decrypt with Key1/Key2/Key3 (flags, key file, or prompt)
//!   find <f|dir> <needle>      - search a directory tree by name
//!   config show                - display current configuration
//!   menu                       - interactive menu (default when no command is given)

mod menu;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use trikey_core::config::{expand_tilde, ProgressConfig};
use trikey_core::{SearchKind, TrikeyConfig, TrikeyError};
use trikey_crypto::{hex_codec, sidecar, KeyMaterialGenerator};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "trikey",
    version,
    about = "Encrypt files with AES-256-CBC and three-fragment key material",
    long_about = "trikey: encrypt and decrypt single files, keep their keys in a companion \
                  key file, and find files or folders by name"
)]
struct Cli {
    /// Path to trikey configuration file
    #[arg(
        long,
        short = 'c',
        env = "TRIKEY_CONFIG",
        default_value = "~/.config/trikey/config.toml"
    )]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "TRIKEY_LOG")]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "TRIKEY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file with freshly generated keys
    ///
    /// Writes the ciphertext to OUTPUT and the keys to OUTPUT plus the
    /// configured key-file suffix. Both are overwritten if they exist.
    Encrypt {
        /// File to encrypt
        input: PathBuf,
        /// Where to write the ciphertext
        output: PathBuf,
        /// Skip the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Decrypt a file produced by `trikey encrypt`
    ///
    /// Keys not given as flags are prompted for without echo.
    Decrypt {
        /// Encrypted file
        input: PathBuf,
        /// Where to write the plaintext
        output: PathBuf,
        /// Key1 in hex
        #[arg(long, conflicts_with = "key_file")]
        key1: Option<String>,
        /// Key2 in hex
        #[arg(long, conflicts_with = "key_file")]
        key2: Option<String>,
        /// Key3 in hex
        #[arg(long, conflicts_with = "key_file")]
        key3: Option<String>,
        /// Read all keys from a key file written by `trikey encrypt`
        #[arg(long, short = 'k')]
        key_file: Option<PathBuf>,
        /// Skip the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Find files or directories whose name contains NEEDLE
    Find {
        /// What to look for: f (file) or dir (directory)
        kind: SearchKind,
        /// Substring to match against entry names (case-sensitive)
        needle: String,
        /// Directory to search (overrides config search.root)
        #[arg(long, short = 'r')]
        root: Option<PathBuf>,
        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Interactive menu
    Menu,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

/// Where the decryption keys come from
pub(crate) enum KeySource {
    Hex {
        key1: SecretString,
        key2: SecretString,
        key3: SecretString,
    },
    File(PathBuf),
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = TrikeyConfig::load(&config_path)
        .with_context(|| format!("loading config: {}", config_path.display()))?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli.log_format.clone().unwrap_or_else(|| {
        LogFormat::from_str(&config.log.format, true).unwrap_or(LogFormat::Text)
    });
    init_logging(&level, &format);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "trikey starting"
    );

    let ok = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Encrypt { input, output, no_progress } => {
            run_encrypt(&config, &input, &output, !no_progress)
        }
        Commands::Decrypt { input, output, key1, key2, key3, key_file, no_progress } => {
            let keys = match key_file {
                Some(path) => KeySource::File(path),
                None => KeySource::Hex {
                    key1: key_or_prompt(key1, "Key1 (HEX): ")?,
                    key2: key_or_prompt(key2, "Key2 (HEX): ")?,
                    key3: key_or_prompt(key3, "Key3 (HEX): ")?,
                },
            };
            run_decrypt(&config, &input, &output, &keys, !no_progress)
        }
        Commands::Find { kind, needle, root, json } => {
            run_find(&config, kind, &needle, root.as_deref(), json)
        }
        Commands::Config { action: ConfigAction::Show } => {
            cmd_config_show(&config, &config_path)?;
            true
        }
        Commands::Menu => {
            menu::run(&config)?;
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn key_or_prompt(value: Option<String>, label: &str) -> Result<SecretString> {
    match value {
        Some(v) => Ok(SecretString::from(v)),
        None => {
            let entered = rpassword::prompt_password(label)
                .with_context(|| format!("reading {}", label.trim_end_matches(": ")))?;
            Ok(SecretString::from(entered))
        }
    }
}

// ── Boundary operations ───────────────────────────────────────────────────────
//
// Each of these reports its own failure and returns whether it succeeded, so
// neither the one-shot commands nor the menu loop are torn down by an error.

// The stderr line is the user-facing report; the event only shows up with --log debug.
fn report_error(operation: &str, err: &TrikeyError) {
    tracing::debug!(kind = err.kind(), error = %err, "{operation} failed");
    eprintln!("{}", failure_line(operation, err));
}

fn failure_line(operation: &str, err: &TrikeyError) -> String {
    format!("✖ {operation} failed [{}]: {err}", err.kind())
}

pub(crate) fn run_encrypt(
    config: &TrikeyConfig,
    input: &Path,
    output: &Path,
    show_progress: bool,
) -> bool {
    let mut generator = KeyMaterialGenerator::os();
    let report = match trikey_crypto::encrypt_file(
        &mut generator,
        input,
        output,
        &config.crypto.sidecar_suffix,
    ) {
        Ok(report) => report,
        Err(e) => {
            report_error("encryption", &e);
            return false;
        }
    };

    if show_progress {
        play_progress(&config.progress, "encrypt");
    }

    println!("✔ Encrypted: {} → {}", input.display(), report.output.display());
    println!(
        "  bytes:       {} → {}",
        fmt_bytes(report.plaintext_len as u64),
        fmt_bytes(report.ciphertext_len as u64)
    );
    println!("  key file:    {}", report.sidecar.display());
    println!("  Key1 (HEX):  {}", hex_codec::encode(report.material.key1.as_bytes()));
    println!("  Key2 (HEX):  {}", hex_codec::encode(report.material.key2.as_bytes()));
    println!("  Key3 (HEX):  {}", hex_codec::encode(report.material.key3.as_bytes()));
    println!("  Keep the key file safe: it is the only way to decrypt.");
    true
}

pub(crate) fn run_decrypt(
    config: &TrikeyConfig,
    input: &Path,
    output: &Path,
    keys: &KeySource,
    show_progress: bool,
) -> bool {
    let result = match keys {
        KeySource::Hex { key1, key2, key3 } => trikey_crypto::decrypt_file(
            input,
            output,
            key1.expose_secret(),
            key2.expose_secret(),
            key3.expose_secret(),
        ),
        KeySource::File(path) => sidecar::read(path).and_then(|material| {
            trikey_crypto::decrypt_file_with_keys(
                input,
                output,
                &material.key1,
                &material.key2,
                &material.key3,
            )
        }),
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            report_error("decryption", &e);
            return false;
        }
    };

    if show_progress {
        play_progress(&config.progress, "decrypt");
    }

    println!("✔ Decrypted: {} → {}", input.display(), report.output.display());
    println!("  bytes:  {}", fmt_bytes(report.plaintext_len as u64));
    true
}

pub(crate) fn run_find(
    config: &TrikeyConfig,
    kind: SearchKind,
    needle: &str,
    root: Option<&Path>,
    json: bool,
) -> bool {
    let root = root
        .map(expand_tilde)
        .unwrap_or_else(|| config.search.root.clone());

    let spinner = make_spinner("find");
    spinner.set_message(format!("searching {}...", root.display()));
    let result = trikey_search::search(&root, kind, needle);
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            report_error("search", &e);
            return false;
        }
    };

    if json {
        return match serde_json::to_string_pretty(&report.hits) {
            Ok(rendered) => {
                println!("{rendered}");
                true
            }
            Err(e) => {
                eprintln!("✖ search failed: rendering JSON: {e}");
                false
            }
        };
    }

    println!("Results ({} scanned):", report.scanned);
    if report.hits.is_empty() {
        println!("✖ Nothing found.");
    }
    for hit in &report.hits {
        println!("{} ----> {}", hit.name, hit.path.display());
    }
    true
}

// ── Progress display ──────────────────────────────────────────────────────────

/// Cosmetic progress bar played after an operation has already completed.
fn play_progress(progress: &ProgressConfig, prefix: &str) {
    if !progress.enabled || progress.steps == 0 {
        return;
    }
    let pb = ProgressBar::new(progress.steps);
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:50.cyan/blue}] {percent:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("■■ "),
    );
    pb.set_prefix(prefix.to_string());
    for _ in 0..progress.steps {
        pb.inc(1);
        std::thread::sleep(Duration::from_millis(progress.step_delay_ms));
    }
    pb.finish_and_clear();
}

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ── `trikey config show` ──────────────────────────────────────────────────────

fn cmd_config_show(config: &TrikeyConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Utilities ─────────────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
