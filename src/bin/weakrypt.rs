//! weakrypt CLI - Password-based text encryption
//!
//! Command-line front end for encrypting text into a single
//! `salt<sep>nonce<sep>ciphertext` string and back.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use weakrypt::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};
use weakrypt::{Crypter, Separator, WeakryptError, text_ops};

#[derive(Parser)]
#[command(name = "weakrypt")]
#[command(version)]
#[command(about = "Password-based text encryption.", long_about = None)]
struct Cli {
    /// Read password from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Character separating salt, nonce and ciphertext (must not be a hex digit)
    #[arg(
        long,
        global = true,
        env = "WEAKRYPT_SEPARATOR",
        default_value = "g",
        value_parser = parse_separator
    )]
    separator: Separator,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a text file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose text is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the encrypted text to (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decrypt a text file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file holding the encrypted text
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the decrypted text to (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn parse_separator(s: &str) -> Result<Separator, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Separator::new(c).map_err(|e| e.to_string()),
        _ => Err(format!("expected a single character, got {:?}", s)),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

fn run(cli: Cli) -> weakrypt::Result<()> {
    let crypter = Crypter::system_with_separator(cli.separator)?;
    let mut reader = get_passphrase_reader(cli.passphrase_stdin);

    match cli.command {
        Commands::Encrypt { input, output } => {
            text_ops::encrypt_text(&input, output.as_deref(), &mut *reader, &crypter)
        }
        Commands::Decrypt { input, output } => {
            text_ops::decrypt_text(&input, output.as_deref(), &mut *reader, &crypter)
        }
    }
}

/// Logs go to stderr so stdout carries only the result. `RUST_LOG`
/// overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Unable to set global default subscriber");
    }
}

fn error_chain(err: &WeakryptError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader)
    }
}
