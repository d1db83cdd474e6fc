pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Encrypt and decrypt files with an OpenPGP keyring.
#[derive(Parser, Debug)]
#[command(name = "sealbox", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Keyring directory used by the OpenPGP engine (default: ~/.gnupg)
    #[arg(long, global = true, env = "SEALBOX_HOME")]
    pub homedir: Option<PathBuf>,

    /// Path to the gpg binary (default: first gpg on PATH)
    #[arg(long, global = true, env = "SEALBOX_GPG")]
    pub gpg: Option<PathBuf>,

    /// Path to alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import public or private keys into the keyring
    Import {
        /// Key files, ASCII-armored or binary
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Import a public key and print the recipient it names
    Recipient {
        /// Public key file
        key_file: PathBuf,
    },

    /// Encrypt a file to a recipient
    Encrypt {
        /// Plaintext file
        input: PathBuf,
        /// Where to write the ciphertext
        #[arg(short, long)]
        output: PathBuf,
        /// Recipient user id or fingerprint
        #[arg(short, long, required_unless_present = "key", conflicts_with = "key")]
        recipient: Option<String>,
        /// Import this public key and encrypt to it
        #[arg(long)]
        key: Option<PathBuf>,
        /// ASCII-armor the ciphertext
        #[arg(short, long)]
        armor: bool,
    },

    /// Decrypt a file with a private key from the keyring
    Decrypt {
        /// Encrypted file
        input: PathBuf,
        /// Where to write the plaintext
        #[arg(short, long)]
        output: PathBuf,
        /// Read the passphrase from this file ("-" for stdin).
        /// Otherwise SEALBOX_PASSPHRASE is used when set.
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
    },

    /// List keys in the keyring
    Keys {
        /// List private keys instead of public keys
        #[arg(long)]
        secret: bool,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the parsed command.
pub fn execute(cli: &Cli) -> crate::core::errors::Result<()> {
    let ctx = context::Context::from_cli(cli)?;

    match &cli.command {
        Commands::Import { files } => commands::import::execute(&ctx, files),
        Commands::Recipient { key_file } => commands::recipient::execute(&ctx, key_file),
        Commands::Encrypt {
            input,
            output,
            recipient,
            key,
            armor,
        } => commands::encrypt::execute(
            &ctx,
            input,
            output,
            recipient.as_deref(),
            key.as_deref(),
            *armor,
        ),
        Commands::Decrypt {
            input,
            output,
            passphrase_file,
        } => commands::decrypt::execute(&ctx, input, output, passphrase_file.as_deref()),
        Commands::Keys { secret, json } => commands::keys::execute(&ctx, *secret, *json),
    }
}
