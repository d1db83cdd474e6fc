use std::path::PathBuf;

/// All domain errors for Sealbox.
///
/// Engine-reported failures (unknown recipient, wrong passphrase, corrupt
/// ciphertext) are not errors: session operations report them as `false`
/// or `None`. These variants cover what the caller has to fix.
#[derive(Debug, thiserror::Error)]
pub enum SealboxError {
    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists."
    )]
    FileNotFound { path: PathBuf },

    #[error(
        "OpenPGP engine unavailable: {reason}\n\n  \
         Solutions:\n    \
         → Install GnuPG: https://gnupg.org/download/\n    \
         → Point to a gpg binary: sealbox --gpg /path/to/gpg\n    \
         → Or set SEALBOX_GPG in the environment"
    )]
    EngineUnavailable { reason: String },

    #[error("Keyring error at {path}: {detail}")]
    Keyring { path: PathBuf, detail: String },

    #[error(
        "No recipient found in {path}\n\n  \
         The key could not be imported or carries no user identity.\n  \
         Run 'sealbox keys' to inspect the keyring."
    )]
    NoRecipient { path: PathBuf },

    #[error("{operation} failed\n\n  {hint}")]
    OperationFailed {
        operation: &'static str,
        hint: &'static str,
    },

    #[error(
        "Invalid passphrase: {detail}\n\n  \
         The passphrase is passed to the engine as a single line."
    )]
    InvalidPassphrase { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SealboxError>;
