use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::core::errors::{Result, SealboxError};
use crate::core::models::import_result::ImportResult;
use crate::core::models::key_listing::KeyListing;
use crate::core::traits::engine::{EncryptOptions, OpenPgpEngine};

/// A handle bound to one on-disk keyring directory.
///
/// Every operation is a blocking round trip to the engine. Engine
/// failures (unknown recipient, wrong passphrase, corrupt input, engine
/// missing) come back as `false` or `None`; only I/O problems with the
/// caller's own files are errors.
pub struct KeyringSession<E: OpenPgpEngine> {
    keyring: PathBuf,
    engine: E,
    options: EncryptOptions,
}

impl<E: OpenPgpEngine> KeyringSession<E> {
    /// Bind a session to `keyring`, creating the directory if needed.
    pub fn open(keyring: impl Into<PathBuf>, engine: E) -> Result<Self> {
        let keyring = keyring.into();

        if keyring.exists() && !keyring.is_dir() {
            return Err(SealboxError::Keyring {
                path: keyring,
                detail: "exists but is not a directory".into(),
            });
        }
        if !keyring.exists() {
            std::fs::create_dir_all(&keyring)?;
            set_mode(&keyring, 0o700)?;
            engine.prepare_keyring(&keyring)?;
            info!(keyring = %keyring.display(), "created keyring directory");
        }

        Ok(Self {
            keyring,
            engine,
            options: EncryptOptions::default(),
        })
    }

    /// Replace the options used by [`encrypt`](Self::encrypt).
    pub fn with_options(mut self, options: EncryptOptions) -> Self {
        self.options = options;
        self
    }

    pub fn keyring_dir(&self) -> &Path {
        &self.keyring
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Encrypt `input` to `recipient`, writing ciphertext to `output`.
    ///
    /// `output` is only created or replaced when the engine succeeds.
    pub fn encrypt(&self, input: &Path, output: &Path, recipient: &str) -> Result<bool> {
        self.encrypt_with(input, output, recipient, self.options)
    }

    /// [`encrypt`](Self::encrypt) with options for this call only.
    pub fn encrypt_with(
        &self,
        input: &Path,
        output: &Path,
        recipient: &str,
        options: EncryptOptions,
    ) -> Result<bool> {
        let mut source = open_input(input)?;
        let staged = stage_output(output)?;

        let status = self.engine.encrypt(
            &self.keyring,
            &mut source,
            staged.path(),
            &[recipient],
            options,
        );
        let Some(status) = engine_outcome("encrypt", status)? else {
            return Ok(false);
        };
        if !status.ok {
            debug!(recipient, keywords = ?status.keywords, "encryption not ok");
            return Ok(false);
        }

        persist(staged, output)?;
        debug!(output = %output.display(), recipient, "encrypted file");
        Ok(true)
    }

    /// Decrypt `input` with a private key from this keyring, writing
    /// plaintext to `output`.
    ///
    /// Nothing is left at `output` when the engine reports failure. A
    /// passphrase spanning several lines is rejected before the engine runs.
    pub fn decrypt(
        &self,
        input: &Path,
        output: &Path,
        passphrase: Option<&SecretString>,
    ) -> Result<bool> {
        if passphrase.is_some_and(|p| p.expose_secret().contains(['\n', '\r'])) {
            return Err(SealboxError::InvalidPassphrase {
                detail: "contains a line break".into(),
            });
        }
        let mut source = open_input(input)?;
        let staged = stage_output(output)?;

        let status = self
            .engine
            .decrypt(&self.keyring, &mut source, staged.path(), passphrase);
        let Some(status) = engine_outcome("decrypt", status)? else {
            return Ok(false);
        };
        if !status.ok {
            debug!(keywords = ?status.keywords, "decryption not ok");
            return Ok(false);
        }

        persist(staged, output)?;
        debug!(output = %output.display(), "decrypted file");
        Ok(true)
    }

    /// Hand raw key material to the engine and return its summary.
    ///
    /// An engine that could not run yields an empty summary.
    pub fn import_key(&self, key_material: &[u8]) -> Result<ImportResult> {
        let result = self.engine.import_keys(&self.keyring, key_material);
        Ok(engine_outcome("import", result)?.unwrap_or_default())
    }

    /// Import the key in `key_path` and return its first user identity.
    ///
    /// The identity is looked up by the fingerprint the import reported,
    /// so keys already in the keyring cannot shadow the new one. When a
    /// file holds several keys the first reported one wins.
    pub fn recipient_from_public_key(&self, key_path: &Path) -> Result<Option<String>> {
        let key_material = std::fs::read(key_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SealboxError::FileNotFound {
                path: key_path.to_path_buf(),
            },
            _ => e.into(),
        })?;

        let import = self.import_key(&key_material)?;
        let accepted = import.not_imported == 0 && import.imported + import.unchanged > 0;
        if !import.is_ok() && !accepted {
            debug!(path = %key_path.display(), "import yielded no key");
            return Ok(None);
        }

        let listing = self.engine.list_keys(&self.keyring, false);
        let Some(keys) = engine_outcome("list", listing)? else {
            return Ok(None);
        };

        let key = match import.fingerprints.first() {
            Some(fingerprint) => keys.iter().find(|k| k.matches_fingerprint(fingerprint)),
            None => {
                // Engine accepted the key but did not say which one.
                debug!("import reported no fingerprint, using last listed key");
                keys.last()
            }
        };

        let Some(key) = key else {
            return Ok(None);
        };
        debug!(%key, "resolved recipient key");
        Ok(key.primary_uid().map(str::to_string))
    }

    /// The keyring listing, in engine order.
    pub fn list_keys(&self, secret: bool) -> Result<Vec<KeyListing>> {
        self.engine.list_keys(&self.keyring, secret)
    }
}

/// Split an engine call into "ran" and "could not run". I/O errors stay
/// errors; anything else the engine raised becomes `None`.
fn engine_outcome<T>(operation: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(SealboxError::Io(e)) => Err(SealboxError::Io(e)),
        Err(e) => {
            warn!(operation, error = %e, "engine call failed");
            Ok(None)
        }
    }
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SealboxError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => e.into(),
    })
}

/// Temporary file next to `output` that the engine writes into.
/// Dropping it without persisting removes it.
fn stage_output(output: &Path) -> Result<NamedTempFile> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(tempfile::Builder::new()
        .prefix(".sealbox-")
        .tempfile_in(parent)?)
}

/// Move a staged file into place. A replaced file keeps its permissions;
/// a new one is readable by the owner only.
fn persist(staged: NamedTempFile, output: &Path) -> Result<()> {
    match std::fs::metadata(output) {
        Ok(existing) => std::fs::set_permissions(staged.path(), existing.permissions())?,
        Err(_) => set_mode(staged.path(), 0o600)?,
    }
    staged.persist(output).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
