use std::io::Read;
use std::path::Path;

use secrecy::SecretString;

use crate::core::errors::Result;
use crate::core::models::engine_status::EngineStatus;
use crate::core::models::import_result::ImportResult;
use crate::core::models::key_listing::KeyListing;

/// How ciphertext is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptOptions {
    /// ASCII-armor the output instead of writing binary packets.
    pub armor: bool,
    /// Trust recipient keys without consulting the web of trust.
    pub always_trust: bool,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            armor: false,
            always_trust: true,
        }
    }
}

/// Port for an external OpenPGP implementation.
///
/// Implementations live in `adapters::engine` (e.g. GpgEngine). Every
/// call names the keyring directory explicitly, so one engine can serve
/// any number of sessions.
///
/// `Err` means the engine could not be run at all. A run that completed
/// but failed is an `EngineStatus` with `ok == false`.
pub trait OpenPgpEngine: Send + Sync {
    /// Set up a keyring directory the session has just created.
    fn prepare_keyring(&self, _keyring: &Path) -> Result<()> {
        Ok(())
    }

    /// Encrypt `input` to `recipients`, writing ciphertext to `output`.
    fn encrypt(
        &self,
        keyring: &Path,
        input: &mut (dyn Read + Send),
        output: &Path,
        recipients: &[&str],
        options: EncryptOptions,
    ) -> Result<EngineStatus>;

    /// Decrypt `input` with a private key from the keyring, writing
    /// plaintext to `output`.
    fn decrypt(
        &self,
        keyring: &Path,
        input: &mut (dyn Read + Send),
        output: &Path,
        passphrase: Option<&SecretString>,
    ) -> Result<EngineStatus>;

    /// Import public or private key material, armored or binary.
    fn import_keys(&self, keyring: &Path, key_material: &[u8]) -> Result<ImportResult>;

    /// List public keys, or secret keys when `secret` is set, in the
    /// engine's order.
    fn list_keys(&self, keyring: &Path, secret: bool) -> Result<Vec<KeyListing>>;

    /// Human-readable name of this engine (e.g. "gpg").
    fn name(&self) -> &str;
}
