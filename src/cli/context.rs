use tracing::debug;

use crate::adapters::engine::gpg_engine::GpgEngine;
use crate::cli::Cli;
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, SealboxError};
use crate::core::services::keyring_session::KeyringSession;

/// Everything a command needs: the merged configuration and a session
/// bound to the resolved keyring.
pub struct Context {
    pub config: AppConfig,
    pub session: KeyringSession<GpgEngine>,
}

impl Context {
    /// Resolve config, locate gpg, and open the keyring session.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = AppConfig::discover(cli.config.as_deref())?;
        let homedir = config.resolve_homedir(cli.homedir.as_deref())?;

        let engine = match config.resolve_gpg_path(cli.gpg.as_deref()) {
            Some(path) => GpgEngine::with_path(path),
            None => GpgEngine::discover()?,
        };
        if !engine.is_available() {
            return Err(SealboxError::EngineUnavailable {
                reason: format!("{} did not run", engine.gpg_path().display()),
            });
        }
        if let Ok(version) = engine.version() {
            debug!(gpg = %engine.gpg_path().display(), %version, "using engine");
        }

        let session =
            KeyringSession::open(homedir, engine)?.with_options(config.encrypt_options(false));
        debug!(keyring = %session.keyring_dir().display(), "keyring session open");

        Ok(Self { config, session })
    }
}
