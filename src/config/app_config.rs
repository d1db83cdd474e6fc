use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, SealboxError};
use crate::core::traits::engine::EncryptOptions;

/// Sealbox configuration read from `config.toml`.
///
/// Every field is optional; command-line flags and environment
/// variables win over the file, and the file wins over defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub encrypt: EncryptSection,
}

impl AppConfig {
    /// Load configuration from an explicit path. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SealboxError::InvalidConfig {
                detail: format!("{} not found", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| SealboxError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", path.display()),
        })
    }

    /// Load from `path` when given, else from the default location if a
    /// file is there, else fall back to defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `<config_dir>/sealbox/config.toml` for the current platform.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sealbox").join("config.toml"))
    }

    /// Keyring directory: explicit value, then config, then `~/.gnupg`.
    pub fn resolve_homedir(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.engine.homedir {
            return Ok(expand_home(dir));
        }
        dirs::home_dir()
            .map(|h| h.join(".gnupg"))
            .ok_or_else(|| SealboxError::InvalidConfig {
                detail: "Could not determine home directory; pass --homedir".into(),
            })
    }

    /// Engine binary: explicit value, then config. `None` means search
    /// `PATH`.
    pub fn resolve_gpg_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.engine.gpg_path.as_deref().map(expand_home))
    }

    /// Encryption options with an optional command-line armor override.
    pub fn encrypt_options(&self, armor_flag: bool) -> EncryptOptions {
        EncryptOptions {
            armor: armor_flag || self.encrypt.armor,
            always_trust: self.encrypt.always_trust,
        }
    }
}

/// The `[engine]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    pub gpg_path: Option<String>,
    pub homedir: Option<String>,
}

/// The `[encrypt]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptSection {
    #[serde(default)]
    pub armor: bool,
    #[serde(default = "default_always_trust")]
    pub always_trust: bool,
}

impl Default for EncryptSection {
    fn default() -> Self {
        Self {
            armor: false,
            always_trust: default_always_trust(),
        }
    }
}

fn default_always_trust() -> bool {
    true
}

fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}
