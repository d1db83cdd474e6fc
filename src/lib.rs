//! Sealbox - encrypt and decrypt files against an OpenPGP keyring.
//!
//! All cryptography is delegated to an external OpenPGP engine (GnuPG).
//! This crate only marshals files, keys, and passphrases across that
//! boundary and translates the engine's status reports.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── core/
//! │   ├── models      # KeyListing, ImportResult, EngineStatus
//! │   ├── traits      # OpenPgpEngine port
//! │   ├── services    # KeyringSession
//! │   └── errors      # SealboxError
//! ├── adapters/
//! │   └── engine      # GpgEngine and gpg output parsers
//! ├── config          # config.toml
//! └── cli             # sealbox binary commands
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sealbox::{GpgEngine, KeyringSession};
//!
//! # fn main() -> sealbox::Result<()> {
//! let session = KeyringSession::open("/tmp/keyring", GpgEngine::discover()?)?;
//! if let Some(recipient) = session.recipient_from_public_key(Path::new("public-key.asc"))? {
//!     let ok = session.encrypt(Path::new("raw.txt"), Path::new("processed.gpg"), &recipient)?;
//!     println!("encrypted: {ok}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;

pub use crate::adapters::engine::gpg_engine::GpgEngine;
pub use crate::core::errors::{Result, SealboxError};
pub use crate::core::models::import_result::ImportResult;
pub use crate::core::models::key_listing::KeyListing;
pub use crate::core::services::keyring_session::KeyringSession;
pub use crate::core::traits::engine::{EncryptOptions, OpenPgpEngine};
