use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use super::gpg_output::{self, StatusLine};
use crate::core::errors::{Result, SealboxError};
use crate::core::models::engine_status::EngineStatus;
use crate::core::models::import_result::ImportResult;
use crate::core::models::key_listing::KeyListing;
use crate::core::traits::engine::{EncryptOptions, OpenPgpEngine};

/// OpenPGP engine that shells out to the system `gpg` binary.
///
/// Requires GnuPG 2.1 or later (loopback pinentry). Every invocation
/// runs with `--batch` against an explicit `--homedir`, so the user's
/// default keyring is never touched.
pub struct GpgEngine {
    /// Path to the gpg binary (defaults to "gpg").
    gpg_path: PathBuf,
}

/// Captured result of one gpg process.
struct GpgRun {
    success: bool,
    stdout: Vec<u8>,
    status: Vec<StatusLine>,
    diagnostics: String,
}

impl GpgRun {
    /// Status with `ok` left false; callers decide what success means.
    fn into_status(self) -> EngineStatus {
        EngineStatus {
            ok: false,
            keywords: self.status.into_iter().map(|s| s.keyword).collect(),
            diagnostics: self.diagnostics,
        }
    }
}

impl GpgEngine {
    /// Create an engine using the default `gpg` binary.
    pub fn new() -> Self {
        Self {
            gpg_path: PathBuf::from("gpg"),
        }
    }

    /// Create an engine with a custom gpg binary path.
    pub fn with_path(gpg_path: PathBuf) -> Self {
        Self { gpg_path }
    }

    /// Locate `gpg` (or `gpg2`) on `PATH`.
    pub fn discover() -> Result<Self> {
        which::which("gpg")
            .or_else(|_| which::which("gpg2"))
            .map(Self::with_path)
            .map_err(|e| SealboxError::EngineUnavailable {
                reason: format!("gpg not found in PATH: {e}"),
            })
    }

    pub fn gpg_path(&self) -> &Path {
        &self.gpg_path
    }

    /// Check if the gpg binary runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.gpg_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    /// First line of `gpg --version`, e.g. "gpg (GnuPG) 2.4.4".
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.gpg_path)
            .arg("--version")
            .output()
            .map_err(|e| SealboxError::EngineUnavailable {
                reason: format!("failed to run {}: {e}", self.gpg_path.display()),
            })?;

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(str::to_string)
            .ok_or_else(|| SealboxError::EngineUnavailable {
                reason: "gpg --version printed nothing".into(),
            })
    }

    /// Drop passphrases the keyring's gpg-agent may still hold, so the
    /// next decrypt has to unlock the key with what the caller supplies.
    /// Does not start an agent when none is running.
    fn forget_passphrases(&self, keyring: &Path) {
        let connect = self.gpg_path.with_file_name("gpg-connect-agent");
        let result = Command::new(&connect)
            .arg("--homedir")
            .arg(keyring)
            .args(["--no-autostart", "reloadagent", "/bye"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match result {
            Ok(status) if status.success() => trace!("agent passphrase cache flushed"),
            Ok(status) => debug!(%status, "gpg-connect-agent reloadagent failed"),
            Err(e) => debug!(agent = %connect.display(), error = %e, "gpg-connect-agent did not run"),
        }
    }

    /// Run gpg against `keyring`, feeding `preamble` and then `input` on
    /// stdin from a scoped thread while stdout and stderr are drained.
    fn run(
        &self,
        keyring: &Path,
        args: &[OsString],
        preamble: Option<&[u8]>,
        input: Option<&mut (dyn Read + Send)>,
    ) -> Result<GpgRun> {
        debug!(
            engine = "gpg",
            keyring = %keyring.display(),
            args = ?args,
            "running engine"
        );

        let mut cmd = Command::new(&self.gpg_path);
        cmd.arg("--homedir")
            .arg(keyring)
            .args(["--batch", "--no-tty", "--yes", "--status-fd", "2"])
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| SealboxError::EngineUnavailable {
            reason: format!("failed to run {}: {e}", self.gpg_path.display()),
        })?;
        let stdin = child.stdin.take();

        let (output, fed) = std::thread::scope(|scope| {
            let feeder = scope.spawn(move || -> io::Result<()> {
                let Some(mut stdin) = stdin else {
                    return Ok(());
                };
                if let Some(bytes) = preamble {
                    stdin.write_all(bytes)?;
                }
                if let Some(reader) = input {
                    io::copy(reader, &mut stdin)?;
                }
                Ok(())
            });
            let output = child.wait_with_output();
            (output, feeder.join())
        });

        match fed {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                trace!("engine closed stdin before reading all input");
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(io::Error::other("engine stdin writer panicked").into()),
        }

        let output = output?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let (status, diagnostics) = gpg_output::split_status(&stderr);
        for line in &status {
            trace!(keyword = %line.keyword, args = ?line.args, "engine status");
        }

        Ok(GpgRun {
            success: output.status.success(),
            stdout: output.stdout,
            status,
            diagnostics,
        })
    }
}

impl Default for GpgEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Agent settings for keyrings this crate creates: never cache a
/// passphrase between calls.
const AGENT_CONF: &str = "default-cache-ttl 0\nmax-cache-ttl 0\n";

impl OpenPgpEngine for GpgEngine {
    fn prepare_keyring(&self, keyring: &Path) -> Result<()> {
        let conf = keyring.join("gpg-agent.conf");
        if !conf.exists() {
            std::fs::write(&conf, AGENT_CONF)?;
            debug!(path = %conf.display(), "wrote agent configuration");
        }
        Ok(())
    }

    fn encrypt(
        &self,
        keyring: &Path,
        input: &mut (dyn Read + Send),
        output: &Path,
        recipients: &[&str],
        options: EncryptOptions,
    ) -> Result<EngineStatus> {
        if recipients.is_empty() {
            warn!("encrypt called without recipients");
            return Ok(EngineStatus::default());
        }

        let mut args: Vec<OsString> = Vec::new();
        if options.always_trust {
            args.push("--trust-model".into());
            args.push("always".into());
        }
        if options.armor {
            args.push("--armor".into());
        }
        for recipient in recipients {
            args.push("--recipient".into());
            args.push(OsString::from(*recipient));
        }
        args.push("--output".into());
        args.push(output.as_os_str().to_owned());
        args.push("--encrypt".into());

        let run = self.run(keyring, &args, None, Some(input))?;
        let success = run.success;
        let mut status = run.into_status();
        status.ok = success && status.saw("END_ENCRYPTION");
        if !status.ok {
            warn!(diagnostics = %status.diagnostics.trim(), "gpg encrypt failed");
        }
        Ok(status)
    }

    fn decrypt(
        &self,
        keyring: &Path,
        input: &mut (dyn Read + Send),
        output: &Path,
        passphrase: Option<&SecretString>,
    ) -> Result<EngineStatus> {
        // Loopback keeps gpg-agent from launching a pinentry; without a
        // passphrase a protected key then simply fails.
        let mut args: Vec<OsString> = vec!["--pinentry-mode".into(), "loopback".into()];
        let mut preamble: Option<Zeroizing<Vec<u8>>> = None;
        if let Some(passphrase) = passphrase {
            args.push("--passphrase-fd".into());
            args.push("0".into());
            let mut line = Zeroizing::new(passphrase.expose_secret().as_bytes().to_vec());
            line.push(b'\n');
            preamble = Some(line);
        }
        args.push("--output".into());
        args.push(output.as_os_str().to_owned());
        args.push("--decrypt".into());

        self.forget_passphrases(keyring);
        let preamble = preamble.as_ref().map(|line| line.as_slice());
        let run = self.run(keyring, &args, preamble, Some(input))?;
        let success = run.success;
        let mut status = run.into_status();
        status.ok =
            success && status.saw("DECRYPTION_OKAY") && !status.saw("DECRYPTION_FAILED");
        if !status.ok {
            warn!(diagnostics = %status.diagnostics.trim(), "gpg decrypt failed");
        }
        Ok(status)
    }

    fn import_keys(&self, keyring: &Path, key_material: &[u8]) -> Result<ImportResult> {
        let mut reader = key_material;
        let run = self.run(keyring, &[OsString::from("--import")], None, Some(&mut reader))?;
        let result = gpg_output::parse_import(&run.status);

        debug!(
            count = result.count,
            imported = result.imported,
            unchanged = result.unchanged,
            fingerprints = ?result.fingerprints,
            "gpg import finished"
        );
        if !result.is_ok() {
            warn!(problems = ?result.problems, diagnostics = %run.diagnostics.trim(), "gpg import rejected key material");
        }
        Ok(result)
    }

    fn list_keys(&self, keyring: &Path, secret: bool) -> Result<Vec<KeyListing>> {
        let listing = if secret {
            "--list-secret-keys"
        } else {
            "--list-keys"
        };
        let args: Vec<OsString> = [
            listing,
            "--with-colons",
            "--fixed-list-mode",
            "--with-fingerprint",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        let run = self.run(keyring, &args, None, None)?;
        if !run.success {
            return Err(SealboxError::Keyring {
                path: keyring.to_path_buf(),
                detail: format!("gpg {listing} failed: {}", run.diagnostics.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&run.stdout);
        Ok(gpg_output::parse_colon_listing(&stdout, secret))
    }

    fn name(&self) -> &str {
        "gpg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpg_engine_has_correct_name() {
        let engine = GpgEngine::new();
        assert_eq!(engine.name(), "gpg");
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let engine = GpgEngine::with_path(PathBuf::from("/nonexistent/sealbox-gpg"));
        assert!(!engine.is_available());

        let dir = tempfile::tempdir().unwrap();
        let result = engine.list_keys(dir.path(), false);
        assert!(matches!(
            result,
            Err(SealboxError::EngineUnavailable { .. })
        ));
    }

    #[test]
    fn encrypt_no_recipients_is_not_ok() {
        let engine = GpgEngine::with_path(PathBuf::from("/nonexistent/sealbox-gpg"));
        let dir = tempfile::tempdir().unwrap();
        let mut input: &[u8] = b"data";

        let status = engine
            .encrypt(
                dir.path(),
                &mut input,
                &dir.path().join("out.gpg"),
                &[],
                EncryptOptions::default(),
            )
            .unwrap();
        assert!(!status.ok);
    }

    #[test]
    fn prepare_keyring_disables_passphrase_cache() {
        let engine = GpgEngine::new();
        let dir = tempfile::tempdir().unwrap();

        engine.prepare_keyring(dir.path()).unwrap();
        let conf = std::fs::read_to_string(dir.path().join("gpg-agent.conf")).unwrap();
        assert!(conf.contains("default-cache-ttl 0"));
        assert!(conf.contains("max-cache-ttl 0"));
    }

    #[test]
    fn prepare_keyring_keeps_existing_agent_conf() {
        let engine = GpgEngine::new();
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("gpg-agent.conf");
        std::fs::write(&conf, "default-cache-ttl 60\n").unwrap();

        engine.prepare_keyring(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&conf).unwrap(), "default-cache-ttl 60\n");
    }

    // Tests that need a working gpg live in tests/session_gpg_test.rs
}
