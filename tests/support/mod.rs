//! Shared helpers for tests that need a real gpg.
//!
//! Keys are generated once per test binary in a scratch GnuPG home that
//! is separate from every keyring under test, so no gpg-agent ever holds
//! an unlocked copy of a key a test decrypts with.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use tempfile::TempDir;

pub const PASSPHRASE: &str = "123456";

/// Skip the current test when gpg cannot be used.
#[macro_export]
macro_rules! skip_without_gpg {
    () => {
        match $crate::support::fixtures() {
            Some(fixtures) => fixtures,
            None => {
                eprintln!("SKIPPED: gpg not installed or key generation failed");
                return;
            }
        }
    };
}

/// Exported key files for one generated identity.
pub struct KeyPair {
    pub uid: String,
    pub public: PathBuf,
    pub secret: PathBuf,
}

pub struct Fixtures {
    _dir: TempDir,
    pub alice: KeyPair,
    pub bob: KeyPair,
}

/// Generated keys, or `None` when gpg is unusable here.
pub fn fixtures() -> Option<&'static Fixtures> {
    static FIXTURES: OnceLock<Option<Fixtures>> = OnceLock::new();
    FIXTURES.get_or_init(build_fixtures).as_ref()
}

fn build_fixtures() -> Option<Fixtures> {
    let gpg = which::which("gpg").ok()?;
    let dir = tempfile::tempdir().ok()?;
    let home = dir.path().join("generator");
    std::fs::create_dir_all(&home).ok()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&home, std::fs::Permissions::from_mode(0o700)).ok()?;
    }

    let alice = generate(&gpg, &home, dir.path(), "Alice", "alice@example.com");
    let bob = generate(&gpg, &home, dir.path(), "Bob", "bob@example.com");
    stop_agent(&gpg, &home);

    Some(Fixtures {
        alice: alice?,
        bob: bob?,
        _dir: dir,
    })
}

/// Stop the gpg-agent that key generation started in `home`.
fn stop_agent(gpg: &Path, home: &Path) {
    let _ = Command::new(gpg.with_file_name("gpgconf"))
        .arg("--homedir")
        .arg(home)
        .args(["--kill", "gpg-agent"])
        .output();
}

fn generate(gpg: &Path, home: &Path, out: &Path, name: &str, email: &str) -> Option<KeyPair> {
    let params = format!(
        "Key-Type: EDDSA\n\
         Key-Curve: ed25519\n\
         Key-Usage: sign\n\
         Subkey-Type: ECDH\n\
         Subkey-Curve: cv25519\n\
         Subkey-Usage: encrypt\n\
         Name-Real: {name}\n\
         Name-Email: {email}\n\
         Passphrase: {PASSPHRASE}\n\
         Expire-Date: 0\n\
         %commit\n"
    );
    let batch = out.join(format!("{email}.batch"));
    std::fs::write(&batch, params).ok()?;

    let status = Command::new(gpg)
        .arg("--homedir")
        .arg(home)
        .args(["--batch", "--pinentry-mode", "loopback", "--gen-key"])
        .arg(&batch)
        .output()
        .ok()?;
    if !status.status.success() {
        eprintln!(
            "gpg key generation failed: {}",
            String::from_utf8_lossy(&status.stderr)
        );
        return None;
    }

    let public = Command::new(gpg)
        .arg("--homedir")
        .arg(home)
        .args(["--batch", "--armor", "--export", email])
        .output()
        .ok()?;
    let secret = Command::new(gpg)
        .arg("--homedir")
        .arg(home)
        .args([
            "--batch",
            "--pinentry-mode",
            "loopback",
            "--passphrase",
            PASSPHRASE,
            "--armor",
            "--export-secret-keys",
            email,
        ])
        .output()
        .ok()?;
    if public.stdout.is_empty() || secret.stdout.is_empty() {
        return None;
    }

    let public_path = out.join(format!("{name}-public-key.asc"));
    let secret_path = out.join(format!("{name}-private-key.asc"));
    std::fs::write(&public_path, &public.stdout).ok()?;
    std::fs::write(&secret_path, &secret.stdout).ok()?;

    Some(KeyPair {
        uid: format!("{name} <{email}>"),
        public: public_path,
        secret: secret_path,
    })
}
