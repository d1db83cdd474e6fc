//! KeyringSession against a real gpg, each test in its own keyring.

mod support;

use std::path::Path;

use sealbox::{GpgEngine, KeyringSession};
use secrecy::SecretString;
use support::PASSPHRASE;

fn session(dir: &Path) -> KeyringSession<GpgEngine> {
    let engine = GpgEngine::discover().unwrap();
    KeyringSession::open(dir.join("keyring"), engine).unwrap()
}

fn passphrase(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[test]
fn import_resolve_encrypt_decrypt_scenario() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let recipient = session
        .recipient_from_public_key(&fixtures.alice.public)
        .unwrap();
    assert_eq!(recipient.as_deref(), Some("Alice <alice@example.com>"));

    let raw = dir.path().join("raw.txt");
    let processed = dir.path().join("processed.gpg");
    std::fs::write(&raw, "Meet me at the usual place at ten.\n").unwrap();

    assert!(session.encrypt(&raw, &processed, &recipient.unwrap()).unwrap());
    let ciphertext = std::fs::read(&processed).unwrap();
    assert!(!ciphertext.is_empty());
    assert_ne!(ciphertext, std::fs::read(&raw).unwrap());

    let secret = std::fs::read(&fixtures.alice.secret).unwrap();
    assert!(session.import_key(&secret).unwrap().is_ok());

    let decrypted = dir.path().join("decrypted.txt");
    assert!(
        session
            .decrypt(&processed, &decrypted, Some(&passphrase(PASSPHRASE)))
            .unwrap()
    );
    assert_eq!(
        std::fs::read(&decrypted).unwrap(),
        std::fs::read(&raw).unwrap()
    );
}

#[test]
fn unknown_recipient_fails_without_output() {
    let _fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let raw = dir.path().join("raw.txt");
    let processed = dir.path().join("processed.gpg");
    std::fs::write(&raw, "secret").unwrap();

    assert!(
        !session
            .encrypt(&raw, &processed, "Nobody <nobody@example.com>")
            .unwrap()
    );
    assert!(!processed.exists());
}

#[test]
fn wrong_passphrase_fails_without_plaintext() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    session
        .import_key(&std::fs::read(&fixtures.alice.secret).unwrap())
        .unwrap();

    let raw = dir.path().join("raw.txt");
    let processed = dir.path().join("processed.gpg");
    let decrypted = dir.path().join("decrypted.txt");
    std::fs::write(&raw, "secret").unwrap();
    assert!(session.encrypt(&raw, &processed, &fixtures.alice.uid).unwrap());

    assert!(
        !session
            .decrypt(&processed, &decrypted, Some(&passphrase("wrong")))
            .unwrap()
    );
    assert!(!decrypted.exists());
}

#[test]
fn passphrase_is_required_after_a_successful_decrypt() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    session
        .import_key(&std::fs::read(&fixtures.alice.secret).unwrap())
        .unwrap();

    let raw = dir.path().join("raw.txt");
    let processed = dir.path().join("processed.gpg");
    std::fs::write(&raw, "secret").unwrap();
    assert!(session.encrypt(&raw, &processed, &fixtures.alice.uid).unwrap());

    let first = dir.path().join("first.txt");
    assert!(
        session
            .decrypt(&processed, &first, Some(&passphrase(PASSPHRASE)))
            .unwrap()
    );

    let wrong = dir.path().join("wrong.txt");
    assert!(
        !session
            .decrypt(&processed, &wrong, Some(&passphrase("wrong")))
            .unwrap()
    );
    assert!(!wrong.exists());

    let missing = dir.path().join("missing.txt");
    assert!(!session.decrypt(&processed, &missing, None).unwrap());
    assert!(!missing.exists());
}

#[test]
fn decrypt_without_private_key_fails() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());
    session
        .recipient_from_public_key(&fixtures.alice.public)
        .unwrap();

    let raw = dir.path().join("raw.txt");
    let processed = dir.path().join("processed.gpg");
    std::fs::write(&raw, "secret").unwrap();
    assert!(session.encrypt(&raw, &processed, &fixtures.alice.uid).unwrap());

    let decrypted = dir.path().join("decrypted.txt");
    assert!(
        !session
            .decrypt(&processed, &decrypted, Some(&passphrase(PASSPHRASE)))
            .unwrap()
    );
    assert!(!decrypted.exists());
}

#[test]
fn corrupt_ciphertext_fails() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());
    session
        .import_key(&std::fs::read(&fixtures.alice.secret).unwrap())
        .unwrap();

    let bogus = dir.path().join("bogus.gpg");
    std::fs::write(&bogus, "this is not OpenPGP data").unwrap();

    let decrypted = dir.path().join("decrypted.txt");
    assert!(
        !session
            .decrypt(&bogus, &decrypted, Some(&passphrase(PASSPHRASE)))
            .unwrap()
    );
    assert!(!decrypted.exists());
}

#[test]
fn importing_twice_keeps_recipient_resolvable() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let first = session
        .recipient_from_public_key(&fixtures.alice.public)
        .unwrap();
    let second = session
        .recipient_from_public_key(&fixtures.alice.public)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(session.list_keys(false).unwrap().len(), 1);

    let raw = dir.path().join("raw.txt");
    std::fs::write(&raw, "again").unwrap();
    assert!(
        session
            .encrypt(&raw, &dir.path().join("out.gpg"), &second.unwrap())
            .unwrap()
    );
}

#[test]
fn recipient_resolves_the_imported_key_not_the_last_listed() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    session
        .recipient_from_public_key(&fixtures.bob.public)
        .unwrap();
    session
        .recipient_from_public_key(&fixtures.alice.public)
        .unwrap();

    // Bob is already present, so the listing still ends with Alice.
    let recipient = session
        .recipient_from_public_key(&fixtures.bob.public)
        .unwrap();
    assert_eq!(recipient.as_deref(), Some("Bob <bob@example.com>"));
}

#[test]
fn garbage_key_material_is_rejected() {
    let _fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    let result = session.import_key(b"definitely not a key").unwrap();
    assert!(!result.is_ok());

    let junk = dir.path().join("junk.asc");
    std::fs::write(&junk, "definitely not a key").unwrap();
    assert_eq!(session.recipient_from_public_key(&junk).unwrap(), None);
}

#[test]
fn secret_listing_shows_imported_private_key() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path());

    assert!(session.list_keys(true).unwrap().is_empty());
    session
        .import_key(&std::fs::read(&fixtures.alice.secret).unwrap())
        .unwrap();

    let secret = session.list_keys(true).unwrap();
    assert_eq!(secret.len(), 1);
    assert!(secret[0].secret);
    assert_eq!(secret[0].uids, vec![fixtures.alice.uid.clone()]);
    assert_eq!(secret[0].fingerprint.len(), 40);
}

#[test]
fn armored_output_is_text() {
    let fixtures = skip_without_gpg!();
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path()).with_options(sealbox::EncryptOptions {
        armor: true,
        always_trust: true,
    });
    session
        .recipient_from_public_key(&fixtures.alice.public)
        .unwrap();

    let raw = dir.path().join("raw.txt");
    let processed = dir.path().join("processed.asc");
    std::fs::write(&raw, "armored").unwrap();
    assert!(session.encrypt(&raw, &processed, &fixtures.alice.uid).unwrap());

    let text = std::fs::read_to_string(&processed).unwrap();
    assert!(text.contains("BEGIN PGP MESSAGE"));
}
