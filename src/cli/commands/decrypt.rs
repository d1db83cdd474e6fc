use std::io::BufRead;
use std::path::Path;

use secrecy::SecretString;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{Result, SealboxError};

/// Environment variable holding the passphrase when no file is given.
pub const PASSPHRASE_ENV: &str = "SEALBOX_PASSPHRASE";

/// Execute the `sealbox decrypt` command.
pub fn execute(
    ctx: &Context,
    input: &Path,
    output_path: &Path,
    passphrase_file: Option<&Path>,
) -> Result<()> {
    let passphrase = read_passphrase(passphrase_file)?;

    let ok = ctx
        .session
        .decrypt(input, output_path, passphrase.as_ref())?;
    if !ok {
        return Err(SealboxError::OperationFailed {
            operation: "Decryption",
            hint: "The keyring may lack the matching private key, the passphrase may be wrong,\n  \
                   or the input is not valid ciphertext. Run 'sealbox keys --secret' to check.",
        });
    }

    output::success(&format!(
        "Decrypted {} → {}",
        input.display(),
        output_path.display()
    ));
    Ok(())
}

/// Passphrase from a file (first line, "-" meaning stdin) or from the
/// environment. Never taken from the command line.
fn read_passphrase(file: Option<&Path>) -> Result<Option<SecretString>> {
    let line = match file {
        Some(path) if path == Path::new("-") => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SealboxError::FileNotFound {
                    path: path.to_path_buf(),
                },
                _ => e.into(),
            })?;
            content.lines().next().unwrap_or_default().to_string()
        }
        None => match std::env::var(PASSPHRASE_ENV) {
            Ok(value) => value,
            Err(_) => return Ok(None),
        },
    };

    let line = line.trim_end_matches(['\r', '\n']);
    Ok(Some(SecretString::from(line.to_string())))
}
