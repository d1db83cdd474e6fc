use std::path::Path;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{Result, SealboxError};

/// Execute the `sealbox encrypt` command.
///
/// The recipient is either named directly or taken from a public key
/// file, which is imported first.
pub fn execute(
    ctx: &Context,
    input: &Path,
    output_path: &Path,
    recipient: Option<&str>,
    key_file: Option<&Path>,
    armor: bool,
) -> Result<()> {
    let recipient = match (recipient, key_file) {
        (Some(r), _) => r.to_string(),
        (None, Some(key)) => ctx
            .session
            .recipient_from_public_key(key)?
            .ok_or_else(|| SealboxError::NoRecipient {
                path: key.to_path_buf(),
            })?,
        (None, None) => {
            return Err(SealboxError::InvalidConfig {
                detail: "Pass --recipient or --key".into(),
            });
        }
    };

    let options = ctx.config.encrypt_options(armor);
    output::detail(&format!("Recipient: {recipient}"));

    let ok = ctx
        .session
        .encrypt_with(input, output_path, &recipient, options)?;
    if !ok {
        return Err(SealboxError::OperationFailed {
            operation: "Encryption",
            hint: "The recipient's public key may be missing from the keyring.\n  \
                   Run 'sealbox keys' to list it, or 'sealbox import <key-file>' to add it.",
        });
    }

    output::success(&format!(
        "Encrypted {} → {} with {}",
        input.display(),
        output_path.display(),
        ctx.session.engine_name()
    ));
    Ok(())
}
