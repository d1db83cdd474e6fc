use std::path::Path;

use crate::cli::context::Context;
use crate::core::errors::{Result, SealboxError};

/// Execute the `sealbox recipient` command.
///
/// Prints the bare user identity on stdout so it can be captured by
/// scripts, even in quiet mode.
pub fn execute(ctx: &Context, key_file: &Path) -> Result<()> {
    match ctx.session.recipient_from_public_key(key_file)? {
        Some(uid) => {
            println!("{uid}");
            Ok(())
        }
        None => Err(SealboxError::NoRecipient {
            path: key_file.to_path_buf(),
        }),
    }
}
