use std::path::PathBuf;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{Result, SealboxError};

/// Execute the `sealbox import` command.
///
/// Imports every file in turn. A file the engine rejects is reported
/// and skipped; the command fails only when nothing was accepted.
pub fn execute(ctx: &Context, files: &[PathBuf]) -> Result<()> {
    let mut accepted = 0;

    for file in files {
        let key_material = std::fs::read(file).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SealboxError::FileNotFound { path: file.clone() },
            _ => e.into(),
        })?;

        let result = ctx.session.import_key(&key_material)?;
        if !result.is_ok() {
            output::warning(&format!("{}: nothing imported", file.display()));
            for problem in &result.problems {
                output::detail(problem);
            }
            continue;
        }

        accepted += 1;
        output::success(&format!("{}: {result}", file.display()));
        for fingerprint in &result.fingerprints {
            output::detail(fingerprint);
        }
    }

    if accepted == 0 {
        return Err(SealboxError::OperationFailed {
            operation: "Import",
            hint: "The engine accepted no keys. Check that the files hold OpenPGP key material.",
        });
    }

    Ok(())
}
