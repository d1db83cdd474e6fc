use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{Result, SealboxError};

/// Execute the `sealbox keys` command.
///
/// `--json` output is data for scripts and is printed even in quiet mode.
pub fn execute(ctx: &Context, secret: bool, json: bool) -> Result<()> {
    let keys = ctx.session.list_keys(secret)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&keys).map_err(|e| SealboxError::Keyring {
                path: ctx.session.keyring_dir().to_path_buf(),
                detail: format!("Failed to render listing: {e}"),
            })?;
        println!("{rendered}");
        return Ok(());
    }

    let kind = if secret { "private" } else { "public" };
    if keys.is_empty() {
        output::warning(&format!(
            "No {kind} keys in {}",
            ctx.session.keyring_dir().display()
        ));
        output::line("  Run 'sealbox import <key-file>' to add one.");
        return Ok(());
    }

    output::header(&format!("{} {kind} key(s) ({})", keys.len(), ctx.session.keyring_dir().display()));
    for key in &keys {
        output::line(&format!("  • {}", key.fingerprint));
        for uid in &key.uids {
            output::line(&format!("      {uid}"));
        }
        if let Some(expires) = key.expires {
            output::detail(&format!("expires {}", expires.format("%Y-%m-%d")));
        }
    }

    Ok(())
}
