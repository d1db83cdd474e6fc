//! Parsers for the machine-readable output of `gpg`.
//!
//! Two formats matter here: status lines written to the status file
//! descriptor (`[GNUPG:] KEYWORD args...`) and the colon-delimited key
//! listing produced by `--with-colons`.

use chrono::{DateTime, Utc};

use crate::core::models::import_result::ImportResult;
use crate::core::models::key_listing::KeyListing;

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// One `[GNUPG:]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub keyword: String,
    pub args: Vec<String>,
}

/// Split engine stderr into status lines and the remaining human text.
pub fn split_status(stderr: &str) -> (Vec<StatusLine>, String) {
    let mut status = Vec::new();
    let mut diagnostics = String::new();

    for line in stderr.lines() {
        match line.strip_prefix(STATUS_PREFIX) {
            Some(rest) => {
                let mut parts = rest.split_whitespace();
                if let Some(keyword) = parts.next() {
                    status.push(StatusLine {
                        keyword: keyword.to_string(),
                        args: parts.map(str::to_string).collect(),
                    });
                }
            }
            None => {
                diagnostics.push_str(line);
                diagnostics.push('\n');
            }
        }
    }

    (status, diagnostics)
}

/// Build an import summary from the status lines of `gpg --import`.
pub fn parse_import(status: &[StatusLine]) -> ImportResult {
    let mut result = ImportResult::default();

    for line in status {
        match line.keyword.as_str() {
            "IMPORT_OK" => {
                if let Some(fpr) = line.args.get(1) {
                    result.push_fingerprint(fpr);
                }
            }
            "IMPORT_PROBLEM" => {
                let reason = line.args.first().map(String::as_str).unwrap_or("0");
                result.problems.push(import_problem(reason).to_string());
            }
            "NODATA" => result.problems.push("No valid data found".to_string()),
            "IMPORT_RES" => {
                let n = |i: usize| {
                    line.args
                        .get(i)
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0)
                };
                result.count = n(0);
                result.no_user_id = n(1);
                result.imported = n(2);
                result.unchanged = n(4);
                result.secret_read = n(9);
                result.secret_imported = n(10);
                result.secret_unchanged = n(11);
                result.not_imported = n(13);
            }
            _ => {}
        }
    }

    result
}

fn import_problem(code: &str) -> &'static str {
    match code {
        "1" => "Invalid certificate",
        "2" => "Issuer certificate missing",
        "3" => "Certificate chain too long",
        "4" => "Error storing certificate",
        _ => "No specific reason given",
    }
}

/// Parse a `--with-colons --fixed-list-mode` key listing.
///
/// Only `pub`/`sec` records start a new key. The first `fpr` after a
/// primary record is the key's fingerprint; subkey fingerprints are
/// ignored.
pub fn parse_colon_listing(stdout: &str, secret: bool) -> Vec<KeyListing> {
    let mut keys: Vec<KeyListing> = Vec::new();
    let mut in_primary = false;

    for line in stdout.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("");

        match field(0) {
            "pub" | "sec" => {
                keys.push(KeyListing {
                    key_id: field(4).to_string(),
                    secret,
                    validity: field(1).chars().next(),
                    length: field(2).parse().ok(),
                    algorithm: field(3).parse().ok(),
                    created: parse_epoch(field(5)),
                    expires: parse_epoch(field(6)),
                    ..Default::default()
                });
                in_primary = true;
            }
            "sub" | "ssb" => in_primary = false,
            "fpr" => {
                if let Some(key) = keys.last_mut()
                    && in_primary
                    && key.fingerprint.is_empty()
                {
                    key.fingerprint = field(9).to_string();
                }
            }
            "uid" => {
                if let Some(key) = keys.last_mut() {
                    key.uids.push(unescape(field(9)));
                }
            }
            _ => {}
        }
    }

    keys
}

fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Undo the `\xHH` escaping gpg applies to colon-listing fields.
fn unescape(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\'
            && bytes.get(i + 1) == Some(&b'x')
            && let Some(byte) = bytes
                .get(i + 2..i + 4)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(byte);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
