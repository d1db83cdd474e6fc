use serde::Serialize;

/// Summary of one key import, as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub count: u32,
    pub no_user_id: u32,
    pub imported: u32,
    pub unchanged: u32,
    pub secret_read: u32,
    pub secret_imported: u32,
    pub secret_unchanged: u32,
    pub not_imported: u32,
    /// Fingerprints in the order the engine reported them. A key that
    /// was already present is reported again, so re-imports still
    /// resolve.
    pub fingerprints: Vec<String>,
    /// Reasons given for keys the engine refused.
    pub problems: Vec<String>,
}

impl ImportResult {
    /// True when the engine accepted at least one key and rejected none.
    pub fn is_ok(&self) -> bool {
        self.not_imported == 0 && !self.fingerprints.is_empty()
    }

    /// Record a fingerprint once, keeping first-seen order.
    pub fn push_fingerprint(&mut self, fingerprint: &str) {
        if !self.fingerprints.iter().any(|f| f == fingerprint) {
            self.fingerprints.push(fingerprint.to_string());
        }
    }
}

impl std::fmt::Display for ImportResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed, {} imported, {} unchanged",
            self.count, self.imported, self.unchanged
        )?;
        if self.secret_read > 0 {
            write!(
                f,
                ", {} secret read, {} secret imported",
                self.secret_read, self.secret_imported
            )?;
        }
        if self.not_imported > 0 {
            write!(f, ", {} not imported", self.not_imported)?;
        }
        Ok(())
    }
}
