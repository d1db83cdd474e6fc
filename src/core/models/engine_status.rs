/// Outcome of a single round trip to the OpenPGP engine.
///
/// `ok` is the only thing callers act on. The keywords and diagnostics
/// are kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStatus {
    pub ok: bool,
    /// Status keywords in the order the engine emitted them.
    pub keywords: Vec<String>,
    /// Human-readable engine output that was not a status line.
    pub diagnostics: String,
}

impl EngineStatus {
    /// Whether the engine reported `keyword` at least once.
    pub fn saw(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}
