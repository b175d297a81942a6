use std::collections::{BTreeSet, HashMap};

/// Tokens used to talk to GitHub: one default plus optional per-owner overrides.
#[derive(Clone, Default)]
pub struct Credentials {
    default_token: String,
    owner_tokens: HashMap<String, String>,
}

// Manual Debug impl to avoid leaking tokens
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut owners: Vec<&String> = self.owner_tokens.keys().collect();
        owners.sort();
        f.debug_struct("Credentials")
            .field("default_token", &"[REDACTED]")
            .field("owner_tokens", &owners)
            .finish()
    }
}

impl Credentials {
    pub fn new(default_token: impl Into<String>, owner_tokens: HashMap<String, String>) -> Self {
        Self {
            default_token: default_token.into(),
            owner_tokens,
        }
    }

    /// Token to use for repositories owned by `owner`.
    ///
    /// An owner-specific token wins over the default. GitHub owner names are
    /// case-insensitive, so an exact key match is tried before a folded one;
    /// among several folded matches the lexicographically smallest key wins.
    /// Returns `None` when neither is configured.
    pub fn resolve(&self, owner: &str) -> Option<&str> {
        self.owner_tokens
            .get(owner)
            .or_else(|| {
                self.owner_tokens
                    .iter()
                    .filter(|(key, _)| key.eq_ignore_ascii_case(owner))
                    .min_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(_, token)| token)
            })
            .map(String::as_str)
            .filter(|token| !token.is_empty())
            .or_else(|| Some(self.default_token.as_str()).filter(|token| !token.is_empty()))
    }

    /// Owner keys that differ only by ASCII case, as sorted pairs.
    pub fn case_collisions(&self) -> Vec<(&str, &str)> {
        let mut owners: Vec<&str> = self.owner_tokens.keys().map(String::as_str).collect();
        owners.sort_unstable();

        let mut collisions = Vec::new();
        for (i, first) in owners.iter().enumerate() {
            for second in &owners[i + 1..] {
                if first.eq_ignore_ascii_case(second) {
                    collisions.push((*first, *second));
                }
            }
        }
        collisions
    }

    /// Every distinct token value, owner tokens and default alike.
    pub fn distinct(&self) -> Vec<&str> {
        let mut tokens: BTreeSet<&str> = self
            .owner_tokens
            .values()
            .map(String::as_str)
            .filter(|token| !token.is_empty())
            .collect();
        if !self.default_token.is_empty() {
            tokens.insert(self.default_token.as_str());
        }
        tokens.into_iter().collect()
    }
}
