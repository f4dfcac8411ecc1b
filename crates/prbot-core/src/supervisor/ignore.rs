//! Paths whose changes never trigger a restart

use crate::error::BotResult;
use regex::{RegexSet, RegexSetBuilder};
use std::path::Path;
use std::sync::LazyLock;

/// Built-in ignore patterns, matched case-insensitively against the path with
/// `/` separators.
pub const BUILTIN_IGNORE_PATTERNS: &[&str] = &[
    // dependency caches
    r"(^|/)node_modules(/|$)",
    r"(^|/)\.venv(/|$)",
    // build and log caches
    r"(^|/)target(/|$)",
    r"(^|/)\.cache(/|$)",
    r"(^|/)\.logs(/|$)",
    // version control metadata
    r"(^|/)\.git(/|$)",
    // embedded database files
    r"\.(db|sqlite|sqlite3)(-journal|-wal|-shm)?$",
    r"\.log$",
    r"\.md$",
    // editor backups
    r"~$",
];

static BUILTIN_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSetBuilder::new(BUILTIN_IGNORE_PATTERNS)
        .case_insensitive(true)
        .build()
        .unwrap()
});

/// Decides whether a changed path is irrelevant to the running bot
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    extra: Option<RegexSet>,
    extra_patterns: Vec<String>,
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IgnoreMatcher {
    /// Only the built-in patterns
    pub fn builtin() -> Self {
        Self {
            extra: None,
            extra_patterns: Vec::new(),
        }
    }

    /// Built-in patterns plus `extra` regexes
    pub fn with_extra<I, S>(extra: I) -> BotResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra_patterns: Vec<String> = extra
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        if extra_patterns.is_empty() {
            return Ok(Self::builtin());
        }

        let set = RegexSetBuilder::new(&extra_patterns)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            extra: Some(set),
            extra_patterns,
        })
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");
        BUILTIN_SET.is_match(&normalized)
            || self
                .extra
                .as_ref()
                .is_some_and(|set| set.is_match(&normalized))
    }

    /// Every active pattern, built-ins first
    pub fn patterns(&self) -> Vec<String> {
        BUILTIN_IGNORE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(self.extra_patterns.iter().cloned())
            .collect()
    }
}
