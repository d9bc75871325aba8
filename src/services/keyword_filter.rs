use std::collections::BTreeMap;

/// Phrases that mark a post or comment as recommendation-bearing
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "recommend",
    "similar to",
    "if you like",
    "check out",
    "you might like",
    "fans of",
];

/// Classifies text as recommendation-bearing by case-insensitive substring
/// match against a set of keywords. Each keyword carries an enabled flag so a
/// keyword can be switched off without losing it from the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    /// Lower-cased keyword → enabled
    keywords: BTreeMap<String, bool>,
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl KeywordFilter {
    /// Builds a filter with every given keyword enabled. Blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self {
            keywords: BTreeMap::new(),
        };
        for keyword in keywords {
            filter.insert(keyword.as_ref());
        }
        filter
    }

    /// Adds a keyword (enabled). Re-inserting a disabled keyword enables it.
    pub fn insert(&mut self, keyword: &str) {
        let normalized = keyword.trim().to_lowercase();
        if !normalized.is_empty() {
            self.keywords.insert(normalized, true);
        }
    }

    /// Returns false if the keyword is not in the set
    pub fn set_enabled(&mut self, keyword: &str, enabled: bool) -> bool {
        match self.keywords.get_mut(&keyword.trim().to_lowercase()) {
            Some(flag) => {
                *flag = enabled;
                true
            }
            None => false,
        }
    }

    pub fn enabled_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(keyword, _)| keyword.as_str())
    }

    /// True iff the text contains at least one enabled keyword
    pub fn accepts(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let lowered = text.to_lowercase();
        self.enabled_keywords()
            .any(|keyword| lowered.contains(keyword))
    }
}
