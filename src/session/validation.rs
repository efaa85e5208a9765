use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How the learner judges an answer once the reference translation is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// One judgment per focus word.
    #[default]
    PerWord,
    /// A single accept/reject for the whole answer (legacy flow).
    Binary,
}

impl ValidationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMode::PerWord => "per-word",
            ValidationMode::Binary => "binary",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-focus-word judgments for one validation round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordValidations(BTreeMap<String, bool>);

impl WordValidations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a judgment. Words outside `focus_words` are rejected.
    pub fn judge(&mut self, focus_words: &[String], word: &str, correct: bool) -> bool {
        if !focus_words.iter().any(|w| w == word) {
            return false;
        }
        self.0.insert(word.to_string(), correct);
        true
    }

    pub fn get(&self, word: &str) -> Option<bool> {
        self.0.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First focus word, in sentence order, that has no judgment yet.
    pub fn next_unjudged<'a>(&self, focus_words: &'a [String]) -> Option<&'a str> {
        focus_words
            .iter()
            .find(|w| !self.0.contains_key(w.as_str()))
            .map(String::as_str)
    }

    pub fn is_complete(&self, focus_words: &[String]) -> bool {
        self.next_unjudged(focus_words).is_none()
    }

    pub fn correct_count(&self) -> usize {
        self.0.values().filter(|&&c| c).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn next_unjudged_follows_sentence_order() {
        let focus = words(&["gehen", "Haus", "rot"]);
        let mut v = WordValidations::new();
        assert_eq!(v.next_unjudged(&focus), Some("gehen"));
        v.judge(&focus, "Haus", true);
        assert_eq!(v.next_unjudged(&focus), Some("gehen"));
        v.judge(&focus, "gehen", false);
        assert_eq!(v.next_unjudged(&focus), Some("rot"));
    }

    #[test]
    fn complete_only_when_every_focus_word_is_judged() {
        let focus = words(&["a", "b"]);
        let mut v = WordValidations::new();
        assert!(!v.is_complete(&focus));
        v.judge(&focus, "a", true);
        assert!(!v.is_complete(&focus));
        v.judge(&focus, "b", false);
        assert!(v.is_complete(&focus));
        assert_eq!(v.len(), focus.len());
    }

    #[test]
    fn rejects_words_outside_focus_set() {
        let focus = words(&["a"]);
        let mut v = WordValidations::new();
        assert!(!v.judge(&focus, "z", true));
        assert!(v.is_empty());
    }

    #[test]
    fn rejudging_overwrites() {
        let focus = words(&["a"]);
        let mut v = WordValidations::new();
        v.judge(&focus, "a", true);
        v.judge(&focus, "a", false);
        assert_eq!(v.get("a"), Some(false));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn empty_focus_list_is_trivially_complete() {
        assert!(WordValidations::new().is_complete(&[]));
    }

    #[test]
    fn serializes_as_plain_object() {
        let focus = words(&["aufstehen"]);
        let mut v = WordValidations::new();
        v.judge(&focus, "aufstehen", true);
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            serde_json::json!({"aufstehen": true})
        );
    }

    #[test]
    fn mode_parses_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ValidationMode,
        }
        let w: Wrapper = toml::from_str(r#"mode = "binary""#).unwrap();
        assert_eq!(w.mode, ValidationMode::Binary);
        let w: Wrapper = toml::from_str(r#"mode = "per-word""#).unwrap();
        assert_eq!(w.mode, ValidationMode::PerWord);
    }
}
