use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Translation lookup state of a single token. Never sent over the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Lookup {
    #[default]
    Idle,
    Loading,
    Ready(String),
    Failed,
}

impl Lookup {
    /// A token counts as clicked once a lookup was started for it.
    pub fn is_clicked(&self) -> bool {
        !matches!(self, Lookup::Idle)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "token")]
    pub text: String,
    #[serde(rename = "token_ws", default)]
    pub trailing_ws: String,
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub root_words: Vec<String>,
    #[serde(rename = "is_svp", default)]
    pub is_separable: bool,
    #[serde(rename = "full_svp_word", default)]
    pub merged_particle: Option<String>,
    #[serde(skip)]
    pub lookup: Lookup,
}

impl Token {
    pub fn new(text: &str, trailing_ws: &str, id: Option<u32>) -> Self {
        Self {
            text: text.to_string(),
            trailing_ws: trailing_ws.to_string(),
            id,
            root_words: Vec::new(),
            is_separable: false,
            merged_particle: None,
            lookup: Lookup::Idle,
        }
    }

    /// Grammar tokens (punctuation, spaces) carry no id and cannot be looked up.
    pub fn is_clickable(&self) -> bool {
        self.id.is_some()
    }

    /// Trailing whitespace as displayed: a plain space becomes a non-breaking one.
    pub fn display_ws(&self) -> &str {
        if self.trailing_ws == " " {
            "\u{00a0}"
        } else {
            &self.trailing_ws
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenDataError {
    #[error("{count} tokens share id {id}; at most two are allowed")]
    TooManySharedId { id: u32, count: usize },
    #[error("no token has id {0}")]
    UnknownId(u32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentenceData {
    #[serde(alias = "content")]
    pub message: String,
    #[serde(rename = "data", default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub focus_words: Vec<String>,
}

impl SentenceData {
    /// Collapse duplicate focus words, keeping the first occurrence.
    pub fn normalize(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.focus_words.len());
        self.focus_words.retain(|w| {
            if seen.contains(w) {
                false
            } else {
                seen.push(w.clone());
                true
            }
        });
        self
    }

    /// The sentence as shown, with inter-token spaces made non-breaking.
    pub fn display_text(&self) -> String {
        let mut out = String::with_capacity(self.message.len());
        for token in &self.tokens {
            out.push_str(&token.text);
            out.push_str(token.display_ws());
        }
        out
    }

    fn indices_with_id(&self, id: u32) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id == Some(id))
            .map(|(i, _)| i)
            .collect()
    }

    /// Word to translate for token `id`: the token itself, or particle + verb
    /// when a separable verb is split over two tokens.
    pub fn lookup_query(&self, id: u32) -> Result<String, TokenDataError> {
        let indices = self.indices_with_id(id);
        match indices.as_slice() {
            [] => Err(TokenDataError::UnknownId(id)),
            [only] => Ok(self.tokens[*only].text.clone()),
            [first, second] => {
                let (a, b) = (&self.tokens[*first], &self.tokens[*second]);
                // The particle carries the merged word; it trails the verb otherwise.
                let (particle, verb) = if a.merged_particle.is_some() && b.merged_particle.is_none() {
                    (a, b)
                } else {
                    (b, a)
                };
                Ok(format!("{}{}", particle.text, verb.text))
            }
            more => Err(TokenDataError::TooManySharedId {
                id,
                count: more.len(),
            }),
        }
    }

    pub fn set_lookup(&mut self, id: u32, lookup: Lookup) {
        for token in self.tokens.iter_mut().filter(|t| t.id == Some(id)) {
            token.lookup = lookup.clone();
        }
    }

    pub fn lookup_of(&self, id: u32) -> Option<&Lookup> {
        self.tokens.iter().find(|t| t.id == Some(id)).map(|t| &t.lookup)
    }

    /// Distinct clickable ids in reading order.
    pub fn clickable_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for id in self.tokens.iter().filter_map(|t| t.id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steht_auf() -> SentenceData {
        let mut verb = Token::new("steht", " ", Some(3));
        verb.is_separable = true;
        let mut particle = Token::new("auf", "", Some(3));
        particle.is_separable = true;
        particle.merged_particle = Some("aufsteht".to_string());
        SentenceData {
            message: "Er steht auf.".to_string(),
            tokens: vec![
                Token::new("Er", " ", Some(0)),
                verb,
                particle,
                Token::new(".", "", None),
            ],
            focus_words: vec!["aufstehen".to_string()],
        }
    }

    #[test]
    fn display_text_uses_non_breaking_spaces() {
        let data = SentenceData {
            message: "Ich gehe".to_string(),
            tokens: vec![Token::new("Ich", " ", Some(0)), Token::new("gehe", "", Some(4))],
            focus_words: Vec::new(),
        };
        assert_eq!(data.display_text(), "Ich\u{00a0}gehe");
    }

    #[test]
    fn other_whitespace_is_kept_verbatim() {
        let token = Token::new("Hallo", "\n", Some(0));
        assert_eq!(token.display_ws(), "\n");
    }

    #[test]
    fn single_token_query_is_its_text() {
        assert_eq!(steht_auf().lookup_query(0).unwrap(), "Er");
    }

    #[test]
    fn separable_verb_query_puts_particle_first() {
        assert_eq!(steht_auf().lookup_query(3).unwrap(), "aufsteht");
    }

    #[test]
    fn separable_verb_without_merged_word_uses_later_token_as_particle() {
        let data = SentenceData {
            message: "Sie ruft an".to_string(),
            tokens: vec![
                Token::new("Sie", " ", Some(0)),
                Token::new("ruft", " ", Some(4)),
                Token::new("an", "", Some(4)),
            ],
            focus_words: Vec::new(),
        };
        assert_eq!(data.lookup_query(4).unwrap(), "anruft");
    }

    #[test]
    fn three_tokens_sharing_an_id_is_an_error() {
        let data = SentenceData {
            message: "a b c".to_string(),
            tokens: vec![
                Token::new("a", " ", Some(1)),
                Token::new("b", " ", Some(1)),
                Token::new("c", "", Some(1)),
            ],
            focus_words: Vec::new(),
        };
        assert_eq!(
            data.lookup_query(1),
            Err(TokenDataError::TooManySharedId { id: 1, count: 3 })
        );
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert_eq!(steht_auf().lookup_query(99), Err(TokenDataError::UnknownId(99)));
    }

    #[test]
    fn grammar_tokens_are_not_clickable() {
        let data = steht_auf();
        assert!(!data.tokens[3].is_clickable());
        assert_eq!(data.clickable_ids(), vec![0, 3]);
    }

    #[test]
    fn set_lookup_marks_both_halves_of_a_separable_verb() {
        let mut data = steht_auf();
        data.set_lookup(3, Lookup::Loading);
        assert_eq!(data.tokens[1].lookup, Lookup::Loading);
        assert_eq!(data.tokens[2].lookup, Lookup::Loading);
        assert_eq!(data.tokens[0].lookup, Lookup::Idle);
    }

    #[test]
    fn deserializes_backend_payload() {
        let json = r#"{
            "message": "Ich gehe.",
            "focus_words": ["gehen", "gehen"],
            "data": [
                {"token": "Ich", "token_ws": " ", "id": 0, "root_words": ["ich"], "is_svp": false, "full_svp_word": null},
                {"token": "gehe", "token_ws": "", "id": 4, "root_words": ["gehen"], "is_svp": false},
                {"token": ".", "token_ws": "", "id": null, "root_words": [], "is_svp": false}
            ]
        }"#;
        let data: SentenceData = serde_json::from_str(json).unwrap();
        let data = data.normalize();
        assert_eq!(data.tokens.len(), 3);
        assert_eq!(data.tokens[1].root_words, vec!["gehen"]);
        assert_eq!(data.tokens[2].id, None);
        assert_eq!(data.focus_words, vec!["gehen"]);
    }

    #[test]
    fn accepts_legacy_content_key() {
        let data: SentenceData = serde_json::from_str(r#"{"content": "Guten Morgen."}"#).unwrap();
        assert_eq!(data.message, "Guten Morgen.");
        assert!(data.tokens.is_empty());
        assert!(data.focus_words.is_empty());
    }

    #[test]
    fn lookup_state_is_not_serialized() {
        let mut data = steht_auf();
        data.set_lookup(0, Lookup::Ready("He".to_string()));
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["data"][0]["token"], "Er");
        assert!(value["data"][0].get("lookup").is_none());
        assert_eq!(value["data"][2]["full_svp_word"], "aufsteht");
    }
}
