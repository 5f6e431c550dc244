use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::VocabConfig;
use crate::error::DataPrepError;

/// The closed set of characters the model can predict, each mapped to a
/// unique integer ID, plus the reserved `unk`, `blank` and `silence` tokens.
///
/// IDs are contiguous from 0. The blank token doubles as the padding token;
/// the silence token is the word delimiter, so `encode` maps `' '` onto it.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    id_to_token: HashMap<u32, String>,
    unk_id: u32,
    blank_id: u32,
    silence_id: u32,
    unk_token: String,
    blank_token: String,
    silence_token: String,
}

impl Vocabulary {
    pub fn load(path: &Path, names: &VocabConfig) -> Result<Self, DataPrepError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| DataPrepError::io("read vocabulary file", e))?;
        let raw: HashMap<String, u32> = serde_json::from_str(&data)
            .map_err(|e| DataPrepError::json("parse vocabulary file", e))?;
        Self::from_map(raw, names)
    }

    pub fn from_map(
        raw: HashMap<String, u32>,
        names: &VocabConfig,
    ) -> Result<Self, DataPrepError> {
        if raw.is_empty() {
            return Err(DataPrepError::invalid_vocabulary("vocabulary file is empty"));
        }

        let mut ids: Vec<u32> = raw.values().copied().collect();
        ids.sort_unstable();
        for (expected, &id) in ids.iter().enumerate() {
            let expected = expected as u32;
            if id < expected {
                return Err(DataPrepError::invalid_vocabulary(format!(
                    "duplicate ID {id}"
                )));
            }
            if id > expected {
                return Err(DataPrepError::invalid_vocabulary(format!(
                    "IDs are not contiguous: missing ID {expected}"
                )));
            }
        }

        let lookup = |token: &str| {
            raw.get(token).copied().ok_or_else(|| {
                DataPrepError::invalid_vocabulary(format!("reserved token `{token}` is missing"))
            })
        };
        let unk_id = lookup(&names.unk)?;
        let blank_id = lookup(&names.blank)?;
        let silence_id = lookup(&names.silence)?;

        let id_to_token = raw.iter().map(|(k, &v)| (v, k.clone())).collect();
        Ok(Self {
            token_to_id: raw,
            id_to_token,
            unk_id,
            blank_id,
            silence_id,
            unk_token: names.unk.clone(),
            blank_token: names.blank.clone(),
            silence_token: names.silence.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }

    pub fn blank_id(&self) -> u32 {
        self.blank_id
    }

    /// The padding ID used by the collator. Same as the blank ID.
    pub fn pad_id(&self) -> u32 {
        self.blank_id
    }

    pub fn silence_id(&self) -> u32 {
        self.silence_id
    }

    /// Single-character tokens minus the reserved tokens: the alphabet
    /// transcripts are normalized against.
    pub fn legal_characters(&self) -> HashSet<char> {
        self.token_to_id
            .keys()
            .filter(|token| {
                **token != self.unk_token
                    && **token != self.blank_token
                    && **token != self.silence_token
            })
            .filter_map(|token| {
                let mut it = token.chars();
                let c = it.next()?;
                if it.next().is_some() {
                    return None;
                }
                Some(c)
            })
            .collect()
    }

    /// Map a transcript to label IDs, character by character. Spaces become
    /// the silence (word delimiter) ID; characters outside the vocabulary
    /// become the unk ID.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let mut buf = [0u8; 4];
        text.chars()
            .map(|c| {
                if c == ' ' {
                    return self.silence_id;
                }
                let key: &str = c.encode_utf8(&mut buf);
                self.token_to_id.get(key).copied().unwrap_or(self.unk_id)
            })
            .collect()
    }

    /// Map label IDs back to text. Blanks are skipped, the silence ID
    /// becomes a space, IDs outside the vocabulary are dropped.
    pub fn decode(&self, ids: &[u32]) -> String {
        let mut out = String::with_capacity(ids.len());
        for &id in ids {
            if id == self.blank_id {
                continue;
            }
            if id == self.silence_id {
                out.push(' ');
                continue;
            }
            if let Some(token) = self.id_to_token.get(&id) {
                out.push_str(token);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> VocabConfig {
        VocabConfig {
            vocab_path: "vocab.json".into(),
            unk: "<unk>".to_string(),
            blank: "<pad>".to_string(),
            silence: "|".to_string(),
        }
    }

    fn small_vocab() -> HashMap<String, u32> {
        [
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            ("|".to_string(), 2),
            ("<unk>".to_string(), 3),
            ("<pad>".to_string(), 4),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn load_resolves_reserved_tokens() {
        let vocab = Vocabulary::from_map(small_vocab(), &names()).expect("valid vocab");
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.unk_id(), 3);
        assert_eq!(vocab.blank_id(), 4);
        assert_eq!(vocab.pad_id(), 4);
        assert_eq!(vocab.silence_id(), 2);
    }

    #[test]
    fn missing_reserved_token_is_invalid() {
        let mut raw = small_vocab();
        raw.remove("<unk>");
        // IDs stay contiguous by filling the gap.
        raw.insert("c".to_string(), 3);
        let err = Vocabulary::from_map(raw, &names()).unwrap_err();
        assert!(matches!(err, DataPrepError::InvalidVocabulary { .. }));
    }

    #[test]
    fn duplicate_id_is_invalid() {
        let mut raw = small_vocab();
        raw.insert("c".to_string(), 1);
        let err = Vocabulary::from_map(raw, &names()).unwrap_err();
        assert!(matches!(err, DataPrepError::InvalidVocabulary { .. }));
    }

    #[test]
    fn gap_in_ids_is_invalid() {
        let mut raw = small_vocab();
        raw.insert("c".to_string(), 6);
        let err = Vocabulary::from_map(raw, &names()).unwrap_err();
        assert!(matches!(err, DataPrepError::InvalidVocabulary { .. }));
    }

    #[test]
    fn empty_vocab_is_invalid() {
        let err = Vocabulary::from_map(HashMap::new(), &names()).unwrap_err();
        assert!(matches!(err, DataPrepError::InvalidVocabulary { .. }));
    }

    #[test]
    fn legal_characters_exclude_reserved() {
        let vocab = Vocabulary::from_map(small_vocab(), &names()).expect("valid vocab");
        let legal = vocab.legal_characters();
        assert!(legal.contains(&'a'));
        assert!(legal.contains(&'b'));
        assert!(!legal.contains(&'|'));
        assert_eq!(legal.len(), 2);
    }

    #[test]
    fn encode_maps_space_to_silence_and_unknown_to_unk() {
        let vocab = Vocabulary::from_map(small_vocab(), &names()).expect("valid vocab");
        assert_eq!(vocab.encode("ab a"), vec![0, 1, 2, 0]);
        assert_eq!(vocab.encode("axb"), vec![0, 3, 1]);
    }

    #[test]
    fn decode_round_trips_legal_text() {
        let vocab = Vocabulary::from_map(small_vocab(), &names()).expect("valid vocab");
        let ids = vocab.encode("ab a ");
        assert_eq!(vocab.decode(&ids), "ab a ");
    }

    #[test]
    fn decode_skips_blanks() {
        let vocab = Vocabulary::from_map(small_vocab(), &names()).expect("valid vocab");
        assert_eq!(vocab.decode(&[4, 0, 4, 1, 4]), "ab");
    }

    #[test]
    fn load_fails_on_missing_file() {
        let result = Vocabulary::load(Path::new("/nonexistent/vocab.json"), &names());
        assert!(matches!(result, Err(DataPrepError::Io { .. })));
    }
}
