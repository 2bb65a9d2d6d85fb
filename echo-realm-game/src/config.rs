//! Keyword tuning document that drives entry scoring.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single scoring keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRule {
    pub word: String,
    /// Bonus XP when the keyword appears anywhere in the text
    #[serde(default)]
    pub xp: i64,
    /// Attribute grown by this keyword, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_gain: Option<i64>,
}

impl KeywordRule {
    #[must_use]
    pub fn new(word: impl Into<String>, xp: i64) -> Self {
        Self {
            word: word.into(),
            xp,
            attribute: None,
            attribute_gain: None,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>, gain: Option<i64>) -> Self {
        self.attribute = Some(attribute.into());
        self.attribute_gain = gain;
        self
    }
}

/// Complete keyword-tuning document, persisted under the `config` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KeywordConfig {
    #[serde(default)]
    pub keywords: Vec<KeywordRule>,
    /// Free-form tuning knobs carried through export/import untouched
    #[serde(default)]
    pub tuning: Map<String, Value>,
}

impl KeywordConfig {
    /// Empty config used until the remote resource has been fetched.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_keywords(keywords: Vec<KeywordRule>) -> Self {
        Self {
            keywords,
            tuning: Map::new(),
        }
    }

    /// Parse the static config resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a keyword config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remote_resource_without_tuning() {
        let json = r#"{
            "keywords": [
                { "word": "Sport", "xp": 5, "attribute": "vitalitaet", "attributeGain": 2 },
                { "word": "Freunde", "xp": 3 }
            ]
        }"#;

        let cfg = KeywordConfig::from_json(json).unwrap();
        assert_eq!(cfg.keywords.len(), 2);
        assert_eq!(cfg.keywords[0].attribute.as_deref(), Some("vitalitaet"));
        assert_eq!(cfg.keywords[0].attribute_gain, Some(2));
        assert_eq!(cfg.keywords[1].attribute, None);
        assert!(cfg.tuning.is_empty());
    }

    #[test]
    fn serializes_camel_case_gain() {
        let cfg = KeywordConfig::from_keywords(vec![
            KeywordRule::new("lesen", 4).with_attribute("fokus", Some(1)),
        ]);
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(value["keywords"][0]["attributeGain"], 1);
        assert!(value["tuning"].is_object());
    }
}
