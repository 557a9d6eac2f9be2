//! User configuration threaded through the page transform.
//!
//! Settings arrive as an explicit value. Nothing in the pipeline reads
//! ambient state, so the same page and the same settings always produce the
//! same output.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Visibility policy for a page section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionSetting {
    AlwaysShow,
    CollapsibleOpen,
    CollapsibleClosed,
    Hide,
}

impl SectionSetting {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysShow => "always-show",
            Self::CollapsibleOpen => "collapsible-open",
            Self::CollapsibleClosed => "collapsible-closed",
            Self::Hide => "hide",
        }
    }

    /// `Some(open)` for the two collapsible variants.
    pub fn collapsible(self) -> Option<bool> {
        match self {
            Self::CollapsibleOpen => Some(true),
            Self::CollapsibleClosed => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for SectionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionSetting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always-show" => Ok(Self::AlwaysShow),
            "collapsible-open" => Ok(Self::CollapsibleOpen),
            "collapsible-closed" => Ok(Self::CollapsibleClosed),
            "hide" => Ok(Self::Hide),
            other => Err(Error::InvalidSetting(other.to_string())),
        }
    }
}

/// One `(prefix, setting)` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRule {
    pub prefix: String,
    pub setting: SectionSetting,
}

impl SectionRule {
    pub fn new(prefix: impl Into<String>, setting: SectionSetting) -> Self {
        Self {
            prefix: prefix.into(),
            setting,
        }
    }

    /// A section identifier matches when it equals or starts with the prefix.
    pub fn matches(&self, identifier: &str) -> bool {
        identifier.starts_with(self.prefix.as_str())
    }
}

/// Ordered section rules; the first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionRules(Vec<SectionRule>);

impl SectionRules {
    pub fn new(rules: Vec<SectionRule>) -> Self {
        Self(rules)
    }

    /// Setting of the first rule matching `identifier`, if any.
    pub fn resolve(&self, identifier: &str) -> Option<SectionSetting> {
        self.0
            .iter()
            .find(|rule| rule.matches(identifier))
            .map(|rule| rule.setting)
    }

    /// Replace the rule for `prefix` in place, or append a new one.
    pub fn set(&mut self, prefix: &str, setting: SectionSetting) {
        match self.0.iter_mut().find(|rule| rule.prefix == prefix) {
            Some(rule) => rule.setting = setting,
            None => self.0.push(SectionRule::new(prefix, setting)),
        }
    }

    /// Drop the rule for `prefix`. Returns whether one existed.
    pub fn remove(&mut self, prefix: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|rule| rule.prefix != prefix);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(&'static str, SectionSetting)> for SectionRules {
    fn from_iter<I: IntoIterator<Item = (&'static str, SectionSetting)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(prefix, setting)| SectionRule::new(prefix, setting))
                .collect(),
        )
    }
}

// Serialized as a JSON object in rule order, the shape the web store persists.
impl Serialize for SectionRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for rule in &self.0 {
            map.serialize_entry(&rule.prefix, &rule.setting)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectionRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            List(Vec<SectionRule>),
            Object(serde_json::Map<String, serde_json::Value>),
        }

        match Shape::deserialize(deserializer)? {
            Shape::List(rules) => Ok(Self(rules)),
            Shape::Object(map) => map
                .into_iter()
                .map(|(prefix, value)| {
                    let setting = value
                        .as_str()
                        .ok_or_else(|| de::Error::custom(format!("setting for {prefix} is not a string")))?
                        .parse::<SectionSetting>()
                        .map_err(de::Error::custom)?;
                    Ok(SectionRule { prefix, setting })
                })
                .collect::<std::result::Result<Vec<_>, D::Error>>()
                .map(Self),
        }
    }
}

/// What happens to languages missing from the display list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguagePolicy {
    /// Drop them; keep displayed languages in page order.
    #[default]
    Filter,
    /// Keep every language; the display list only picks the active tab.
    KeepAll,
}

/// The user-configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    /// Languages to show, in the user's preferred order.
    pub display_languages: Vec<String>,
    /// Section visibility rules keyed by identifier prefix.
    #[serde(rename = "sectionSettings")]
    pub section_rules: SectionRules,
    pub language_policy: LanguagePolicy,
}

impl Default for UserSettings {
    fn default() -> Self {
        use SectionSetting::*;

        Self {
            display_languages: ["English", "Spanish", "Latin", "Italian"]
                .into_iter()
                .map(String::from)
                .collect(),
            section_rules: [
                ("Alternative_forms", CollapsibleClosed),
                ("Etymology", AlwaysShow),
                ("Pronunciation", Hide),
                ("Quick_conjugation", CollapsibleClosed),
                ("Conjugation", CollapsibleClosed),
                ("Usage_notes", CollapsibleOpen),
                ("Derived_terms", CollapsibleOpen),
                ("Related_terms", CollapsibleOpen),
                ("Descendants", CollapsibleOpen),
                ("Translation", CollapsibleClosed),
                ("Synonyms", CollapsibleClosed),
                ("Antonyms", CollapsibleClosed),
                ("Hypernyms", CollapsibleClosed),
                ("Hyponyms", Hide),
                ("Meronyms", Hide),
                ("Holonyms", Hide),
                ("Troponyms", Hide),
                ("Anagrams", Hide),
                ("Coordinate_terms", CollapsibleClosed),
                ("Collocations", CollapsibleClosed),
                ("Further_reading", Hide),
                ("References", Hide),
            ]
            .into_iter()
            .collect(),
            language_policy: LanguagePolicy::Filter,
        }
    }
}

impl UserSettings {
    /// Settings with no languages and no rules.
    pub fn empty() -> Self {
        Self {
            display_languages: Vec::new(),
            section_rules: SectionRules::default(),
            language_policy: LanguagePolicy::Filter,
        }
    }

    /// Parse settings JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn displays(&self, language: &str) -> bool {
        self.display_languages.iter().any(|l| l == language)
    }

    /// Turn one language on (appended last) or off.
    pub fn toggle_language(&mut self, language: &str, enabled: bool) {
        if enabled {
            if !self.displays(language) {
                self.display_languages.push(language.to_string());
            }
        } else {
            self.display_languages.retain(|l| l != language);
        }
    }

    /// Turn a batch of languages on or off, keeping existing order and
    /// never duplicating an entry.
    pub fn select_languages<'a, I>(&mut self, languages: I, enabled: bool)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for language in languages {
            self.toggle_language(language, enabled);
        }
    }

    /// Move the language at `from` to position `to`, clamped to the list.
    pub fn move_language(&mut self, from: usize, to: usize) {
        if from >= self.display_languages.len() {
            return;
        }
        let item = self.display_languages.remove(from);
        let to = to.min(self.display_languages.len());
        self.display_languages.insert(to, item);
    }

    pub fn set_section_setting(&mut self, prefix: &str, setting: SectionSetting) {
        self.section_rules.set(prefix, setting);
    }
}
