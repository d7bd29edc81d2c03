//! Declarative key-remapping rules.
//!
//! A [`MappingRule`] decides which source key a field reads from, or
//! suppresses the field entirely. Rules attach to individual fields or to
//! whole shapes; precedence between the two levels lives in the key
//! resolver ([`resolve_key`](crate::resolve_key)), not here.

use serde::{Deserialize, Serialize};

/// Naming convention used by [`MappingRule::MapCase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseConvention {
    /// `lowerCamelCase`
    Camel,
    /// `snake_case`
    Snake,
    /// `kebab-case`
    Kebab,
}

/// Outcome of resolving a mapping rule for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResolution {
    /// Read the field's value from this source key.
    Key(String),
    /// Do not read or write the field at all.
    Omit,
}

/// A declarative strategy remapping one field's source key.
///
/// # Examples
///
/// ```
/// use datamap_core::{CaseConvention, KeyResolution, MappingRule};
///
/// let rename = MappingRule::rename("user_name");
/// assert_eq!(rename.resolve("name"), KeyResolution::Key("user_name".into()));
///
/// let case = MappingRule::case(CaseConvention::Snake, CaseConvention::Camel);
/// assert_eq!(case.resolve("camelCased"), KeyResolution::Key("camel_cased".into()));
///
/// assert_eq!(MappingRule::Skip.resolve("anything"), KeyResolution::Omit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingRule {
    /// Read from exactly this source key.
    MapFrom(String),
    /// Convert the field name between naming conventions: the name is
    /// written in the `to` convention, the source key uses `from`.
    MapCase {
        /// Convention the source keys are written in.
        from: CaseConvention,
        /// Convention the field names are written in.
        to: CaseConvention,
    },
    /// Never populate the field, regardless of input.
    Skip,
}

impl MappingRule {
    /// Shorthand for [`MappingRule::MapFrom`].
    pub fn rename(key: impl Into<String>) -> Self {
        Self::MapFrom(key.into())
    }

    /// Shorthand for [`MappingRule::MapCase`].
    pub fn case(from: CaseConvention, to: CaseConvention) -> Self {
        Self::MapCase { from, to }
    }

    /// The common "camelCase fields fed from snake_case keys" rule.
    pub fn from_snake() -> Self {
        Self::MapCase {
            from: CaseConvention::Snake,
            to: CaseConvention::Camel,
        }
    }

    /// Resolves the source key for a field carrying this rule.
    ///
    /// A rule that cannot produce a usable key resolves to
    /// [`KeyResolution::Omit`] rather than erroring; the field is then
    /// silently left untouched during fill.
    pub fn resolve(&self, field_name: &str) -> KeyResolution {
        match self {
            Self::MapFrom(key) => KeyResolution::Key(key.clone()),
            Self::MapCase { from, to } => match convert_case(field_name, *from, *to) {
                Some(key) => KeyResolution::Key(key),
                None => KeyResolution::Omit,
            },
            Self::Skip => KeyResolution::Omit,
        }
    }
}

/// Converts `name` written in the `to` convention into the `from`
/// convention: split into words per `to`, re-join per `from`.
fn convert_case(name: &str, from: CaseConvention, to: CaseConvention) -> Option<String> {
    let words = split_words(name, to);
    if words.is_empty() {
        return None;
    }
    Some(join_words(&words, from))
}

fn split_words(name: &str, convention: CaseConvention) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    match convention {
        // Split before each uppercase letter.
        CaseConvention::Camel => {
            let mut current = String::new();
            for ch in name.chars() {
                if ch.is_uppercase() && !current.is_empty() {
                    words.push(current);
                    current = String::new();
                }
                current.extend(ch.to_lowercase());
            }
            if !current.is_empty() {
                words.push(current);
            }
        }
        // Split on non-letter separators.
        CaseConvention::Snake | CaseConvention::Kebab => {
            for word in name.split(|ch: char| !ch.is_alphabetic()) {
                if !word.is_empty() {
                    words.push(word.to_lowercase());
                }
            }
        }
    }
    words
}

fn join_words(words: &[String], convention: CaseConvention) -> String {
    match convention {
        CaseConvention::Snake => words.join("_"),
        CaseConvention::Kebab => words.join("-"),
        CaseConvention::Camel => {
            let mut out = String::new();
            for (index, word) in words.iter().enumerate() {
                if index == 0 {
                    out.push_str(word);
                } else {
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        out.extend(first.to_uppercase());
                        out.push_str(chars.as_str());
                    }
                }
            }
            out
        }
    }
}
