//! URL slugs for products and categories.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    InvalidFormat,
}

/// A URL path segment such as `elegant-stiletto-heels`.
///
/// Lowercase ASCII letters and digits separated by single hyphens, with no
/// leading or trailing hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MAX_LENGTH: usize = 128;

    /// Parse a slug.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the input is empty, too long or malformed.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        let well_formed = s
            .split('-')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        if !well_formed {
            return Err(SlugError::InvalidFormat);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a display name, e.g. `"Ankle Boots & More"` becomes
    /// `ankle-boots-more`.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the name has no letters or digits.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let trimmed = slug.trim_end_matches('-');
        let truncated = trimmed
            .get(..Self::MAX_LENGTH)
            .unwrap_or(trimmed)
            .trim_end_matches('-');
        Self::parse(truncated)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("heels").is_ok());
        assert!(Slug::parse("elegant-stiletto-heels").is_ok());
        assert!(Slug::parse("size-38").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("Heels"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("-heels"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("heels-"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("ankle--boots"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("ankle boots"), Err(SlugError::InvalidFormat));
        assert!(matches!(
            Slug::parse(&"a".repeat(200)),
            Err(SlugError::TooLong { .. })
        ));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            Slug::from_name("Elegant Stiletto Heels").unwrap().as_str(),
            "elegant-stiletto-heels"
        );
        assert_eq!(
            Slug::from_name("  Ankle Boots & More!  ").unwrap().as_str(),
            "ankle-boots-more"
        );
        assert_eq!(Slug::from_name("!!!"), Err(SlugError::Empty));
    }
}
