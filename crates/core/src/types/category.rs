//! Listing category enumeration.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown category.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// The fixed set of categories a listing may belong to.
///
/// Categories are stored in the database as their display name (e.g.
/// `"Digital Art"`) and appear in URLs as a lowercase slug (e.g.
/// `digital-art`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    Painting,
    Photograph,
    Sculpture,
    #[serde(rename = "Digital Art")]
    DigitalArt,
    #[serde(rename = "Mixed Media")]
    MixedMedia,
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 6] = [
        Self::Painting,
        Self::Photograph,
        Self::Sculpture,
        Self::DigitalArt,
        Self::MixedMedia,
        Self::Other,
    ];

    /// Display name, as stored in the database and shown in forms.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Painting => "Painting",
            Self::Photograph => "Photograph",
            Self::Sculpture => "Sculpture",
            Self::DigitalArt => "Digital Art",
            Self::MixedMedia => "Mixed Media",
            Self::Other => "Other",
        }
    }

    /// URL slug for category browse pages.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Painting => "paintings",
            Self::Photograph => "photographs",
            Self::Sculpture => "sculptures",
            Self::DigitalArt => "digital-art",
            Self::MixedMedia => "mixed-media",
            Self::Other => "other",
        }
    }

    /// Parse a category from its URL slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// All display names, for validation descriptors and form selects.
    #[must_use]
    pub const fn names() -> &'static [&'static str] {
        &[
            "Painting",
            "Photograph",
            "Sculpture",
            "Digital Art",
            "Mixed Media",
            "Other",
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_name() {
        assert_eq!("Digital Art".parse::<Category>().unwrap(), Category::DigitalArt);
        assert_eq!("Other".parse::<Category>().unwrap(), Category::Other);
        assert!("Watercolor".parse::<Category>().is_err());
    }

    #[test]
    fn test_slug_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_slug(category.slug()), Some(category));
        }
        assert_eq!(Category::from_slug("nonsense"), None);
    }

    #[test]
    fn test_names_match_variants() {
        assert_eq!(Category::names().len(), Category::ALL.len());
        for (name, category) in Category::names().iter().zip(Category::ALL) {
            assert_eq!(*name, category.as_str());
        }
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Category::MixedMedia).unwrap();
        assert_eq!(json, "\"Mixed Media\"");
    }
}
