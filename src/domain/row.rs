// src/domain/row.rs
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed CSV record destined for import.
///
/// Identity is positional: two rows with the same url are imported
/// independently.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Row {
    #[builder(default)]
    pub title: String,
    pub url: String,
    #[builder(default)]
    pub time_added: String,
    #[builder(default)]
    pub tags: String,
    #[builder(default)]
    pub status: String,
}

impl Row {
    /// Row with only a url, everything else empty.
    pub fn from_url<S: Into<String>>(url: S) -> Self {
        Self {
            title: String::new(),
            url: url.into(),
            time_added: String::new(),
            tags: String::new(),
            status: String::new(),
        }
    }

    pub fn article_status(&self) -> ArticleStatus {
        ArticleStatus::from_field(&self.status)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.url)
        } else {
            write!(f, "{} ({})", self.title, self.url)
        }
    }
}

/// Read state requested for an article on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Unread,
    Archived,
}

impl ArticleStatus {
    /// Keywords the lenient parser recognises as a status column.
    pub const KEYWORDS: [&'static str; 3] = ["archive", "archived", "unread"];

    /// Unrecognised values silently map to `Unread`.
    pub fn from_field(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "archive" | "archived" => ArticleStatus::Archived,
            _ => ArticleStatus::Unread,
        }
    }

    pub fn is_keyword(value: &str) -> bool {
        let value = value.trim().to_lowercase();
        Self::KEYWORDS.contains(&value.as_str())
    }

    /// Value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Unread => "unread",
            ArticleStatus::Archived => "archive",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_archive_variants_when_map_status_then_archived() {
        assert_eq!(ArticleStatus::from_field("archive"), ArticleStatus::Archived);
        assert_eq!(ArticleStatus::from_field("  ARCHIVED "), ArticleStatus::Archived);
        assert_eq!(ArticleStatus::from_field("Archive"), ArticleStatus::Archived);
    }

    #[test]
    fn given_unknown_status_when_map_status_then_unread() {
        assert_eq!(ArticleStatus::from_field(""), ArticleStatus::Unread);
        assert_eq!(ArticleStatus::from_field("unread"), ArticleStatus::Unread);
        assert_eq!(ArticleStatus::from_field("starred"), ArticleStatus::Unread);
        assert_eq!(ArticleStatus::from_field("1"), ArticleStatus::Unread);
    }

    #[test]
    fn given_builder_without_url_when_build_then_error() {
        let result = RowBuilder::default().title("no url").build();
        assert!(result.is_err());
    }

    #[test]
    fn given_builder_with_url_when_build_then_defaults_are_empty() {
        let row = RowBuilder::default()
            .url("https://example.com")
            .status("archive")
            .build()
            .unwrap();
        assert_eq!(row.title, "");
        assert_eq!(row.tags, "");
        assert_eq!(row.article_status(), ArticleStatus::Archived);
    }
}
