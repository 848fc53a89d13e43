// src/domain/validation.rs
use crate::domain::row::Row;
use serde::Serialize;
use tracing::{debug, instrument};
use url::{Host, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Only the url is mandatory.
    #[default]
    UrlOnly,
    /// Every row also needs a non-empty title.
    RequireTitle,
}

impl ValidationMode {
    pub fn from_require_title(require_title: bool) -> Self {
        if require_title {
            ValidationMode::RequireTitle
        } else {
            ValidationMode::UrlOnly
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Absolute http(s) url with a host that can be resolved: a dotted domain,
/// `localhost` or an ip literal.
pub fn is_valid_article_url(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate.trim()) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.');
            domain.eq_ignore_ascii_case("localhost")
                || (domain.contains('.') && domain.split('.').all(|label| !label.is_empty()))
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

/// Fail fast on the first offending row; row numbers in messages are 1-based.
#[instrument(level = "debug", skip(rows), fields(rows = rows.len()))]
pub fn validate_rows(rows: &[Row], mode: ValidationMode) -> ValidationOutcome {
    if rows.is_empty() {
        return ValidationOutcome::rejected("CSV file is empty");
    }

    for (i, row) in rows.iter().enumerate() {
        let number = i + 1;
        if row.url.trim().is_empty() {
            return ValidationOutcome::rejected(format!("Row {}: missing URL", number));
        }
        if !is_valid_article_url(&row.url) {
            debug!("Row {} rejected: {}", number, row.url);
            return ValidationOutcome::rejected(format!(
                "Row {}: invalid URL \"{}\"",
                number, row.url
            ));
        }
        if mode == ValidationMode::RequireTitle && row.title.trim().is_empty() {
            return ValidationOutcome::rejected(format!("Row {}: missing title", number));
        }
    }

    ValidationOutcome::ok()
}
