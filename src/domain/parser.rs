// src/domain/parser.rs
use crate::domain::error::DomainError;
use crate::domain::row::{ArticleStatus, Row};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, instrument, trace};

static ABSOLUTE_URL: OnceLock<Regex> = OnceLock::new();

fn absolute_url() -> &'static Regex {
    ABSOLUTE_URL.get_or_init(|| Regex::new(r"(?i)^https?://").expect("compile absolute url regex"))
}

/// Turns raw CSV text into rows. Lines without a usable url are dropped.
pub trait RowParser: Send + Sync + fmt::Debug {
    /// Map the tokens of one line to a row, `None` if the line has no url.
    fn parse_fields(&self, fields: Vec<String>) -> Option<Row>;

    fn parse_line(&self, line: &str) -> Option<Row> {
        if line.trim().is_empty() {
            return None;
        }
        self.parse_fields(split_fields(line))
    }

    fn parse(&self, text: &str) -> Vec<Row> {
        let text = text.trim_start_matches('\u{feff}');
        let mut lines = text.lines().peekable();

        if let Some(first) = lines.peek() {
            if is_header(first) {
                trace!("Skipping header line: {}", first);
                lines.next();
            }
        }

        let rows: Vec<Row> = lines
            .enumerate()
            .filter_map(|(i, line)| {
                let row = self.parse_line(line);
                if row.is_none() && !line.trim().is_empty() {
                    debug!("Dropping line {} without url: {}", i + 1, line);
                }
                row
            })
            .collect();
        rows
    }
}

fn is_header(line: &str) -> bool {
    line.to_lowercase().contains("title,url")
}

/// Split one line on commas outside of double quotes.
///
/// Each field is trimmed, one enclosing quote pair is stripped and `""`
/// collapses to `"`.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                fields.push(clean_field(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(clean_field(&current));
    fields
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    unquoted.replace("\"\"", "\"").trim().to_string()
}

/// Columns by index: title, url, time_added, tags, status.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionalParser;

impl RowParser for PositionalParser {
    fn parse_fields(&self, fields: Vec<String>) -> Option<Row> {
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();

        let title = next();
        let url = next();
        if url.is_empty() {
            return None;
        }
        Some(Row {
            title,
            url,
            time_added: next(),
            tags: next(),
            status: next(),
        })
    }
}

/// Content sniffing for exports with unknown column order.
///
/// The first `http(s)://` token is the url. A token equal to a status keyword
/// is the status; on a two-token line the non-url token is the status. The
/// first remaining non-empty token becomes the title.
#[derive(Debug, Default, Clone, Copy)]
pub struct LenientParser;

impl RowParser for LenientParser {
    fn parse_fields(&self, fields: Vec<String>) -> Option<Row> {
        let url_idx = fields.iter().position(|f| absolute_url().is_match(f))?;
        let mut row = Row::from_url(fields[url_idx].clone());

        if fields.len() == 2 {
            row.status = fields[1 - url_idx].clone();
            return Some(row);
        }

        let status_idx = fields
            .iter()
            .enumerate()
            .position(|(i, f)| i != url_idx && ArticleStatus::is_keyword(f));
        if let Some(i) = status_idx {
            row.status = fields[i].clone();
        }

        if let Some(title) = fields
            .iter()
            .enumerate()
            .find(|(i, f)| *i != url_idx && Some(*i) != status_idx && !f.is_empty())
            .map(|(_, f)| f.clone())
        {
            row.title = title;
        }

        Some(row)
    }
}

/// Which parsing strategy the caller asked for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Positional,
    Lenient,
}

impl ParseMode {
    pub fn parser(&self) -> Box<dyn RowParser> {
        match self {
            ParseMode::Positional => Box::new(PositionalParser),
            ParseMode::Lenient => Box::new(LenientParser),
        }
    }
}

impl FromStr for ParseMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positional" => Ok(ParseMode::Positional),
            "lenient" => Ok(ParseMode::Lenient),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown parse mode '{}', expected 'positional' or 'lenient'",
                other
            ))),
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Positional => write!(f, "positional"),
            ParseMode::Lenient => write!(f, "lenient"),
        }
    }
}

/// Parse `text` with the strategy selected by `mode`.
#[instrument(level = "debug", skip(text), fields(len = text.len()))]
pub fn parse_rows(text: &str, mode: ParseMode) -> Vec<Row> {
    let rows = mode.parser().parse(text);
    debug!("Parsed {} rows in {} mode", rows.len(), mode);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_quoted_comma_when_split_then_single_field() {
        let fields = split_fields(r#""a,b",http://x.com"#);
        assert_eq!(fields, vec!["a,b", "http://x.com"]);
    }

    #[test]
    fn given_doubled_quotes_when_split_then_literal_quote() {
        let fields = split_fields(r#""say ""hi""",https://example.com"#);
        assert_eq!(fields[0], r#"say "hi""#);
        assert_eq!(fields[1], "https://example.com");
    }

    #[test]
    fn given_trailing_commas_when_split_then_empty_fields() {
        let fields = split_fields("t,https://example.com,,,");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[4], "");
    }

    #[test]
    fn given_header_when_parse_positional_then_header_skipped() {
        let text = "Title,URL,Time Added,Tags,Status\nRust,https://rust-lang.org,1700000000,lang,archive\n";
        let rows = PositionalParser.parse(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Rust");
        assert_eq!(rows[0].url, "https://rust-lang.org");
        assert_eq!(rows[0].time_added, "1700000000");
        assert_eq!(rows[0].tags, "lang");
        assert_eq!(rows[0].status, "archive");
    }

    #[test]
    fn given_first_line_not_header_when_parse_then_kept() {
        let text = "Rust,https://rust-lang.org\nTokio,https://tokio.rs";
        let rows = PositionalParser.parse(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Rust");
    }

    #[test]
    fn given_missing_columns_when_parse_positional_then_defaults_empty() {
        let rows = PositionalParser.parse("Only title,https://example.com");
        assert_eq!(rows[0].time_added, "");
        assert_eq!(rows[0].tags, "");
        assert_eq!(rows[0].status, "");
    }

    #[test]
    fn given_row_without_url_when_parse_positional_then_dropped() {
        let text = "a,https://example.com\njust a title\n\n   \nb,https://example.org\r\n";
        let rows = PositionalParser.parse(text);
        let urls: Vec<&str> = rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com", "https://example.org"]);
    }

    #[test]
    fn given_bom_and_crlf_when_parse_then_clean_fields() {
        let text = "\u{feff}title,url\r\n\"Hello\",https://example.com\r\n";
        let rows = PositionalParser.parse(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Hello");
        assert_eq!(rows[0].url, "https://example.com");
    }

    #[test]
    fn given_url_in_any_column_when_parse_lenient_then_found() {
        let rows = LenientParser.parse("archive,My Title,https://example.com/a");
        assert_eq!(rows[0].url, "https://example.com/a");
        assert_eq!(rows[0].status, "archive");
        assert_eq!(rows[0].title, "My Title");
    }

    #[test]
    fn given_two_tokens_when_parse_lenient_then_other_is_status() {
        let rows = LenientParser.parse("https://bad-url,unread\nsomething,HTTP://Example.com");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].url, "https://bad-url");
        assert_eq!(rows[0].status, "unread");
        assert_eq!(rows[0].title, "");
        assert_eq!(rows[1].url, "HTTP://Example.com");
        assert_eq!(rows[1].status, "something");
    }

    #[test]
    fn given_no_http_token_when_parse_lenient_then_dropped() {
        let rows = LenientParser.parse("title only,ftp://example.com,archive\nwww.example.com");
        assert!(rows.is_empty());
    }

    #[test]
    fn given_positional_column_order_when_parse_lenient_then_same_result() {
        let line = r#""Example",https://example.com,,,archive"#;
        let lenient = LenientParser.parse(line);
        let positional = PositionalParser.parse(line);
        assert_eq!(lenient[0].title, positional[0].title);
        assert_eq!(lenient[0].url, positional[0].url);
        assert_eq!(lenient[0].status, positional[0].status);
    }

    #[test]
    fn given_mode_names_when_from_str_then_parsed() {
        assert_eq!("lenient".parse::<ParseMode>().unwrap(), ParseMode::Lenient);
        assert_eq!(" Positional ".parse::<ParseMode>().unwrap(), ParseMode::Positional);
        assert!("guess".parse::<ParseMode>().is_err());
    }

    #[test]
    fn given_duplicate_urls_when_parse_then_all_rows_kept_in_order() {
        let text = "a,https://example.com\nb,https://example.com\nc,https://example.com";
        let rows = parse_rows(text, ParseMode::Positional);
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }
}
