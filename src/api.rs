//! Dictionary API requests and responses.
//!
//! Only request URLs and response decoding live here; fetching is left to
//! the caller. Failures reported by the API arrive as an `error.info`
//! message and surface as [`Error::Api`].

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// MediaWiki API endpoint for article pages and search.
pub const API_ENDPOINT: &str = "https://en.wiktionary.org/w/api.php";

/// The glossary is fetched from the mobile host.
pub const MOBILE_API_ENDPOINT: &str = "https://en.m.wiktionary.org/w/api.php";

/// Title of the glossary appendix page.
pub const GLOSSARY_PAGE: &str = "Appendix:Glossary";

/// Shorter search terms are not sent.
pub const MIN_SEARCH_LEN: usize = 3;

const SEARCH_LIMIT: u32 = 10;

const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// `action=parse` URL for a word's article.
pub fn page_url(word: &str) -> String {
    format!(
        "{API_ENDPOINT}?action=parse&format=json&page={}&pst=1&disableeditsection=1&disabletoc=1&formatversion=2&origin=*",
        encode(word)
    )
}

/// Full-text search URL over the main namespace.
pub fn search_url(term: &str) -> String {
    format!(
        "{API_ENDPOINT}?action=query&format=json&list=search&formatversion=2&srsearch={}&srnamespace=0&srlimit={SEARCH_LIMIT}&origin=*",
        encode(term)
    )
}

/// `action=parse` URL for the glossary appendix.
pub fn glossary_url() -> String {
    format!(
        "{MOBILE_API_ENDPOINT}?action=parse&format=json&page={}&disableeditsection=1&formatversion=2&origin=*",
        encode(GLOSSARY_PAGE)
    )
}

/// Whether a search box value is long enough to query.
pub fn should_search(term: &str) -> bool {
    term.trim().chars().count() >= MIN_SEARCH_LEN
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        if err.info.is_empty() {
            Error::Api(err.code)
        } else {
            Error::Api(err.info)
        }
    }
}

/// Page HTML from `action=parse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPage {
    pub title: String,
    pub page_id: u64,
    pub text: String,
}

// formatversion=2 returns `text` as a string; older responses wrap it as `{"*": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageText {
    Plain(String),
    Legacy {
        #[serde(rename = "*")]
        html: String,
    },
}

#[derive(Deserialize)]
struct RawParsedPage {
    #[serde(default)]
    title: String,
    #[serde(default, rename = "pageid")]
    page_id: u64,
    text: PageText,
}

#[derive(Deserialize)]
struct ParseEnvelope {
    error: Option<ApiError>,
    parse: Option<RawParsedPage>,
}

/// Decode an `action=parse` response body.
pub fn decode_parse_response(json: &str) -> Result<ParsedPage> {
    let envelope: ParseEnvelope = serde_json::from_str(json)?;
    if let Some(err) = envelope.error {
        return Err(err.into());
    }
    let raw = envelope
        .parse
        .ok_or_else(|| Error::Api("response has no parse result".into()))?;

    let text = match raw.text {
        PageText::Plain(html) | PageText::Legacy { html } => html,
    };
    Ok(ParsedPage {
        title: raw.title,
        page_id: raw.page_id,
        text,
    })
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    #[serde(default, rename = "pageid")]
    pub page_id: u64,
    #[serde(default)]
    pub snippet: String,
}

/// Search results with exact title matches ranked first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub total_hits: u64,
    pub hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchInfo {
    #[serde(default, rename = "totalhits")]
    total_hits: u64,
}

#[derive(Deserialize)]
struct SearchQuery {
    searchinfo: Option<SearchInfo>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    error: Option<ApiError>,
    query: Option<SearchQuery>,
}

/// Decode a `list=search` response body for `term`.
pub fn decode_search_response(json: &str, term: &str) -> Result<SearchResults> {
    let envelope: SearchEnvelope = serde_json::from_str(json)?;
    if let Some(err) = envelope.error {
        return Err(err.into());
    }
    let query = envelope
        .query
        .ok_or_else(|| Error::Api("response has no query result".into()))?;

    let mut hits = query.search;
    // Stable: non-exact hits keep the API's relevance order.
    hits.sort_by_key(|hit| hit.title != term);

    Ok(SearchResults {
        total_hits: query.searchinfo.map(|info| info.total_hits).unwrap_or(0),
        hits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_encoded() {
        let url = page_url("hacer caso");
        assert!(url.starts_with("https://en.wiktionary.org/w/api.php?action=parse"));
        assert!(url.contains("page=hacer%20caso&"));
        assert!(url.contains("formatversion=2"));

        assert!(search_url("niño").contains("srsearch=ni%C3%B1o&"));
        assert!(glossary_url().contains("en.m.wiktionary.org"));
        assert!(glossary_url().contains("page=Appendix%3AGlossary&"));
    }

    #[test]
    fn test_should_search() {
        assert!(!should_search("ab"));
        assert!(!should_search("  ab "));
        assert!(should_search("año"));
    }

    #[test]
    fn test_decode_parse_response() {
        let json = r#"{"parse": {"title": "hablar", "pageid": 42, "text": "<div class=\"mw-parser-output\"></div>"}}"#;
        let page = decode_parse_response(json).unwrap();
        assert_eq!(page.title, "hablar");
        assert_eq!(page.page_id, 42);
        assert!(page.text.starts_with("<div"));

        let legacy = r#"{"parse": {"title": "x", "text": {"*": "<p>x</p>"}}}"#;
        assert_eq!(decode_parse_response(legacy).unwrap().text, "<p>x</p>");
    }

    #[test]
    fn test_api_error_message() {
        let json = r#"{"error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}}"#;
        match decode_parse_response(json) {
            Err(Error::Api(msg)) => assert_eq!(msg, "The page you specified doesn't exist."),
            other => panic!("expected api error, got {other:?}"),
        }
        assert!(matches!(decode_parse_response("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_exact_match_ranked_first() {
        let json = r#"{"query": {"searchinfo": {"totalhits": 120}, "search": [
            {"title": "casas", "pageid": 1},
            {"title": "casa blanca", "pageid": 2},
            {"title": "casa", "pageid": 3},
            {"title": "casado", "pageid": 4}
        ]}}"#;
        let results = decode_search_response(json, "casa").unwrap();
        assert_eq!(results.total_hits, 120);
        let titles: Vec<_> = results.hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, ["casa", "casas", "casa blanca", "casado"]);
    }
}
