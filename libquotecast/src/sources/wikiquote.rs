//! Wikiquote lookup source
//!
//! Resolves authors against the MediaWiki API of en.wikiquote.org: a title
//! search picks the page, the page wikitext is fetched, and quotes are
//! extracted from its top-level bullet markup. Disambiguation pages are
//! reported as ambiguous rather than scraped.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, SkipError};
use crate::sources::QuoteSource;

const DEFAULT_API_URL: &str = "https://en.wikiquote.org/w/api.php";

/// Quote source backed by the Wikiquote MediaWiki API
pub struct WikiquoteSource {
    client: reqwest::Client,
    api_url: String,
}

impl WikiquoteSource {
    pub fn new() -> Self {
        Self::with_api_url(DEFAULT_API_URL)
    }

    /// Point the source at a different MediaWiki endpoint
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    async fn get_json(
        &self,
        author: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let unavailable = |reason: String| SkipError::SourceUnavailable {
            author: author.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| unavailable(format!("malformed API response: {}", e)))?)
    }

    /// Find the page title for an author via full-text title search
    async fn search_title(&self, author: &str) -> Result<String> {
        let body = self
            .get_json(
                author,
                &[
                    ("action", "query"),
                    ("list", "search"),
                    ("srsearch", author),
                    ("srlimit", "1"),
                    ("format", "json"),
                ],
            )
            .await?;

        match body["query"]["search"][0]["title"].as_str() {
            Some(title) => {
                debug!(author, title, "resolved wikiquote page");
                Ok(title.to_string())
            }
            None => Err(SkipError::AuthorNotFound {
                author: author.to_string(),
            }
            .into()),
        }
    }

    /// Fetch the raw wikitext of a page
    async fn fetch_wikitext(&self, author: &str, title: &str) -> Result<String> {
        let body = self
            .get_json(
                author,
                &[
                    ("action", "parse"),
                    ("page", title),
                    ("prop", "wikitext"),
                    ("format", "json"),
                ],
            )
            .await?;

        if body["error"]["code"].as_str() == Some("missingtitle") {
            return Err(SkipError::AuthorNotFound {
                author: author.to_string(),
            }
            .into());
        }

        body["parse"]["wikitext"]["*"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                SkipError::SourceUnavailable {
                    author: author.to_string(),
                    reason: "no wikitext in parse response".to_string(),
                }
                .into()
            })
    }
}

impl Default for WikiquoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for WikiquoteSource {
    async fn lookup(&self, author: &str) -> Result<Vec<String>> {
        let title = self.search_title(author).await?;
        let wikitext = self.fetch_wikitext(author, &title).await?;

        if is_disambiguation(&wikitext) {
            return Err(SkipError::AuthorAmbiguous {
                author: author.to_string(),
            }
            .into());
        }

        let quotes = quotes_from_wikitext(&wikitext);
        debug!(author, count = quotes.len(), "extracted quotes");
        if quotes.is_empty() {
            return Err(SkipError::AuthorNotFound {
                author: author.to_string(),
            }
            .into());
        }

        Ok(quotes)
    }

    fn name(&self) -> &str {
        "wikiquote"
    }
}

/// Whether a page is a disambiguation page rather than an author page
fn is_disambiguation(wikitext: &str) -> bool {
    let lower = wikitext.to_lowercase();
    lower.contains("{{disambiguation") || lower.contains("{{disambig") || lower.contains("{{hndis")
}

/// Extract quotes from top-level `*` bullets, skipping `**` source bullets
///
/// Extraction stops at the trailing link sections, whose bullets are not
/// quotes.
fn quotes_from_wikitext(wikitext: &str) -> Vec<String> {
    let mut quotes = Vec::new();
    for line in wikitext.lines() {
        if line.starts_with("==") {
            let heading = line.trim_matches(|c: char| c == '=' || c.is_whitespace());
            if matches!(
                heading.to_lowercase().as_str(),
                "external links" | "see also" | "about" | "quotes about"
            ) {
                break;
            }
            continue;
        }
        if line.starts_with("**") {
            continue;
        }
        let Some(rest) = line.strip_prefix('*') else {
            continue;
        };

        let cleaned = strip_wiki_markup(rest.trim_start());
        // lines still carrying templates are page furniture, not quotes
        if cleaned.is_empty() || cleaned.contains("{{") {
            continue;
        }
        quotes.push(cleaned);
    }
    quotes
}

/// Reduce inline wiki markup to plain text
fn strip_wiki_markup(raw: &str) -> String {
    let mut text = raw.replace("'''", "").replace("''", "");

    // [[target|label]] keeps the label, [[target]] keeps the target
    while let Some(start) = text.find("[[") {
        let Some(len) = text[start..].find("]]") else {
            break;
        };
        let end = start + len;
        let label = {
            let inner = &text[start + 2..end];
            inner.rsplit('|').next().unwrap_or(inner).to_string()
        };
        text.replace_range(start..end + 2, &label);
    }

    for tag in ["<br />", "<br/>", "<br>"] {
        text = text.replace(tag, " ");
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "\
'''Lucius Annaeus Seneca''' was a Roman Stoic philosopher.

== Quotes ==
* Luck is what happens when [[preparation]] meets opportunity.
** ''De Providentia''
* ''Errare humanum est'', sed perseverare diabolicum.
** Attributed
* All cruelty springs from [[weakness|frailty]].
*
* {{citation needed}}

== External links ==
* [https://example.org Seneca archive]
";

    #[test]
    fn test_quotes_extracted_from_top_level_bullets() {
        let quotes = quotes_from_wikitext(PAGE);
        assert_eq!(
            quotes,
            vec![
                "Luck is what happens when preparation meets opportunity.",
                "Errare humanum est, sed perseverare diabolicum.",
                "All cruelty springs from frailty.",
            ]
        );
    }

    #[test]
    fn test_extraction_stops_at_link_sections() {
        let quotes = quotes_from_wikitext(PAGE);
        assert!(!quotes.iter().any(|q| q.contains("example.org")));
    }

    #[test]
    fn test_source_bullets_are_skipped() {
        let quotes = quotes_from_wikitext("* The quote.\n** The source.\n");
        assert_eq!(quotes, vec!["The quote."]);
    }

    #[test]
    fn test_template_lines_are_skipped() {
        let quotes = quotes_from_wikitext("* {{quote box|text}}\n* A real quote.\n");
        assert_eq!(quotes, vec!["A real quote."]);
    }

    #[test]
    fn test_strip_wiki_markup_links() {
        assert_eq!(
            strip_wiki_markup("See [[Stoicism|the Stoics]] and [[Rome]]."),
            "See the Stoics and Rome."
        );
    }

    #[test]
    fn test_strip_wiki_markup_emphasis_and_breaks() {
        assert_eq!(
            strip_wiki_markup("'''Bold''' and ''italic''<br/>next line"),
            "Bold and italic next line"
        );
    }

    #[test]
    fn test_strip_wiki_markup_unclosed_link_left_alone() {
        assert_eq!(strip_wiki_markup("broken [[link"), "broken [[link");
    }

    #[test]
    fn test_disambiguation_detection() {
        assert!(is_disambiguation("{{disambiguation}}\n* [[Francis Bacon]]"));
        assert!(is_disambiguation("{{Disambig|Bacon}}"));
        assert!(is_disambiguation("{{hndis|Bacon, Francis}}"));
        assert!(!is_disambiguation(PAGE));
    }

    #[test]
    fn test_source_name() {
        assert_eq!(WikiquoteSource::new().name(), "wikiquote");
    }
}
