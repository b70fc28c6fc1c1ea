use super::SearchError;
use crate::config::SearchConfig;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const REDIRECT_BASE: &str = "https://duckduckgo.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
}

/// Turn a result href into the page it points at.
///
/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`; those are
/// unwrapped. Anything else is returned unchanged.
pub fn resolve_link(href: &str) -> String {
    let Ok(base) = Url::parse(REDIRECT_BASE) else {
        return href.to_string();
    };
    let Ok(parsed) = base.join(href) else {
        return href.to_string();
    };

    if parsed.path().starts_with("/l/")
        && let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg")
    {
        return target.into_owned();
    }

    href.to_string()
}

/// Result anchors from a DuckDuckGo HTML page, at most `max`
pub fn parse_results(html: &str, max: usize) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.result__a").map_err(|e| SearchError::Parse(e.to_string()))?;

    let results = document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let title = anchor.text().collect::<String>().trim().to_string();
            Some(SearchResult {
                title,
                url: resolve_link(href),
            })
        })
        .take(max)
        .collect();

    Ok(results)
}

/// HTTP side of search: result pages and the pages they link to
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: String,
    max_results: usize,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            endpoint: SEARCH_URL.to_string(),
            max_results: config.max_results,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Query DuckDuckGo and return up to `max` results
    pub async fn search(&self, query: &str, max: usize) -> Result<Vec<SearchResult>, SearchError> {
        debug!(%query, endpoint = %self.endpoint, "searching");

        let html = self
            .http
            .post(&self.endpoint)
            .form(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_results(&html, max)
    }

    /// Fetch a page and reduce it to visible text
    pub async fn fetch_page_text(&self, url: &str) -> Result<String, SearchError> {
        debug!(%url, "fetching page");

        let html = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(super::web::extract_text(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="result">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fdocs.rs%2Ftokio&amp;rut=abc">Tokio <b>docs</b></a></h2>
          </div>
          <div class="result">
            <h2><a class="result__a" href="https://www.rust-lang.org/">Rust</a></h2>
          </div>
          <a class="result__snippet" href="https://ignored.example/">snippet</a>
          <div class="result">
            <h2><a class="result__a" href="https://third.example/">Third</a></h2>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results() {
        let results = parse_results(PAGE, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Tokio docs");
        assert_eq!(results[0].url, "https://docs.rs/tokio");
        assert_eq!(results[1].url, "https://www.rust-lang.org/");
    }

    #[test]
    fn test_parse_results_respects_max() {
        let results = parse_results(PAGE, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "Rust");
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html></html>", 5).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1"),
            "https://example.com/a?b=1"
        );
        assert_eq!(resolve_link("https://example.com/x"), "https://example.com/x");
        assert_eq!(resolve_link("//duckduckgo.com/l/?kh=1"), "//duckduckgo.com/l/?kh=1");
    }
}
