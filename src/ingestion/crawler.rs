//! Same-domain link discovery for a published book site.

use std::collections::HashSet;

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Collects page URLs reachable from `base`, breadth-first, up to `depth`
/// levels of links. The base page itself is always first in the result.
///
/// Discovery degrades rather than fails: a page that cannot be fetched is
/// logged and skipped, and in the worst case the result is just `[base]`.
pub async fn discover_urls(client: &Client, base: &Url, depth: usize) -> Vec<Url> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(base.as_str().to_string());

    let mut discovered = vec![base.clone()];
    let mut frontier = vec![base.clone()];

    for level in 0..depth {
        let mut next = Vec::new();
        for url in &frontier {
            let body = match fetch_body(client, url).await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(%url, level, "skipping page during crawl: {err}");
                    continue;
                }
            };
            // Relative links resolve against the page they appear on; the
            // host filter still pins the crawl to the base domain.
            for link in extract_same_domain_links(url, &body) {
                if seen.insert(link.as_str().to_string()) {
                    discovered.push(link.clone());
                    next.push(link);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    tracing::info!(pages = discovered.len(), %base, "crawl finished");
    discovered
}

async fn fetch_body(client: &Client, url: &Url) -> Result<String, reqwest::Error> {
    client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Extracts anchor targets from `html` that stay on the same host as `base`.
///
/// Fragment-only links, non-http(s) schemes, and duplicates are dropped;
/// fragments are stripped from kept URLs. Order of first appearance is
/// preserved.
pub fn extract_same_domain_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let Ok(mut url) = base.join(href) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        if url.host_str() != base.host_str() {
            continue;
        }
        url.set_fragment(None);
        if !links.iter().any(|existing| existing == &url) {
            links.push(url);
        }
    }
    links
}
