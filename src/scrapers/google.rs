//! Google web search adapter.
//!
//! Builds the search URL for a trend and pulls candidate article links out of
//! the result page. Organic results live in `div.tF2Cxc` blocks; the first
//! anchor of each block is the result link. Older and no-JS result pages wrap
//! targets as `/url?q=<target>&...`, which is unwrapped here.

use scraper::{Html, Selector};
use url::Url;

/// Search URL asking for `num` English results about `trend`.
pub fn search_url(base: &str, trend: &str, num: usize) -> String {
    let query = format!("{} in english", trend);
    format!("{}?q={}&num={}", base, urlencoding::encode(&query), num)
}

/// Extract up to `limit` absolute http(s) result links, in page order.
pub fn extract_candidate_links(html: &str, base: &Url, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse("div.tF2Cxc").expect("valid selector");
    let anchor_selector = Selector::parse("a[href]").expect("valid selector");

    document
        .select(&result_selector)
        .filter_map(|result| result.select(&anchor_selector).next())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_result_href(href, base))
        .take(limit)
        .collect()
}

fn resolve_result_href(href: &str, base: &Url) -> Option<String> {
    let resolved = base.join(href).ok()?;
    let target = if resolved.path() == "/url" && resolved.host_str() == base.host_str() {
        let q = resolved
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?;
        Url::parse(&q).ok()?
    } else {
        resolved
    };

    match target.scheme() {
        "http" | "https" => Some(target.to_string()),
        _ => None,
    }
}
