// =============================================================================
// Google News RSS source
// =============================================================================
//
// Query: "<company> (<SYMBOL>) stock OR shares OR results", localised with the
// hl/gl/ceid parameters. Only <item> elements are read; each contributes its
// <title> and the tag-stripped text of its <description>. Items without a
// title are skipped.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use super::{NewsQuery, NewsSource};
use crate::types::NewsItem;

const FEED_URL: &str = "https://news.google.com/rss/search";

#[derive(Debug, Clone)]
pub struct GoogleNewsRss {
    client: reqwest::Client,
}

impl GoogleNewsRss {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client for the news feed")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl NewsSource for GoogleNewsRss {
    #[instrument(skip(self), name = "google_news::fetch")]
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<NewsItem>> {
        let url = feed_url(query)?;
        let body = self
            .client
            .get(url)
            .send()
            .await
            .context("news feed request failed")?
            .error_for_status()
            .context("news feed returned an error status")?
            .text()
            .await
            .context("failed to read news feed body")?;

        let items = parse_items(&body, query.clamped_limit());
        debug!(count = items.len(), "news feed parsed");
        Ok(items)
    }
}

/// Company name for well-known tickers; otherwise the ticker without its
/// exchange suffix or index caret.
pub fn guess_company(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "AAPL" => "Apple".to_string(),
        "MSFT" => "Microsoft".to_string(),
        "GOOGL" => "Google".to_string(),
        "AMZN" => "Amazon".to_string(),
        "META" => "Meta".to_string(),
        "NVDA" => "NVIDIA".to_string(),
        _ => symbol.replace(".NS", "").replace(".BSE", "").replace('^', ""),
    }
}

pub fn feed_url(query: &NewsQuery) -> Result<Url> {
    let q = format!(
        "{} ({}) stock OR shares OR results",
        guess_company(&query.symbol),
        query.symbol
    );
    let hl = format!("{}-{}", query.lang, query.region);
    let ceid = format!("{}:{}", query.region, query.lang);
    Url::parse_with_params(
        FEED_URL,
        &[
            ("q", q.as_str()),
            ("hl", hl.as_str()),
            ("gl", query.region.as_str()),
            ("ceid", ceid.as_str()),
        ],
    )
    .context("failed to build news feed URL")
}

/// Extract up to `limit` items from an RSS document.
pub fn parse_items(xml: &str, limit: usize) -> Vec<NewsItem> {
    let mut items = Vec::new();
    let mut rest = xml;
    while items.len() < limit {
        let Some(body) = next_element(&mut rest, "item") else {
            break;
        };
        let title = element_text(body, "title").map(|t| clean_text(&t)).unwrap_or_default();
        if title.is_empty() {
            continue;
        }
        // Descriptions are entity-escaped HTML: decode, strip tags, decode again.
        let snippet = element_text(body, "description")
            .map(|d| collapse_whitespace(&clean_text(&strip_tags(&clean_text(&d)))))
            .unwrap_or_default();
        items.push(NewsItem {
            title,
            snippet: Some(snippet),
        });
    }
    items
}

/// Return the inner text of the next `<tag>...</tag>` in `rest` and advance
/// past it.
fn next_element<'a>(rest: &mut &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    loop {
        let start = rest.find(&open)?;
        let after_name = &rest[start + open.len()..];
        // Reject longer tag names sharing the prefix (e.g. <itemref>).
        if !after_name.starts_with(['>', ' ', '\t', '\n', '\r']) {
            *rest = after_name;
            continue;
        }
        let content_start = after_name.find('>')? + 1;
        let content = &after_name[content_start..];
        let end = content.find(&close)?;
        *rest = &content[end + close.len()..];
        return Some(&content[..end]);
    }
}

fn element_text(body: &str, tag: &str) -> Option<String> {
    let mut cursor = body;
    next_element(&mut cursor, tag).map(str::to_string)
}

/// Unwrap CDATA, decode entities and trim.
fn clean_text(raw: &str) -> String {
    let s = raw.trim();
    let s = s
        .strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .unwrap_or(s);
    decode_entities(s).trim().to_string()
}

/// Longest entity body considered, e.g. `#x1F4C8`.
const MAX_ENTITY_LEN: usize = 8;

/// Single-pass decode of the predefined XML entities, `&nbsp;` and numeric
/// character references. Anything unrecognised is kept verbatim, so
/// `&amp;lt;` decodes to `&lt;` and not `<`.
fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= MAX_ENTITY_LEN)
            .and_then(|end| entity_char(&tail[..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity_char(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Google News</title>
<item><title>Apple beats estimates &amp; raises outlook - Reuters</title>
<link>https://example.com/a</link>
<description>&lt;a href="https://example.com/a"&gt;Apple beats estimates&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;Reuters&lt;/font&gt;</description></item>
<item><title></title><description>orphan</description></item>
<item><title><![CDATA[iPhone sales surge in India]]></title></item>
</channel></rss>"##;

    fn query(symbol: &str) -> NewsQuery {
        NewsQuery {
            symbol: symbol.to_string(),
            limit: 10,
            region: "IN".to_string(),
            lang: "en".to_string(),
        }
    }

    #[test]
    fn parses_items_and_skips_untitled() {
        let items = parse_items(FEED, 10);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Apple beats estimates & raises outlook - Reuters");
        assert_eq!(items[0].snippet.as_deref(), Some("Apple beats estimates Reuters"));
        assert_eq!(items[1].title, "iPhone sales surge in India");
        assert_eq!(items[1].snippet.as_deref(), Some(""));
    }

    #[test]
    fn numeric_references_are_decoded() {
        let xml = "<rss><channel><item><title>Apple&#8217;s record quarter &#x2014; Reuters</title>\
                   <description>&lt;b&gt;Q3&lt;/b&gt; beat &amp;#8220;big&amp;#8221;</description>\
                   </item></channel></rss>";
        let items = parse_items(xml, 5);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Apple\u{2019}s record quarter \u{2014} Reuters");
        assert_eq!(items[0].snippet.as_deref(), Some("Q3 beat \u{201c}big\u{201d}"));
    }

    #[test]
    fn unknown_or_malformed_entities_are_kept() {
        assert_eq!(decode_entities("AT&T &copy; &#xZZ; &;"), "AT&T &copy; &#xZZ; &;");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&#39;quoted&#39;"), "'quoted'");
        assert_eq!(decode_entities("&#1114112;"), "&#1114112;");
    }

    #[test]
    fn respects_limit() {
        assert_eq!(parse_items(FEED, 1).len(), 1);
    }

    #[test]
    fn channel_title_is_not_an_item() {
        let items = parse_items("<rss><channel><title>Feed</title></channel></rss>", 5);
        assert!(items.is_empty());
    }

    #[test]
    fn company_guess() {
        assert_eq!(guess_company("aapl"), "Apple");
        assert_eq!(guess_company("RELIANCE.NS"), "RELIANCE");
        assert_eq!(guess_company("^NSEI"), "NSEI");
    }

    #[test]
    fn url_is_encoded() {
        let url = feed_url(&query("AAPL")).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].0, "q");
        assert_eq!(pairs[0].1, "Apple (AAPL) stock OR shares OR results");
        assert!(pairs.contains(&("hl".to_string(), "en-IN".to_string())));
        assert!(pairs.contains(&("ceid".to_string(), "IN:en".to_string())));
    }

    #[test]
    fn clamped_limit_bounds() {
        let mut q = query("AAPL");
        q.limit = 0;
        assert_eq!(q.clamped_limit(), 1);
        q.limit = 500;
        assert_eq!(q.clamped_limit(), 20);
    }
}
