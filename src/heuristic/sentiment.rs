// =============================================================================
// Headline Sentiment — lexicon vote and fallback news digest
// =============================================================================
//
// The text is lower-cased and every lexicon word found anywhere in it counts
// once, regardless of how often it repeats. score = positive hits - negative
// hits; the label needs a margin of two words to leave neutral.

use crate::types::{NewsDigest, NewsItem, Origin, Sentiment};

const POSITIVE_WORDS: &[&str] = &[
    "beat", "beats", "growth", "surge", "up", "rises", "record", "strong", "profit", "upgrade",
    "positive", "gain", "outperform",
];

const NEGATIVE_WORDS: &[&str] = &[
    "miss", "misses", "fall", "falls", "down", "drop", "weak", "loss", "downgrade", "negative",
    "decline", "probe", "investigation", "fraud", "scam", "ban",
];

pub const NO_HEADLINES_BULLET: &str = "No clear headlines provided.";
pub const HEADLINE_RISK: &str = "Headlines may omit key context; verify with primary sources.";

pub const NO_RECENT_HEADLINES_BULLET: &str = "No recent headlines found.";
pub const HEADLINES_UNAVAILABLE_RISK: &str = "Headlines unavailable or blocked; try again later.";

/// Titles inspected when picking bullets.
const BULLET_SCAN_ITEMS: usize = 5;
const MAX_BULLETS: usize = 3;

/// Positive minus negative lexicon hits.
pub fn lexicon_score(text: &str) -> i32 {
    let t = text.to_lowercase();
    let hits = |words: &[&str]| words.iter().filter(|w| t.contains(*w)).count() as i32;
    hits(POSITIVE_WORDS) - hits(NEGATIVE_WORDS)
}

pub fn classify_sentiment(text: &str) -> Sentiment {
    match lexicon_score(text) {
        s if s > 1 => Sentiment::Positive,
        s if s < -1 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// Title and snippet of every item, space-joined.
pub fn joined_text(items: &[NewsItem]) -> String {
    items
        .iter()
        .map(|i| format!("{} {}", i.title, i.snippet.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic digest: lexicon sentiment plus up to three headline bullets.
pub fn summarize_headlines(items: &[NewsItem]) -> NewsDigest {
    let sentiment = classify_sentiment(&joined_text(items));

    let mut bullets: Vec<String> = items
        .iter()
        .take(BULLET_SCAN_ITEMS)
        .map(|i| i.title.trim())
        .filter(|t| !t.is_empty())
        .take(MAX_BULLETS)
        .map(str::to_string)
        .collect();
    if bullets.is_empty() {
        bullets.push(NO_HEADLINES_BULLET.to_string());
    }

    NewsDigest {
        bullets,
        sentiment,
        risk: HEADLINE_RISK.to_string(),
        origin: Origin::Heuristic,
    }
}

/// Digest returned when a live source yields nothing to summarise.
pub fn no_recent_headlines() -> NewsDigest {
    NewsDigest {
        bullets: vec![NO_RECENT_HEADLINES_BULLET.to_string()],
        sentiment: Sentiment::Neutral,
        risk: HEADLINES_UNAVAILABLE_RISK.to_string(),
        origin: Origin::Heuristic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, snippet: Option<&str>) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            snippet: snippet.map(str::to_string),
        }
    }

    #[test]
    fn needs_margin_of_two() {
        assert_eq!(classify_sentiment("record profit"), Sentiment::Positive);
        assert_eq!(classify_sentiment("profit"), Sentiment::Neutral);
        assert_eq!(classify_sentiment("FRAUD PROBE"), Sentiment::Negative);
        assert_eq!(classify_sentiment("profit and loss"), Sentiment::Neutral);
    }

    #[test]
    fn repeated_words_count_once() {
        assert_eq!(lexicon_score("profit profit profit"), 1);
    }

    #[test]
    fn matches_inside_longer_words() {
        // "upgrade" also contains "up".
        assert_eq!(lexicon_score("analyst upgrade"), 2);
    }

    #[test]
    fn empty_items_produce_placeholder_bullet() {
        let d = summarize_headlines(&[]);
        assert_eq!(d.bullets, vec![NO_HEADLINES_BULLET.to_string()]);
        assert_eq!(d.sentiment, Sentiment::Neutral);
        assert_eq!(d.origin, Origin::Heuristic);
        assert_eq!(d.risk, HEADLINE_RISK);
    }

    #[test]
    fn blank_titles_are_skipped() {
        let items = vec![item("   ", Some("record growth")), item("", None)];
        let d = summarize_headlines(&items);
        assert_eq!(d.bullets, vec![NO_HEADLINES_BULLET.to_string()]);
        // Snippets still feed the sentiment vote.
        assert_eq!(d.sentiment, Sentiment::Positive);
    }

    #[test]
    fn at_most_three_bullets_in_input_order() {
        let items: Vec<NewsItem> = (1..=6).map(|i| item(&format!(" headline {i} "), None)).collect();
        let d = summarize_headlines(&items);
        assert_eq!(d.bullets, vec!["headline 1", "headline 2", "headline 3"]);
    }

    #[test]
    fn only_first_five_items_are_scanned_for_bullets() {
        let mut items: Vec<NewsItem> = (0..5).map(|_| item("", None)).collect();
        items.push(item("late headline", None));
        let d = summarize_headlines(&items);
        assert_eq!(d.bullets, vec![NO_HEADLINES_BULLET.to_string()]);
    }

    #[test]
    fn no_recent_headlines_digest() {
        let d = no_recent_headlines();
        assert_eq!(d.bullets, vec![NO_RECENT_HEADLINES_BULLET.to_string()]);
        assert_eq!(d.sentiment, Sentiment::Neutral);
        assert_eq!(d.origin, Origin::Heuristic);
    }
}
