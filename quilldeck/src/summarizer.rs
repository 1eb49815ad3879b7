// quilldeck/src/summarizer.rs
//!
//! Local summarizer: deterministic heuristics used when no remote model is configured.
//!
//! Two policies are available and one is picked from configuration:
//! - `SentenceBoundary`: the first sentence (or first line) of the text
//! - `LengthTiered`: the first N sentences, N taken from the requested `SummaryLength`
//!
//! Keyword extraction is shared by both policies. Nothing here touches the
//! network or the database, so the same input always yields the same output.

use crate::models::SummaryLength;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Returned by the sentence-boundary policy when the text has nothing to offer.
pub const NO_CONTENT: &str = "No content to summarize.";

/// Keywords must be longer than this many characters.
pub const MIN_KEYWORD_CHARS: usize = 3;
pub const MIN_KEYWORD_OCCURRENCES: usize = 2;
pub const MAX_KEYWORDS: usize = 5;

const TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

fn is_terminator(c: char) -> bool {
    TERMINATORS.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPolicy {
    SentenceBoundary,
    #[default]
    LengthTiered,
}

/// Output of a local summarization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSummary {
    pub content: String,
    pub keywords: Vec<String>,
    /// Tier that shaped `content`; `None` when the policy ignores tiers.
    pub length: Option<SummaryLength>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSummarizer {
    policy: SummaryPolicy,
}

impl LocalSummarizer {
    pub fn new(policy: SummaryPolicy) -> Self {
        Self { policy }
    }

    /// Summarizes `content`. A missing tier uses the medium cap; the
    /// sentence-boundary policy ignores the tier entirely.
    pub fn summarize(&self, content: &str, length: Option<SummaryLength>) -> LocalSummary {
        let (summary, applied) = match self.policy {
            SummaryPolicy::SentenceBoundary => (first_sentence(content), None),
            SummaryPolicy::LengthTiered => {
                let length = length.unwrap_or_default();
                (
                    truncate_sentences(content, length.max_sentences()),
                    Some(length),
                )
            }
        };

        LocalSummary {
            content: summary,
            keywords: extract_keywords(content),
            length: applied,
        }
    }
}

/// Byte ranges of the sentences in `text`. Each range except possibly the last
/// ends with its run of terminators; pieces without any text are folded into
/// the neighbouring sentence.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        close_span(&mut spans, text, &mut start, end);
    }

    if start < text.len() {
        close_span(&mut spans, text, &mut start, text.len());
    }

    spans
}

fn close_span(spans: &mut Vec<(usize, usize)>, text: &str, start: &mut usize, end: usize) {
    let has_text = text[*start..end]
        .chars()
        .any(|c| !c.is_whitespace() && !is_terminator(c));

    if has_text {
        spans.push((*start, end));
        *start = end;
    } else if let Some(last) = spans.last_mut() {
        last.1 = end;
        *start = end;
    }
    // Leading noise before the first sentence stays attached to it.
}

/// Number of sentences the length-tiered policy sees in `text`.
pub fn count_sentences(text: &str) -> usize {
    sentence_spans(text).len()
}

/// Keeps the first `max_sentences` sentences. Text already within the cap is
/// returned unchanged.
pub fn truncate_sentences(content: &str, max_sentences: usize) -> String {
    let spans = sentence_spans(content);
    if spans.len() <= max_sentences {
        return content.to_string();
    }

    match max_sentences.checked_sub(1).and_then(|i| spans.get(i)) {
        Some(&(_, end)) => content[..end].trim().to_string(),
        None => String::new(),
    }
}

/// First sentence with its terminator, else the first non-empty line, else [`NO_CONTENT`].
pub fn first_sentence(content: &str) -> String {
    let text = content.trim();

    if text.contains(is_terminator) {
        if let Some(&(start, end)) = sentence_spans(text).first() {
            return text[start..end].trim().to_string();
        }
    }

    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_CONTENT.to_string())
}

/// Repeated words longer than three characters, lower-cased, in order of first appearance.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for token in text.split_whitespace() {
        let token = token.to_lowercase();
        if token.chars().count() <= MIN_KEYWORD_CHARS {
            continue;
        }
        let count = counts.entry(token.clone()).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter(|token| counts[token] >= MIN_KEYWORD_OCCURRENCES)
        .take(MAX_KEYWORDS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Hello world. This is quilldeck. It summarizes text.";

    #[test]
    fn short_tier_keeps_two_sentences() {
        let summarizer = LocalSummarizer::new(SummaryPolicy::LengthTiered);
        let summary = summarizer.summarize(SAMPLE, Some(SummaryLength::Short));
        assert_eq!(summary.content, "Hello world. This is quilldeck.");
        assert_eq!(summary.length, Some(SummaryLength::Short));
    }

    #[test]
    fn content_at_the_cap_is_returned_unchanged() {
        let text = "One. Two. Three. Four. Five.";
        assert_eq!(count_sentences(text), 5);
        assert_eq!(truncate_sentences(text, 5), text);

        let untrimmed = "  Alpha. Beta.  ";
        assert_eq!(truncate_sentences(untrimmed, 2), untrimmed);
    }

    #[test]
    fn one_sentence_over_the_cap_is_cut_to_the_cap() {
        let text = "One. Two. Three. Four. Five. Six.";
        assert_eq!(truncate_sentences(text, 5), "One. Two. Three. Four. Five.");

        let text = "One. Two. Three";
        assert_eq!(truncate_sentences(text, 2), "One. Two.");
    }

    #[test]
    fn missing_tier_uses_medium_cap() {
        let text = "a1. a2. a3. a4. a5. a6. a7.";
        let summarizer = LocalSummarizer::default();
        let summary = summarizer.summarize(text, None);
        assert_eq!(summary.content, "a1. a2. a3. a4. a5.");
        assert_eq!(summary.length, Some(SummaryLength::Medium));
        assert_eq!(
            summarizer.summarize(text, Some(SummaryLength::Long)).content,
            text
        );
    }

    #[test]
    fn terminator_runs_and_mixed_marks_end_one_sentence() {
        let text = "Wait... really?! Yes. Done.";
        assert_eq!(count_sentences(text), 4);
        assert_eq!(truncate_sentences(text, 2), "Wait... really?!");

        let japanese = "今日は晴れ。明日は雨。明後日は雪。";
        assert_eq!(truncate_sentences(japanese, 2), "今日は晴れ。明日は雨。");
    }

    #[test]
    fn sentence_boundary_returns_first_sentence() {
        let summarizer = LocalSummarizer::new(SummaryPolicy::SentenceBoundary);
        assert_eq!(summarizer.summarize(SAMPLE, None).content, "Hello world.");
        // The tier is ignored by this policy.
        let summary = summarizer.summarize(SAMPLE, Some(SummaryLength::Long));
        assert_eq!(summary.content, "Hello world.");
        assert_eq!(summary.length, None);
    }

    #[test]
    fn sentence_boundary_falls_back_to_first_line() {
        assert_eq!(first_sentence("short line\nsecond line"), "short line");
        assert_eq!(first_sentence("\n\n  padded line  \nnext"), "padded line");
    }

    #[test]
    fn sentence_boundary_sentinel_for_blank_text() {
        assert_eq!(first_sentence(""), NO_CONTENT);
        assert_eq!(first_sentence(" \n\t "), NO_CONTENT);
    }

    #[test]
    fn keyword_repeated_twice_is_kept() {
        let keywords = extract_keywords("Rust makes parsing fun and parsing is fast");
        assert_eq!(keywords, vec!["parsing".to_string()]);
    }

    #[test]
    fn short_tokens_never_become_keywords() {
        let keywords = extract_keywords("the the the cat cat cat dogs dogs");
        assert_eq!(keywords, vec!["dogs".to_string()]);
    }

    #[test]
    fn keywords_are_lowercased_capped_and_in_first_seen_order() {
        let text = "Zeta alpha GAMMA delta omega sigma zeta Alpha gamma Delta Omega Sigma";
        let keywords = extract_keywords(text);
        assert_eq!(keywords, vec!["zeta", "alpha", "gamma", "delta", "omega"]);
        assert!(keywords.len() <= MAX_KEYWORDS);
    }

    #[test]
    fn summaries_are_deterministic() {
        let text = "Storage engines store data. Storage engines index data. \
                    Caches evict data. Caches warm up. Engines crash. Engines recover.";
        for policy in [SummaryPolicy::LengthTiered, SummaryPolicy::SentenceBoundary] {
            let summarizer = LocalSummarizer::new(policy);
            let first = summarizer.summarize(text, Some(SummaryLength::Short));
            for _ in 0..10 {
                assert_eq!(summarizer.summarize(text, Some(SummaryLength::Short)), first);
            }
        }
    }
}
