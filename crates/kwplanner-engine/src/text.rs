// KW Planner
// Copyright (C) 2025 KW Planner contributors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! HTML stripping, tokenization and keyword scoring.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

/// Words too generic to be useful keywords (English plus the Portuguese
/// set the original planner targeted).
const STOPWORDS: &[&str] = &[
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "her", "was", "one", "our", "out",
    "has", "have", "had", "this", "that", "with", "they", "from", "will", "what", "when", "where", "which",
    "your", "their", "them", "then", "than", "been", "were", "more", "most", "some", "such", "only", "into",
    "over", "also", "just", "about", "here", "there", "these", "those", "its", "his", "she", "him", "how",
    "who", "why", "get", "like", "new", "use", "may", "very", "after", "other",
    // Portuguese
    "que", "para", "com", "uma", "por", "mais", "das", "dos", "como", "mas", "foi", "ele", "ela", "seu",
    "sua", "sao", "são", "nao", "não", "tem", "ser", "está", "esta", "isso", "essa", "esse", "pelo", "pela",
    "até", "ate", "sem", "nos", "nas", "entre", "quando", "muito", "pode", "onde", "tambem", "também",
    "depois", "todos", "todas", "qual", "quais", "já", "ainda", "vai", "ter", "fazer", "anos", "sobre",
];

/// A keyword with its occurrence count and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredKeyword {
    pub keyword: String,
    pub occurrences: usize,
    pub score: f64,
}

/// Drop scripts, styles and markup, keeping the rendered text.
pub fn strip_html(html: &str) -> String {
    let without_blocks = SCRIPT_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_blocks, " ");
    decode_entities(&without_tags)
}

/// Page `<title>` contents, if present.
pub fn page_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|c| decode_entities(c[1].trim()))
        .filter(|t| !t.is_empty())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Lowercased alphabetic words of three or more characters, stop words
/// removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 3 && !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Words in the rendered text, before any filtering. Used by the content
/// pruning heuristics to judge how thin a page is.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Extract and rank keyword candidates (unigrams and bigrams) from
/// rendered page text. Bigrams score higher per occurrence since a
/// two-word phrase matching is a stronger signal.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<ScoredKeyword> {
    let tokens = tokenize(text);
    let mut counts: HashMap<String, (usize, f64)> = HashMap::new();

    for token in &tokens {
        let entry = counts.entry(token.clone()).or_insert((0, 1.0));
        entry.0 += 1;
    }
    for pair in tokens.windows(2) {
        let bigram = format!("{} {}", pair[0], pair[1]);
        let entry = counts.entry(bigram).or_insert((0, 2.5));
        entry.0 += 1;
    }

    let mut keywords: Vec<ScoredKeyword> = counts
        .into_iter()
        .filter(|(_, (occurrences, _))| *occurrences >= 2)
        .map(|(keyword, (occurrences, weight))| ScoredKeyword {
            score: occurrences as f64 * weight,
            keyword,
            occurrences,
        })
        .collect();

    keywords.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    keywords.truncate(limit);
    keywords
}

/// Whether a keyword is related to a theme: shares a token with it or
/// contains it as a substring.
pub fn matches_theme(keyword: &str, theme: &str) -> bool {
    let theme = theme.to_lowercase();
    let keyword_lower = keyword.to_lowercase();
    if keyword_lower.contains(&theme) {
        return true;
    }
    let theme_tokens: Vec<&str> = theme.split_whitespace().collect();
    keyword_lower.split_whitespace().any(|t| theme_tokens.contains(&t))
}
