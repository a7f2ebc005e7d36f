//! Keyword and hashtag trends over a processed view.
//!
//! Each post contributes once per distinct term it mentions, weighted by its
//! decayed score. Terms are ranked by `avg_score * log2(count + 1)`, which
//! rewards terms that are both valuable and recurring.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use reelrank_core::ScoredPost;
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Terms seen in fewer posts than this are dropped as noise.
pub const MIN_TERM_POSTS: usize = 2;

/// Portuguese and English function words, in diacritic-free form.
const STOPWORDS: &[&str] = &[
    // pt
    "a", "o", "e", "de", "do", "da", "em", "no", "na", "que", "para", "com", "um", "uma", "os",
    "as", "dos", "das", "nos", "nas", "por", "se", "mais", "muito", "ja", "ou", "quando", "ao",
    "aos", "nao", "isso", "esse", "essa", "este", "esta", "eu", "ele", "ela", "eles", "elas",
    "voces", "voce", "seu", "sua", "seus", "suas", "meu", "minha", "me", "te", "lhe", "vos",
    "lhes", "foi", "ser", "ter", "fazer", "como", "mas", "entao", "ate", "so", "tambem", "bem",
    "aqui", "ali", "la", "onde", "quem", "qual", "cada", "todo", "toda", "todos", "todas", "num",
    "numa", "pelo", "pela", "sobre", "entre", "depois", "antes", "sem", "sao", "tem", "vai",
    "vou", "pode", "era", "foram", "ha", "pra", "pro", "ta", "to", "vc", "tb", "q", "tbm", "ne",
    // en
    "the", "and", "of", "in", "is", "it", "for", "on", "with", "this", "that", "are", "was",
    "be", "at", "from", "have", "has", "you", "i", "my", "your", "we", "they", "if", "not",
    "will", "can", "just", "been", "would",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

static TAG_OR_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#@]\w+").expect("valid regex"));

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid regex"));

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Aggregate statistics for one ranked term.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermStat {
    pub term: String,
    /// Number of posts mentioning the term.
    pub count: usize,
    pub total_score: f64,
    pub avg_score: f64,
}

impl TermStat {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rank(&self) -> f64 {
        self.avg_score * (self.count as f64 + 1.0).log2()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendReport {
    pub keywords: Vec<TermStat>,
    pub hashtags: Vec<TermStat>,
}

/// Ranks the top `top_n` keywords and hashtags across `posts`.
#[must_use]
pub fn analyze_trends(posts: &[ScoredPost], top_n: usize) -> TrendReport {
    let mut keywords = Tally::default();
    let mut hashtags = Tally::default();

    for scored in posts {
        let weight = scored.weight();
        let caption = scored.post.caption.as_str();
        keywords.add(tokenize(caption), weight);
        hashtags.add(extract_hashtags(caption), weight);
    }

    TrendReport {
        keywords: keywords.ranked(top_n),
        hashtags: hashtags.ranked(top_n),
    }
}

/// Splits a caption into keyword tokens.
///
/// Lowercases, strips diacritics, drops hashtags and mentions, replaces
/// punctuation with spaces, then discards short, numeric and stopword tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = strip_diacritics(&text.to_lowercase());
    let without_tags = TAG_OR_MENTION.replace_all(&folded, " ");
    let words_only = NON_WORD.replace_all(&without_tags, " ");

    words_only
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .filter(|word| !STOPWORD_SET.contains(word))
        .map(str::to_string)
        .collect()
}

/// Lowercased `#tag` tokens in order of appearance, accents preserved.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG
        .find_iter(text)
        .map(|tag| tag.as_str().to_lowercase())
        .collect()
}

fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[derive(Debug, Default)]
struct Tally {
    terms: BTreeMap<String, (usize, f64)>,
}

impl Tally {
    fn add(&mut self, tokens: Vec<String>, weight: f64) {
        let distinct: BTreeSet<String> = tokens.into_iter().collect();
        for term in distinct {
            let entry = self.terms.entry(term).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += weight;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn ranked(self, top_n: usize) -> Vec<TermStat> {
        let mut stats: Vec<TermStat> = self
            .terms
            .into_iter()
            .filter(|(_, (count, _))| *count >= MIN_TERM_POSTS)
            .map(|(term, (count, total_score))| TermStat {
                term,
                count,
                total_score,
                avg_score: total_score / count as f64,
            })
            .collect();
        // Stable over the alphabetical BTreeMap order, so ties stay sorted by term.
        stats.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
        stats.truncate(top_n);
        stats
    }
}
