use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // \w in the regex crate covers Join_Control, so ZWNJ/ZWJ must be
    // stripped explicitly or Persian compounds stay glued together.
    static ref NON_WORD: Regex =
        Regex::new(r"[^\w\s]|\p{Join_Control}").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        // Closed Persian stop-word list; the corpus is Persian news.
        let words: &[&str] = &[
            "از", "به", "در", "که", "و", "را", "این", "آن", "برای", "با",
            "است", "شد", "می", "ها", "های", "بر", "تا", "یک", "بود", "نیز",
            "کند", "شود", "کرده", "شده", "باید", "گفت", "دارد", "وی", "اما",
            "اگر", "نیست", "هستند", "بی", "تر", "ترین", "خود", "دیگر", "هم",
            "چون", "چه", "پس", "پیش", "بین", "سپس",
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokenize text using NFKC normalization, punctuation-to-whitespace
/// stripping, stop-word removal, and a minimum token length of two
/// characters. The same function serves document and query text so both
/// sides of the cosine computation share one vocabulary.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let stripped = NON_WORD.replace_all(&normalized, " ");
    stripped
        .split_whitespace()
        .filter(|t| t.chars().count() > 1 && !is_stopword(t))
        .map(|t| t.to_string())
        .collect()
}
