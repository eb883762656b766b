use regex::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\$|\bUSD\b").expect("currency pattern is valid"));

static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(packaging|recycling|eco|carbon|impact|price|buy|rating)\b")
        .expect("emoji pattern is valid")
});

fn emoji_for(word: &str) -> &'static str {
    match word.to_lowercase().as_str() {
        "packaging" => "📦",
        "recycling" => "♻️",
        "eco" => "🌱",
        "carbon" => "🌍",
        "impact" => "💨",
        "price" => "💰",
        "buy" => "🛍️",
        "rating" => "⭐",
        _ => "",
    }
}

/// Replace `$` and standalone `USD` (any case) with `symbol`.
///
/// Text already carrying `symbol` is left alone, so applying this twice gives
/// the same result as applying it once even when the symbol contains `$`.
pub fn normalize_currency(text: &str, symbol: &str) -> String {
    if symbol.is_empty() {
        return CURRENCY_RE.replace_all(text, "").into_owned();
    }
    text.split(symbol)
        .map(|chunk| CURRENCY_RE.replace_all(chunk, NoExpand(symbol)))
        .collect::<Vec<_>>()
        .join(symbol)
}

/// Swap whole words from a small vocabulary for their emoji.
pub fn annotate_emoji(text: &str) -> String {
    EMOJI_RE
        .replace_all(text, |caps: &Captures| emoji_for(&caps[1]).to_string())
        .into_owned()
}

/// Trim every line, drop blank ones and strip markdown bold markers.
pub fn tidy_completion(text: &str) -> String {
    text.lines()
        .map(|line| line.replace("**", "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
