/// Lowercase and fold typographic quotes to ASCII so phrase tables written
/// with `'` match text pasted from mail clients.
pub fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"")
}

/// Join subject and message the way the scorer and tone detector read them.
pub fn combined(subject: &str, message: &str) -> String {
    normalize(&format!("{} {}", subject.trim(), message.trim()))
}

pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// Number of distinct phrases from `phrases` present in `text`. Each phrase
/// counts once no matter how often it occurs.
pub fn count_matches(text: &str, phrases: &[&str]) -> usize {
    phrases.iter().filter(|phrase| text.contains(*phrase)).count()
}
