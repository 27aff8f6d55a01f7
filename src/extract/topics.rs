//! Topic screening: banned content, political topics, topic requests.

use std::sync::LazyLock;

use regex::Regex;

use super::is_match;

/// Sensitive topics that are never forwarded to the completion provider:
/// self-harm, drugs, terrorism, explicit content, extremism, weapons, explosives.
const BANNED_FRAGMENTS: &[&str] = &[
    r"\bсуицид",
    r"\bсамоуби",
    r"\bнаркот",
    r"\bтеррор",
    r"NSFW",
    r"18\+",
    r"\bпорно",
    r"\bэкстремизм",
    r"\bоружи",
    r"\bбомб",
    r"\bвзрывчат",
];

static BANNED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!("(?i){}", BANNED_FRAGMENTS.join("|"))).ok());

static POLITICS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)политик|выбор|парти|оппозиц|митинг|депутат|президент|чиновник").ok()
});

const TOPIC_REQUEST_MARKERS: &[&str] = &["поговорим", "пообщаемся", "обсудим", "обсуждать", "тема", "?"];

const NO_IDEA_MARKERS: &[&str] = &["не знаю", "затрудня", "без темы"];

/// Whether the text is free of banned topics.
pub fn is_allowed(text: &str) -> bool {
    !is_match(&BANNED, text)
}

/// Whether the text touches politics, elections, parties, or officials.
pub fn is_political(text: &str) -> bool {
    is_match(&POLITICS, text)
}

/// Whether the text asks to talk about something.
pub fn looks_like_topic_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    TOPIC_REQUEST_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether the participant has no idea what to talk about.
pub fn wants_topic_suggestion(text: &str) -> bool {
    let lower = text.to_lowercase();
    NO_IDEA_MARKERS.iter().any(|m| lower.contains(m))
}
