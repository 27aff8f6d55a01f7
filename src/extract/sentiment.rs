//! Approval and disapproval of a proposal (the companion's name).
//!
//! The two checks are independent; a text can match both. Callers evaluate
//! approval first and let it win.

use std::sync::LazyLock;

use regex::Regex;

use super::is_match;

/// Short approvals match as whole words; the rest are stems ("подход" covers
/// "подходит", "нрав" covers "нравится").
static APPROVAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ок|окей)\b|\b(?:норм|подход|подойд|нрав|красив|хорош|класс|круто|супер|отличн|пусть будет|оставь)",
    )
    .ok()
});

static ALREADY_TOLD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(я\s+же\s+напис|уже\s+писал|уже\s+писала)").ok());

static DISAPPROVAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(не\s*нрав|не\s*очень|другое|иначе|по-?друг)").ok());

/// Affirmative words accepted as the first token of a reply.
const AFFIRMATIVE_TOKENS: &[&str] = &["да", "ага", "угу"];

/// Whether the text approves the current proposal.
pub fn is_positive_reply(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    has_unnegated_approval(&lower) || is_match(&ALREADY_TOLD, &lower) || starts_affirmative(&lower)
}

/// Whether the text rejects the current proposal or asks for something else.
pub fn is_negative_reply(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    !lower.is_empty() && is_match(&DISAPPROVAL, &lower)
}

/// An approval stem directly preceded by "не" ("не нравится") does not count.
fn has_unnegated_approval(lower: &str) -> bool {
    let Some(re) = APPROVAL.as_ref() else {
        return false;
    };
    re.find_iter(lower).any(|m| {
        let before = lower.get(..m.start()).unwrap_or_default();
        before.split_whitespace().next_back() != Some("не")
    })
}

fn starts_affirmative(lower: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphabetic())
        .next()
        .is_some_and(|first| AFFIRMATIVE_TOKENS.contains(&first))
}
