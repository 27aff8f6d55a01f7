//! Slot extraction: companion gender and age, names, addressing mode.

use std::sync::LazyLock;

use regex::Regex;

use crate::profile::{Addressing, AgeCategory, Gender};

use super::{first_name_token, title_case, NAME_TOKEN};

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Female vocabulary is checked first: "подруга" contains "друг".
const FEMALE_STEMS: &[&str] = &["подруг", "девуш", "жен"];
const MALE_STEMS: &[&str] = &["друг", "парн", "муж"];

/// Map "friend"/"girlfriend" phrasing to the companion's gender.
pub fn extract_gender(text: &str) -> Option<Gender> {
    let lower = text.to_lowercase();
    let trimmed = lower.trim();
    if FEMALE_STEMS.iter().any(|stem| lower.contains(stem)) || matches!(trimmed, "ж" | "f") {
        return Some(Gender::Female);
    }
    if MALE_STEMS.iter().any(|stem| lower.contains(stem)) || matches!(trimmed, "м" | "m") {
        return Some(Gender::Male);
    }
    None
}

// ---------------------------------------------------------------------------
// Age
// ---------------------------------------------------------------------------

const YOUNG_MARKERS: &[&str] = &["молоды", "18", "19", "20", "25"];
const MIDDLE_MARKERS: &[&str] = &["30", "35", "40", "средн"];
const SENIOR_MARKERS: &[&str] = &["45", "50", "60", "старш", "взросл"];

static TWO_DIGITS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d{2}").ok());

/// Map age vocabulary to a category, falling back to the first two-digit number.
pub fn extract_age(text: &str) -> Option<AgeCategory> {
    let lower = text.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
    if has_any(YOUNG_MARKERS) {
        return Some(AgeCategory::Young);
    }
    if has_any(MIDDLE_MARKERS) {
        return Some(AgeCategory::Middle);
    }
    if has_any(SENIOR_MARKERS) {
        return Some(AgeCategory::Senior);
    }
    TWO_DIGITS
        .as_ref()?
        .find(&lower)
        .map(|m| AgeCategory::Exact(m.as_str().to_owned()))
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

fn compile_all(templates: &[&str]) -> Vec<Regex> {
    templates
        .iter()
        .filter_map(|template| Regex::new(&template.replace("{name}", NAME_TOKEN)).ok())
        .collect()
}

/// Phrases proposing a name for the companion, tried in order.
static BOT_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"(?i)(?:зови|называй)\s+тебя\s+(?P<name>{name})",
        r"(?i)(?:пусть|давай)\s+(?:я\s+)?буду\s+(?P<name>{name})",
        r"(?i)(?:пусть|давай)\s+тебя\s+(?:звать|зовут)\s+(?P<name>{name})",
        r"(?i)(?:назов[её]м\s+тебя|тво[её]\s+имя)\s+(?P<name>{name})",
    ])
});

/// Phrases introducing the participant, tried in order.
static USER_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"(?i)(?:зови|называй)\s+меня\s+(?P<name>{name})",
        r"(?i)меня\s+зовут\s+(?P<name>{name})",
        r"(?i)\bя\s+(?P<name>{name})",
    ])
});

/// Addressing markers removed before any user-name matching so "на ты" is not a name.
static ADDRESSING_MARKERS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\bна\s+)?\b(?:ты|вы)\b").ok());

fn by_patterns(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.name("name"))
            .map(|m| title_case(m.as_str()))
    })
}

/// Extract a proposed companion name.
///
/// Explicit phrases ("зови тебя Лиза", "давай буду Макс") win over the
/// first-token fallback.
pub fn extract_bot_name(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    by_patterns(&BOT_NAME_PATTERNS, text).or_else(|| first_name_token(text))
}

/// Extract the participant's name ("зови меня Оля", "меня зовут Олег", "я Саша").
pub fn extract_user_name(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    let without_markers = match ADDRESSING_MARKERS.as_ref() {
        Some(re) => re.replace_all(text, " ").into_owned(),
        None => text.to_owned(),
    };
    by_patterns(&USER_NAME_PATTERNS, &without_markers)
        .or_else(|| first_name_token(&without_markers))
}

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Read "ты"/"вы" preferences, keeping `default` when neither is stated.
pub fn extract_addressing(text: &str, default: Addressing) -> Addressing {
    let lower = text.trim().to_lowercase();
    let says = |pronoun: &str| {
        let marker = format!("на {pronoun}");
        lower == pronoun || lower.ends_with(&marker) || lower.contains(&format!(" {marker}"))
    };
    if says("вы") {
        Addressing::Formal
    } else if says("ты") {
        Addressing::Informal
    } else {
        default
    }
}
