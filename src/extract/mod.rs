//! Rule extractor: deterministic classifiers over a raw text turn.
//!
//! Every function here is pure and never fails; "no match" is a normal
//! return value the dialogue uses to pick a clarifying reply. Where several
//! rules compete, callers declare an ordered slice of named [`Matcher`]s and
//! take the first hit with [`first_match`], so precedence is visible at the
//! call site instead of being buried in if-chains.

pub mod sentiment;
pub mod slots;
pub mod topics;

use std::sync::LazyLock;

use regex::Regex;

pub use self::sentiment::{is_negative_reply, is_positive_reply};
pub use self::slots::{
    extract_addressing, extract_age, extract_bot_name, extract_gender, extract_user_name,
};
pub use self::topics::{is_allowed, is_political, looks_like_topic_request, wants_topic_suggestion};

/// A named rule that may produce a typed result for a text.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<T> {
    name: &'static str,
    apply: fn(&str) -> Option<T>,
}

impl<T> Matcher<T> {
    /// Create a matcher from a name and a rule function.
    pub const fn new(name: &'static str, apply: fn(&str) -> Option<T>) -> Self {
        Self { name, apply }
    }

    /// Name used in logs and tests.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the rule.
    pub fn apply(&self, text: &str) -> Option<T> {
        (self.apply)(text)
    }
}

/// Run `matchers` in declared order and return the first hit with its matcher name.
pub fn first_match<T>(matchers: &[Matcher<T>], text: &str) -> Option<(&'static str, T)> {
    matchers
        .iter()
        .find_map(|matcher| matcher.apply(text).map(|value| (matcher.name(), value)))
}

/// Letters (Latin or Cyrillic) and hyphens, 2 to 20 characters.
pub(crate) const NAME_TOKEN: &str = r"[A-Za-zА-Яа-яЁё\-]{2,20}";

static NAME_WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(NAME_TOKEN).ok());

/// Approval words that must never be mistaken for a name.
static APPROVAL_CORE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(норм|ок|окей|красив|хорош|подход|оставь|пусть|класс|круто|супер|да)$").ok()
});

pub(crate) fn is_match(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// First name-like token in `text`, title-cased, unless it is an approval word.
pub(crate) fn first_name_token(text: &str) -> Option<String> {
    let token = NAME_WORD.as_ref()?.find(text)?.as_str();
    if is_match(&APPROVAL_CORE, token) {
        return None;
    }
    Some(title_case(token))
}

/// Uppercase the first letter of every hyphen- or space-separated part, lowercase the rest.
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_start = true;
    for ch in word.chars() {
        if ch.is_alphabetic() {
            if at_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_start = false;
        } else {
            out.push(ch);
            at_start = true;
        }
    }
    out
}
