//! Persona prompt synthesis.
//!
//! The persona prompt is **derived**: it is rebuilt from the profile's
//! persona fields whenever one of them changes and is never edited by hand.
//! Random defaults go through a [`Chooser`] so tests can pin every pick.

use std::collections::VecDeque;
use std::fmt::Write as _;

use rand::Rng;

use crate::profile::{Addressing, AgeCategory, Gender, Profile};

/// Fixed companion instruction shared by every persona.
pub const BASE_SYSTEM_PROMPT: &str = "Ты — эмпатичный собеседник. Главное — внимание к человеку. \
Подстраивайся под его манеру общения, будь естественным, допускай небольшие неловкости — это делает общение живым. \
НЕ всегда полностью соглашайся: если уместно, предложи мягкую альтернативную точку зрения \
или задай вопрос, который открывает дискуссию. Лёгкий спор допустим ради интересного разговора, \
но всегда дружелюбно и БЕЗ агрессии. Разговор должен быть увлекательным и тёплым. \
Вежливо отказывайся от запрещённых тем и предлагай безопасные альтернативы. \
НЕ давай медицинских, финансовых, правовых или политических советов. \
Завершай мыслью или вопросом, который помогает продолжить беседу.";

/// Name pool for a male companion.
pub const MALE_NAMES: &[&str] = &["Артём", "Макс", "Илья", "Никита", "Лёва", "Кирилл"];

/// Name pool for a female companion.
pub const FEMALE_NAMES: &[&str] = &["Мила", "Ника", "Софья", "Алиса", "Аня", "Дарья"];

/// Ages picked when the participant never stated one.
pub const DEFAULT_AGES: &[AgeCategory] = &[AgeCategory::Young, AgeCategory::Middle];

// ---------------------------------------------------------------------------
// Choice source
// ---------------------------------------------------------------------------

/// Source of randomized choices.
pub trait Chooser: Send {
    /// Return an index in `0..len`. Only called with `len > 0`.
    fn choose(&mut self, len: usize) -> usize;
}

/// Uniform choices from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomChooser;

impl Chooser for RandomChooser {
    fn choose(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len.max(1))
    }
}

/// Replays a fixed sequence of indices (wrapped into range), then keeps returning 0.
#[derive(Debug, Default, Clone)]
pub struct SequenceChooser {
    picks: VecDeque<usize>,
}

impl SequenceChooser {
    /// Create a chooser replaying `picks` in order.
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

impl Chooser for SequenceChooser {
    fn choose(&mut self, len: usize) -> usize {
        let pick = self.picks.pop_front().unwrap_or(0);
        pick.checked_rem(len).unwrap_or(0)
    }
}

/// Pick one element of `options`.
pub fn pick<'a, T>(chooser: &mut dyn Chooser, options: &'a [T]) -> Option<&'a T> {
    if options.is_empty() {
        return None;
    }
    options.get(chooser.choose(options.len()))
}

/// Name pool for `gender`.
pub fn name_pool(gender: Gender) -> &'static [&'static str] {
    match gender {
        Gender::Male => MALE_NAMES,
        Gender::Female => FEMALE_NAMES,
    }
}

/// Pick a random name for a companion of `gender`.
pub fn pick_name(gender: Gender, chooser: &mut dyn Chooser) -> String {
    let pool = name_pool(gender);
    pick(chooser, pool)
        .or_else(|| pool.first())
        .map(|name| (*name).to_owned())
        .unwrap_or_default()
}

/// Pick a default age category.
pub fn pick_default_age(chooser: &mut dyn Chooser) -> AgeCategory {
    pick(chooser, DEFAULT_AGES)
        .cloned()
        .unwrap_or(AgeCategory::Young)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Concrete persona attributes after defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Companion name.
    pub name: String,
    /// Companion gender.
    pub gender: Gender,
    /// Companion age.
    pub age: AgeCategory,
    /// How to address the participant.
    pub addressing: Addressing,
}

impl Persona {
    /// Resolve persona attributes from a profile, defaulting missing fields.
    ///
    /// Gender defaults to female, age to young, addressing to informal; a
    /// missing name is drawn from the pool for the resolved gender.
    pub fn from_profile(profile: &Profile, chooser: &mut dyn Chooser) -> Self {
        let gender = profile.bot_gender.unwrap_or(Gender::Female);
        let name = match &profile.bot_name {
            Some(name) => name.clone(),
            None => pick_name(gender, chooser),
        };
        Self {
            name,
            gender,
            age: profile
                .bot_age_category
                .clone()
                .unwrap_or(AgeCategory::Young),
            addressing: profile.addressing,
        }
    }

    /// Render the system prompt.
    pub fn render(&self) -> String {
        let mut prompt = String::with_capacity(BASE_SYSTEM_PROMPT.len().saturating_add(160));
        prompt.push_str(BASE_SYSTEM_PROMPT);
        let _ = write!(
            prompt,
            " Твой образ: имя {}, пол {}, возраст {}. Обращайся к собеседнику на «{}».",
            self.name,
            self.gender.label(),
            self.age.label(),
            self.addressing.pronoun(),
        );
        prompt
    }
}

/// Build the persona prompt for `profile`.
pub fn build_persona(profile: &Profile, chooser: &mut dyn Chooser) -> String {
    Persona::from_profile(profile, chooser).render()
}
