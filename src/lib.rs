//! Pogovorim ("Поговорим?"): a Telegram chat companion.
//!
//! A new participant picks a friend or a girlfriend, settles the companion's
//! name, introduces themselves, and then chats freely with a persona-driven
//! completion model. Onboarding is a deterministic state machine over
//! rule-based text extraction; no learned intent classifier is involved.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;

pub mod access;
pub mod extract;
pub mod persona;
pub mod profile;
pub mod store;

pub mod dialogue;
pub mod providers;
pub mod reply;

pub mod telegram;
