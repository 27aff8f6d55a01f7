//! Slash command parsing.

use pogovorim::telegram::commands::Command;

#[test]
fn known_commands_parse_case_insensitively() {
    assert_eq!(Command::parse("/start"), Some(Command::Start));
    assert_eq!(Command::parse("/RESET"), Some(Command::Reset));
    assert_eq!(Command::parse("  /profile"), Some(Command::Profile));
    assert_eq!(Command::parse("/help please"), Some(Command::Help));
}

#[test]
fn bot_suffix_and_arguments_are_ignored() {
    assert_eq!(
        Command::parse("/start@pogovorim_bot ref123"),
        Some(Command::Start)
    );
}

#[test]
fn plain_text_is_not_a_command() {
    assert_eq!(Command::parse("привет"), None);
    assert_eq!(Command::parse("a/start"), None);
}

#[test]
fn unknown_commands_keep_their_name() {
    let command = Command::parse("/Subscribe").expect("command");
    assert_eq!(command, Command::Unknown("Subscribe".to_owned()));
    assert_eq!(command.as_str(), "Subscribe");
}
