//! Telegram adapter: slash commands and the bot dispatcher.
//!
//! Every inbound message is normalized to (participant id, optional text).
//! Slash commands go to [`commands::dispatch`]; everything else goes to
//! [`Dialogue::handle_text`]. Replies are sent in HTML parse mode.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use tracing::{debug, error, info, warn};

use crate::dialogue::{texts, Dialogue};

pub mod commands;

use self::commands::Command;

// ---------------------------------------------------------------------------
// Shared state for handler injection
// ---------------------------------------------------------------------------

/// Shared dependencies injected into teloxide handlers via `dptree::deps!`.
#[derive(Clone)]
struct SharedState {
    dialogue: Arc<Dialogue>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the Telegram bot until Ctrl+C.
///
/// # Errors
///
/// Does not fail once the dispatcher has started.
pub async fn run_telegram(bot_token: &str, dialogue: Arc<Dialogue>) -> anyhow::Result<()> {
    let bot = Bot::new(bot_token);
    let shared = SharedState { dialogue };

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    info!("telegram dispatcher starting");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![shared])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("telegram dispatcher stopped");
    Ok(())
}

/// Stable participant identifier for a message: the sender, or the chat.
fn participant_id(msg: &Message) -> String {
    match msg.from {
        Some(ref user) => user.id.0.to_string(),
        None => msg.chat.id.0.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Message handler
// ---------------------------------------------------------------------------

/// Handle an incoming Telegram message.
async fn handle_message(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    let participant = participant_id(&msg);
    let text = msg.text();
    debug!(
        participant = %participant,
        has_text = text.is_some(),
        "telegram message received"
    );

    let result = match text.and_then(Command::parse) {
        Some(command) => {
            info!(participant = %participant, command = command.as_str(), "command received");
            commands::dispatch(&command, &state.dialogue, &participant).await
        }
        None => {
            if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
                debug!(error = %e, "failed to send typing action");
            }
            state.dialogue.handle_text(&participant, text).await
        }
    };

    let reply = match result {
        Ok(reply) => reply,
        Err(e) => {
            error!(participant = %participant, error = %e, "failed to persist profile");
            texts::STORAGE_APOLOGY.to_owned()
        }
    };

    if let Err(e) = bot
        .send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .await
    {
        warn!(participant = %participant, error = %e, "failed to send telegram message");
        return Err(e);
    }

    Ok(())
}
