//! openbot-censorship: flags accidental mentions of risky words.
//!
//! A second message-hook consumer: every inbound message runs through a
//! small word filter that tolerates spacing and letter-stretching tricks
//! ("s n i p e", "cockkkkbot"). Matches are reported through the log with
//! the author attached; the moderation follow-up (deleting the message,
//! warning the author in a DM) is an outbound platform surface this bot
//! does not expose, so detection is the whole job here.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use openbot_client::OpenBotClient;

/// Watched words and the spacing-tolerant patterns that catch them.
/// Matching is done on lowercased content; first hit wins.
static CENSORED_WORDS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("snipe", r"s\s*n\s*i*\s*p\s*e"),
        ("sniping", r"s\s*n\s*i*\s*p\s*i*\s*n\s*g"),
        ("cockbot", r"c\s*o\s*c+\s*(k\s*)*\s*b\s*o\s*t"),
        ("murder", r"m\s*u\s*r+\s*d\s*e\s*r+"),
    ]
    .into_iter()
    .map(|(word, pattern)| (word, Regex::new(pattern).expect("hardcoded pattern")))
    .collect()
});

/// The first watched word the message trips over, if any.
pub fn censored_word(message: &str) -> Option<&'static str> {
    let content = message.to_lowercase();
    CENSORED_WORDS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&content))
        .map(|(word, _)| *word)
}

/// Register the censorship module on the client: one message hook.
pub async fn install(client: &OpenBotClient) {
    let module = client.module("censorship");

    module
        .on_message(|msg| async move {
            if let Some(word) = censored_word(&msg.content) {
                warn!(
                    author = msg.author_name,
                    author_id = msg.author_id,
                    channel_id = msg.channel_id,
                    word,
                    "Censored word in message"
                );
            }
            Ok(())
        })
        .await;
}
