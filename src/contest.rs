use std::time::Duration;

use serenity::model::id::{ChannelId, UserId};
use tracing::info;

use crate::error::ContestError;
use crate::gateway::ChatGateway;
use crate::participants::Participants;

/// The reaction symbol that registers a message's author for the contest.
pub const CHECKMARK: &str = "✅";

/// How far back a history scan reaches. Fixed cap, no pagination.
pub const HISTORY_LIMIT: u8 = 100;

/// How long the interactive channel pick waits for a reply.
pub const SELECTION_WAIT: Duration = Duration::from_secs(30);

/// A reaction-added notification, reduced to the fields the contest cares
/// about. The author of the reacted-to message is the one who gets
/// registered, never the reactor.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    pub channel: ChannelId,
    pub emoji: String,
    pub reactor_is_bot: bool,
    pub message_author: UserId,
}

/// The running contest: which channel is live and who entered so far. One
/// instance owns the participant list for the process lifetime.
pub struct Contest {
    participants: Participants,
    tracked: Option<ChannelId>,
}

impl Contest {
    pub fn new(participants: Participants) -> Self {
        Self {
            participants,
            tracked: None,
        }
    }

    pub fn tracked_channel(&self) -> Option<ChannelId> {
        self.tracked
    }

    pub fn count(&self) -> usize {
        self.participants.count()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.participants.contains(id)
    }

    /// Point the contest at a channel. With an explicit id the channel just
    /// has to be visible to the bot. Without one, the invoker is prompted
    /// to mention the channel and gets [`SELECTION_WAIT`] to answer; on
    /// timeout the previously tracked channel stays in place.
    pub async fn set_tracked_channel<G: ChatGateway>(
        &mut self,
        gateway: &G,
        origin: ChannelId,
        invoker: UserId,
        explicit: Option<ChannelId>,
    ) -> Result<ChannelId, ContestError> {
        let channel = match explicit {
            Some(channel) => {
                if !gateway.channel_exists(channel).await {
                    return Err(ContestError::ChannelNotFound(channel));
                }
                channel
            }
            None => {
                gateway
                    .send(
                        origin,
                        "Pick the channel for the contest. Mention it using `#`.",
                    )
                    .await?;
                match gateway
                    .await_channel_mention(origin, invoker, SELECTION_WAIT)
                    .await
                {
                    Some(channel) => channel,
                    None => return Err(ContestError::SelectionTimeout),
                }
            }
        };

        self.tracked = Some(channel);
        info!(channel = %channel, "contest channel set");
        Ok(channel)
    }

    /// Apply one reaction notification. Registers the reacted-to message's
    /// author when the reaction is a ✅ from a non-bot account on the
    /// tracked channel; anything else is a no-op. Returns whether a new
    /// participant was recorded.
    pub fn handle_reaction(&mut self, event: &ReactionEvent) -> Result<bool, ContestError> {
        let Some(tracked) = self.tracked else {
            return Ok(false);
        };
        if event.channel != tracked || event.emoji != CHECKMARK || event.reactor_is_bot {
            return Ok(false);
        }

        let id = event.message_author.to_string();
        let added = self.participants.add(&id)?;
        if added {
            info!(participant = %id, "registered contest participant");
        }
        Ok(added)
    }

    /// Scan the last [`HISTORY_LIMIT`] messages of a channel and register
    /// the author of every message carrying a ✅ reaction, whoever reacted.
    /// The store is written once at the end; ids absorbed before a failure
    /// stay registered. Returns how many participants were new.
    pub async fn analyze_recent_history<G: ChatGateway>(
        &mut self,
        gateway: &G,
        channel: ChannelId,
    ) -> Result<usize, ContestError> {
        if !gateway.channel_exists(channel).await {
            return Err(ContestError::ChannelNotFound(channel));
        }

        let messages = gateway
            .recent_messages(channel, HISTORY_LIMIT)
            .await
            .map_err(|err| ContestError::AnalysisFailed(err.to_string()))?;

        let authors = messages
            .iter()
            .filter(|message| message.reactions.iter().any(|emoji| emoji == CHECKMARK))
            .map(|message| message.author.to_string());
        let added = self.participants.absorb(authors)?;

        info!(channel = %channel, added, "history analysis finished");
        Ok(added)
    }

    /// Draw one winner, announce them on `announce`, and reset the
    /// participant list. The winner is resolved to a handle before the
    /// list is cleared, so a failed resolution loses nothing.
    pub async fn draw_winner<G: ChatGateway>(
        &mut self,
        gateway: &G,
        origin: ChannelId,
        announce: ChannelId,
    ) -> Result<String, ContestError> {
        if announce != origin && !gateway.channel_exists(announce).await {
            return Err(ContestError::ChannelNotFound(announce));
        }

        let winner = self.participants.pick_random()?.to_string();
        let handle = gateway.user_handle(&winner).await?;
        gateway
            .send(
                announce,
                &format!("🎉 The contest winner is {handle}! Congratulations! 🎉"),
            )
            .await?;

        self.participants.clear()?;
        info!(winner = %winner, "winner drawn, participant list reset");
        Ok(handle)
    }
}
