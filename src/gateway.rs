use std::time::Duration;

use async_trait::async_trait;
use serenity::builder::GetMessages;
use serenity::collector::MessageCollector;
use serenity::model::id::{ChannelId, UserId};
use serenity::prelude::Context;

use crate::commands::mentioned_channels;
use crate::error::ContestError;

/// One message from a history scan: who wrote it and which reaction
/// symbols it carries.
#[derive(Debug, Clone)]
pub struct ScannedMessage {
    pub author: UserId,
    pub reactions: Vec<String>,
}

/// The slice of the chat platform the contest logic needs. Keeping it
/// behind a trait lets the controller run against an in-memory fake in
/// tests while production wires in [`DiscordGateway`].
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Whether the bot can see the channel at all.
    async fn channel_exists(&self, channel: ChannelId) -> bool;

    /// Post a plain text message.
    async fn send(&self, channel: ChannelId, content: &str) -> Result<(), ContestError>;

    /// The most recent messages of a channel, newest first, capped at
    /// `limit`.
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ScannedMessage>, ContestError>;

    /// Resolve a stored participant id to a mentionable handle.
    async fn user_handle(&self, id: &str) -> Result<String, ContestError>;

    /// Wait for the next message from `author` in `channel` that mentions
    /// exactly one channel, up to `wait`. `None` means the deadline passed
    /// without a qualifying message.
    async fn await_channel_mention(
        &self,
        channel: ChannelId,
        author: UserId,
        wait: Duration,
    ) -> Option<ChannelId>;
}

/// Production gateway backed by a live serenity [`Context`].
pub struct DiscordGateway<'a> {
    ctx: &'a Context,
}

impl<'a> DiscordGateway<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ChatGateway for DiscordGateway<'_> {
    async fn channel_exists(&self, channel: ChannelId) -> bool {
        channel.to_channel(self.ctx).await.is_ok()
    }

    async fn send(&self, channel: ChannelId, content: &str) -> Result<(), ContestError> {
        channel.say(self.ctx, content).await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ScannedMessage>, ContestError> {
        let messages = channel
            .messages(self.ctx, GetMessages::new().limit(limit))
            .await?;
        Ok(messages
            .into_iter()
            .map(|message| ScannedMessage {
                author: message.author.id,
                reactions: message
                    .reactions
                    .iter()
                    .map(|reaction| reaction.reaction_type.to_string())
                    .collect(),
            })
            .collect())
    }

    async fn user_handle(&self, id: &str) -> Result<String, ContestError> {
        let unknown = || ContestError::UnknownUser(id.to_string());
        let parsed: u64 = id.parse().map_err(|_| unknown())?;
        if parsed == 0 {
            return Err(unknown());
        }
        let user = UserId::new(parsed)
            .to_user(self.ctx)
            .await
            .map_err(|_| unknown())?;
        Ok(format!("<@{}>", user.id))
    }

    async fn await_channel_mention(
        &self,
        channel: ChannelId,
        author: UserId,
        wait: Duration,
    ) -> Option<ChannelId> {
        let reply = MessageCollector::new(&self.ctx.shard)
            .channel_id(channel)
            .author_id(author)
            .filter(|message| mentioned_channels(&message.content).len() == 1)
            .timeout(wait)
            .await?;
        mentioned_channels(&reply.content).first().copied()
    }
}
