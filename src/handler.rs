use serenity::async_trait;
use serenity::gateway::ActivityData;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::commands::Command;
use crate::common::{fmt_reply, Re};
use crate::config::Config;
use crate::contest::{Contest, ReactionEvent, HISTORY_LIMIT};
use crate::error::ContestError;
use crate::gateway::{ChatGateway, DiscordGateway};

/// Bridges serenity's event stream and the contest. Owns the controller
/// behind a lock and the error boundary that turns failures into chat
/// replies.
pub struct Handler {
    config: Config,
    contest: Mutex<Contest>,
}

impl Handler {
    pub fn new(config: Config, contest: Contest) -> Self {
        Self {
            config,
            contest: Mutex::new(contest),
        }
    }

    async fn run_command(
        &self,
        ctx: &Context,
        msg: &Message,
        command: Command,
    ) -> Result<(), ContestError> {
        let gateway = DiscordGateway::new(ctx);
        match command {
            Command::SetContestChannel { channel } => {
                let chosen = self
                    .contest
                    .lock()
                    .await
                    .set_tracked_channel(&gateway, msg.channel_id, msg.author.id, channel)
                    .await?;
                gateway
                    .send(
                        msg.channel_id,
                        &format!("The contest is now running on <#{chosen}>."),
                    )
                    .await?;
            }
            Command::TrackChannel { channel } => {
                let chosen = self
                    .contest
                    .lock()
                    .await
                    .set_tracked_channel(&gateway, msg.channel_id, msg.author.id, Some(channel))
                    .await?;
                gateway
                    .send(
                        msg.channel_id,
                        &format!("Tracking started on <#{chosen}>, ✅ reactions now count."),
                    )
                    .await?;
            }
            Command::DrawWinner => {
                self.contest
                    .lock()
                    .await
                    .draw_winner(&gateway, msg.channel_id, msg.channel_id)
                    .await?;
                gateway
                    .send(msg.channel_id, "Participant data has been reset.")
                    .await?;
            }
            Command::DrawWinnerToChannel { channel } => {
                self.contest
                    .lock()
                    .await
                    .draw_winner(&gateway, msg.channel_id, channel)
                    .await?;
                gateway
                    .send(msg.channel_id, "Participant data has been reset.")
                    .await?;
            }
            Command::AnalyzeHistory { channel } => {
                gateway
                    .send(
                        msg.channel_id,
                        &format!("Analyzing the last {HISTORY_LIMIT} messages on <#{channel}>..."),
                    )
                    .await?;
                let added = self
                    .contest
                    .lock()
                    .await
                    .analyze_recent_history(&gateway, channel)
                    .await?;
                gateway
                    .send(
                        msg.channel_id,
                        &fmt_reply(
                            Re::Done,
                            &format!("Analysis finished, {added} new participants saved."),
                        ),
                    )
                    .await?;
            }
            Command::ParticipantCount => {
                let count = self.contest.lock().await.count();
                gateway
                    .send(
                        msg.channel_id,
                        &fmt_reply(Re::Count, &format!("Current number of participants: {count}")),
                    )
                    .await?;
            }
            Command::Restart => {
                if msg.author.id.get() != self.config.owner {
                    gateway
                        .send(
                            msg.channel_id,
                            &fmt_reply(Re::Fail, "You do not have permission to use this command!"),
                        )
                        .await?;
                    return Ok(());
                }
                gateway
                    .send(msg.channel_id, &fmt_reply(Re::Reload, "Restarting the bot..."))
                    .await?;
                info!("restarting on owner request");
                let err = exec_restart();
                // exec only returns when the replacement failed
                error!(%err, "restart failed");
                std::process::exit(1);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "bot is ready");
        if let Some(stream) = &self.config.stream {
            match ActivityData::streaming(stream.name.clone(), stream.url.as_str()) {
                Ok(activity) => ctx.set_activity(Some(activity)),
                Err(err) => warn!(%err, "invalid stream url in config, skipping presence"),
            }
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(parsed) = Command::parse(&msg.content, &self.config.prefix) else {
            return;
        };

        let reply = match parsed {
            Ok(command) => match self.run_command(&ctx, &msg, command).await {
                Ok(()) => return,
                Err(err) => {
                    match &err {
                        ContestError::AnalysisFailed(_) => {
                            error!(%err, "history analysis aborted")
                        }
                        ContestError::ChannelNotFound(_)
                        | ContestError::NoParticipants
                        | ContestError::SelectionTimeout => {}
                        other => error!(%other, "command failed unexpectedly"),
                    }
                    describe(&err)
                }
            },
            Err(err) => err.to_string(),
        };

        if let Err(err) = msg.channel_id.say(&ctx.http, fmt_reply(Re::Fail, &reply)).await {
            error!(%err, "failed to deliver error reply");
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        // the registered participant is the author of the reacted-to
        // message, so that message has to be resolved first
        let message = match reaction.message(&ctx).await {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "could not fetch the reacted-to message");
                return;
            }
        };
        let reactor_is_bot = match reaction.user(&ctx).await {
            Ok(user) => user.bot,
            Err(err) => {
                warn!(%err, "could not fetch the reacting user");
                return;
            }
        };

        let event = ReactionEvent {
            channel: reaction.channel_id,
            emoji: reaction.emoji.to_string(),
            reactor_is_bot,
            message_author: message.author.id,
        };
        if let Err(err) = self.contest.lock().await.handle_reaction(&event) {
            error!(%err, "failed to persist a participant registration");
        }
    }
}

/// Short user-facing text for each failure; anything without a dedicated
/// message falls through to a generic reply.
fn describe(err: &ContestError) -> String {
    match err {
        ContestError::ChannelNotFound(_) => {
            "No channel with that id was found. Make sure the bot has access to it.".to_string()
        }
        ContestError::NoParticipants => "There are no participants in the contest!".to_string(),
        ContestError::SelectionTimeout => "No channel was picked in time. Try again.".to_string(),
        ContestError::AnalysisFailed(_) => {
            "Something went wrong during the analysis. Try again.".to_string()
        }
        _ => "An unexpected error occurred. Check the logs for details.".to_string(),
    }
}

#[cfg(unix)]
fn exec_restart() -> std::io::Error {
    use std::os::unix::process::CommandExt;
    match std::env::current_exe() {
        Ok(exe) => std::process::Command::new(exe)
            .args(std::env::args_os().skip(1))
            .exec(),
        Err(err) => err,
    }
}

#[cfg(not(unix))]
fn exec_restart() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "restart is only supported on unix hosts",
    )
}
