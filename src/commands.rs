use serenity::model::id::ChannelId;
use thiserror::Error;

/// Every operation the bot accepts over chat, as an explicit variant with
/// typed arguments. Parsing happens in one place so the event handler only
/// dispatches on the enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetContestChannel { channel: Option<ChannelId> },
    TrackChannel { channel: ChannelId },
    DrawWinner,
    DrawWinnerToChannel { channel: ChannelId },
    AnalyzeHistory { channel: ChannelId },
    ParticipantCount,
    Restart,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command not found!")]
    Unknown,

    #[error("Missing required argument!")]
    MissingArgument,

    #[error("`{0}` is not a valid channel id")]
    InvalidChannel(String),
}

impl Command {
    /// Parse a chat message into a command. `None` means the message is not
    /// addressed to the bot at all; `Some(Err(..))` means it carried the
    /// prefix but was malformed, which deserves an error reply.
    pub fn parse(content: &str, prefix: &str) -> Option<Result<Command, CommandError>> {
        let body = content.strip_prefix(prefix)?;
        let mut words = body.split_whitespace();
        let name = words.next()?;
        let arg = words.next();

        Some(match name {
            "set-contest-channel" => match arg {
                None => Ok(Command::SetContestChannel { channel: None }),
                Some(raw) => parse_channel(raw).map(|channel| Command::SetContestChannel {
                    channel: Some(channel),
                }),
            },
            "track-channel" => {
                require_channel(arg).map(|channel| Command::TrackChannel { channel })
            }
            "draw-winner" => Ok(Command::DrawWinner),
            "draw-winner-to-channel" => {
                require_channel(arg).map(|channel| Command::DrawWinnerToChannel { channel })
            }
            "analyze-history" => {
                require_channel(arg).map(|channel| Command::AnalyzeHistory { channel })
            }
            "participant-count" => Ok(Command::ParticipantCount),
            "restart" => Ok(Command::Restart),
            _ => Err(CommandError::Unknown),
        })
    }
}

fn require_channel(arg: Option<&str>) -> Result<ChannelId, CommandError> {
    arg.ok_or(CommandError::MissingArgument)
        .and_then(parse_channel)
}

/// Channel arguments come in two shapes: a raw numeric id or a `<#id>`
/// mention pasted from the client.
pub fn parse_channel(raw: &str) -> Result<ChannelId, CommandError> {
    let digits = raw
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(raw);
    digits
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(ChannelId::new)
        .ok_or_else(|| CommandError::InvalidChannel(raw.to_string()))
}

/// Collect every `<#id>` mention in a message, for the interactive channel
/// pick.
pub fn mentioned_channels(content: &str) -> Vec<ChannelId> {
    content
        .split_whitespace()
        .filter_map(|word| {
            let digits = word.strip_prefix("<#")?.strip_suffix('>')?;
            let id = digits.parse::<u64>().ok()?;
            (id != 0).then(|| ChannelId::new(id))
        })
        .collect()
}
