use serenity::model::id::ChannelId;
use thiserror::Error;

/// Everything a command can fail with. The handler converts these into
/// short chat replies at the command boundary.
#[derive(Debug, Error)]
pub enum ContestError {
    #[error("channel {0} was not found or the bot cannot access it")]
    ChannelNotFound(ChannelId),

    #[error("there are no participants in the contest")]
    NoParticipants,

    #[error("no channel was picked before the timeout")]
    SelectionTimeout,

    #[error("history analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("user {0} could not be resolved")]
    UnknownUser(String),

    #[error("chat platform request failed: {0}")]
    Platform(#[from] serenity::Error),

    #[error("participant store io failed: {0}")]
    Store(#[from] std::io::Error),

    #[error("participant store serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
