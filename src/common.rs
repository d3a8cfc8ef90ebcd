// Simple reply formating
pub fn fmt_reply(emoji: Re, message: &str) -> String {
    let emoji = Re::e(emoji);

    format!("{emoji} {message}")
}

// Reply emojis
pub enum Re {
    Fail,
    Count,
    Done,
    Reload,
}

// Serilizing emojis
impl Re {
    pub fn e(self) -> &'static str {
        match self {
            Re::Fail => "❌",
            Re::Count => "📊",
            Re::Done => "✅",
            Re::Reload => "🔄",
        }
    }
}
