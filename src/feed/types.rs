use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub received: i64,

    // Set by the merge step for the few most recently arrived messages,
    // never part of the wire format.
    #[serde(skip)]
    pub is_new: bool,
}

/// Wire envelope of the unread feed. Anything other than `status: "ok"` is
/// treated as a failed fetch.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub messages: Vec<Message>,
}
