use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque server-assigned item identifier. Identity is by id only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

/// A single feed entry. The payload fields are opaque to the controller;
/// only `id` participates in pagination and dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: ItemId,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    pub fn new(id: impl Into<ItemId>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: None,
            body: body.into(),
            published_at: None,
        }
    }
}

/// One fetched page, in server-assigned order. An empty page is the sole
/// end-of-feed signal.
pub type Page = Vec<FeedItem>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_json_is_transparent() {
        let id: ItemId = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(id, ItemId::from("42"));
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""42""#);
    }

    #[test]
    fn test_item_deserializes_with_missing_payload_fields() {
        let item: FeedItem = serde_json::from_str(r#"{"id":"7"}"#).unwrap();
        assert_eq!(item.id, ItemId::from("7"));
        assert!(item.author.is_none());
        assert!(item.body.is_empty());
    }
}
