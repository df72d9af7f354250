//! Conversation records and the listing query contract.
//!
//! The `_find` endpoint accepts snake_case query parameters and answers
//! with a camelCase page envelope; [`FindConversationsParams`] carries the
//! parameter defaults (page 1, twenty per page) so both sides of the
//! contract deserialize consistently.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sortable fields of a conversation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    IsDefault,
    Title,
    UpdatedAt,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::CreatedAt => write!(f, "created_at"),
            SortField::IsDefault => write!(f, "is_default"),
            SortField::Title => write!(f, "title"),
            SortField::UpdatedAt => write!(f, "updated_at"),
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "is_default" => Ok(SortField::IsDefault),
            "title" => Ok(SortField::Title),
            "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(format!("invalid sort field: '{other}'")),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sort order: '{other}'")),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Reject page numbers below one while still coercing from query strings.
fn deserialize_page<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let page = u32::deserialize(deserializer)?;
    if page < 1 {
        return Err(serde::de::Error::custom("page must be >= 1"));
    }
    Ok(page)
}

/// `fields` travels as one comma-delimited scalar, not a repeated key.
mod comma_delimited {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(fields) => serializer.serialize_str(&fields.join(",")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.map(|s| {
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        }))
    }
}

/// Query parameters for the conversation listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindConversationsParams {
    /// Sparse fieldset to return, comma-delimited on the wire.
    #[serde(default, with = "comma_delimited", skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Free-text search query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Page number, 1-based.
    #[serde(default = "default_page", deserialize_with = "deserialize_page")]
    pub page: u32,
    /// Results per page. Zero is a valid request for an empty page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for FindConversationsParams {
    fn default() -> Self {
        Self {
            fields: None,
            filter: None,
            sort_field: None,
            sort_order: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// A conversation as the gateway reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One page of conversation listing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindConversationsPage {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub data: Vec<ConversationRecord>,
}
