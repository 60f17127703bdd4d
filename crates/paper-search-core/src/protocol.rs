//! Wire shapes for the three exchanges and the typed replies they decode to.
//!
//! Replies are discriminated by which optional field is present, in a fixed
//! order per variant. Each variant gets its own reply enum so call sites
//! match exhaustively instead of probing fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::display::DisplayItem;
use crate::error::BackendError;
use crate::state::{ChatMessage, ChatRole};
use crate::variant::Variant;

/// Body for `/query`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub input: String,
    pub state: Map<String, Value>,
}

/// Message as sent to the agent routes; the papers route omits the role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatRole>,
    pub content: String,
}

impl From<&ChatMessage> for OutgoingMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: Some(msg.role),
            content: msg.content.clone(),
        }
    }
}

/// Body for the agent routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<OutgoingMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Search(SearchRequest),
    Chat(ChatRequest),
}

impl RequestBody {
    pub fn search(input: &str) -> Self {
        RequestBody::Search(SearchRequest {
            input: input.to_string(),
            state: Map::new(),
        })
    }

    pub fn papers(query: &str, max_results: u32) -> Self {
        RequestBody::Chat(ChatRequest {
            messages: vec![OutgoingMessage {
                role: None,
                content: query.to_string(),
            }],
            max_results: Some(max_results),
        })
    }

    pub fn chat(history: &[ChatMessage]) -> Self {
        RequestBody::Chat(ChatRequest {
            messages: history.iter().map(OutgoingMessage::from).collect(),
            max_results: None,
        })
    }
}

/// Status and body of a completed POST, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaperResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// Reply from `/query`: `messages` wins over `error`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryReply {
    Messages(Vec<MessageContent>),
    Error(String),
    Empty,
}

/// Reply from the papers route; only `results` is consulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PapersReply {
    Results(Vec<PaperResult>),
    Empty { error: Option<String> },
}

/// Reply from the chat route; only `content` is consulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    Content(String),
    Empty,
}

/// A decoded reply, tagged by the variant that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Query(QueryReply),
    Papers(PapersReply),
    Agent(AgentReply),
}

#[derive(Deserialize)]
struct QueryWire {
    messages: Option<Vec<MessageContent>>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct PapersWire {
    results: Option<Vec<PaperResult>>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct AgentWire {
    content: Option<Value>,
}

/// Decode `raw` as the reply of `variant`.
///
/// A body that fails to decode is a [`BackendError::Status`] when the status
/// was not a success, otherwise a [`BackendError::Decode`].
pub fn parse_reply(variant: Variant, raw: &RawReply) -> Result<Reply, BackendError> {
    let decoded = match variant {
        Variant::Search => parse_query_reply(&raw.body).map(Reply::Query),
        Variant::Papers => parse_papers_reply(&raw.body).map(Reply::Papers),
        Variant::Chat => parse_agent_reply(&raw.body).map(Reply::Agent),
    };

    match decoded {
        Err(BackendError::Decode(_)) if !raw.is_success() => Err(BackendError::Status {
            status: raw.status,
            body: raw.body.clone(),
        }),
        other => other,
    }
}

pub fn parse_query_reply(body: &str) -> Result<QueryReply, BackendError> {
    let wire: QueryWire = serde_json::from_str(body)?;

    if let Some(messages) = wire.messages {
        return Ok(QueryReply::Messages(messages));
    }
    match wire.error.as_ref().and_then(value_text) {
        Some(error) => Ok(QueryReply::Error(error)),
        None => Ok(QueryReply::Empty),
    }
}

pub fn parse_papers_reply(body: &str) -> Result<PapersReply, BackendError> {
    let wire: PapersWire = serde_json::from_str(body)?;

    match wire.results {
        Some(results) => Ok(PapersReply::Results(results)),
        None => Ok(PapersReply::Empty {
            error: wire.error.as_ref().and_then(value_text),
        }),
    }
}

pub fn parse_agent_reply(body: &str) -> Result<AgentReply, BackendError> {
    let wire: AgentWire = serde_json::from_str(body)?;

    match wire.content.as_ref().and_then(value_text) {
        Some(content) => Ok(AgentReply::Content(content)),
        None => Ok(AgentReply::Empty),
    }
}

/// Text of a loosely typed field. Falsy values (`null`, `false`, `""`, `0`)
/// count as absent.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl QueryReply {
    pub fn into_items(self) -> Vec<DisplayItem> {
        match self {
            QueryReply::Messages(messages) => messages
                .into_iter()
                .map(|m| DisplayItem::text(m.content))
                .collect(),
            QueryReply::Error(error) => vec![DisplayItem::text(format!("Error: {}", error))],
            QueryReply::Empty => Vec::new(),
        }
    }
}

impl PapersReply {
    pub fn into_items(self) -> Vec<DisplayItem> {
        match self {
            PapersReply::Results(results) => results
                .into_iter()
                .map(|r| DisplayItem::Paper {
                    title: r.title,
                    authors: r.authors,
                    summary: r.summary,
                })
                .collect(),
            PapersReply::Empty { .. } => Vec::new(),
        }
    }
}

impl AgentReply {
    /// Text of the assistant entry appended to the history
    pub fn into_content(self) -> String {
        match self {
            AgentReply::Content(content) => content,
            AgentReply::Empty => "No response".to_string(),
        }
    }
}
