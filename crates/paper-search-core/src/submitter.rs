//! Query submitter: one input, one in-flight request, one results list.
//!
//! The exchange is split into [`Submitter::begin`] and [`Submitter::complete`]
//! so a UI can run the POST on a background task and feed the outcome back
//! from its event loop. [`Submitter::submit`] does both in one await.

use tracing::{debug, info, warn};

use crate::client::BackendClient;
use crate::display::DisplayItem;
use crate::error::BackendError;
use crate::protocol::{parse_reply, PapersReply, RawReply, Reply, RequestBody};
use crate::state::{ChatMessage, ChatRole};
use crate::variant::Variant;

pub const DEFAULT_MAX_RESULTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight { id: u64 },
    Succeeded,
    Failed,
}

/// Outcome of feeding a reply to [`Submitter::complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    Failed,
    /// The reply belonged to an abandoned request and was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitterOptions {
    /// Sent as `max_results` by the papers variant
    pub max_results: u32,
    /// Drop replies whose request id is no longer the one in flight
    pub fence_stale_responses: bool,
}

impl Default for SubmitterOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            fence_stale_responses: true,
        }
    }
}

/// A request that has been started but not yet sent
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id: u64,
    pub variant: Variant,
    pub body: RequestBody,
}

impl PendingRequest {
    pub async fn send(&self, client: &BackendClient) -> Result<RawReply, BackendError> {
        client.post(self.variant, &self.body).await
    }
}

#[derive(Debug, Clone)]
pub struct Submitter {
    variant: Variant,
    options: SubmitterOptions,
    state: RequestState,
    last_id: u64,
    results: Vec<DisplayItem>,
    history: Vec<ChatMessage>,
}

impl Submitter {
    pub fn new(variant: Variant) -> Self {
        Self::with_options(variant, SubmitterOptions::default())
    }

    pub fn with_options(variant: Variant, options: SubmitterOptions) -> Self {
        Self {
            variant,
            options,
            state: RequestState::Idle,
            last_id: 0,
            results: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn options(&self) -> SubmitterOptions {
        self.options
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, RequestState::InFlight { .. })
    }

    /// Results of the last search/papers exchange (empty for chat)
    pub fn results(&self) -> &[DisplayItem] {
        &self.results
    }

    /// Chat history for this session (empty for search/papers)
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// What the results pane shows: the result set, or the chat history
    pub fn items(&self) -> Vec<DisplayItem> {
        if self.variant.keeps_history() {
            self.history
                .iter()
                .map(|m| DisplayItem::text(m.content.clone()))
                .collect()
        } else {
            self.results.clone()
        }
    }

    /// Start a submission. Returns `None` while another request is in flight.
    pub fn begin(&mut self, query: &str) -> Option<PendingRequest> {
        if self.is_busy() {
            debug!(variant = self.variant.as_str(), "submission ignored while busy");
            return None;
        }

        self.last_id += 1;
        let id = self.last_id;

        let body = match self.variant {
            Variant::Search => {
                self.results.clear();
                RequestBody::search(query)
            }
            Variant::Papers => {
                self.results.clear();
                RequestBody::papers(query, self.options.max_results)
            }
            Variant::Chat => {
                self.history.push(ChatMessage::user(query));
                RequestBody::chat(&self.history)
            }
        };

        self.state = RequestState::InFlight { id };
        info!(variant = self.variant.as_str(), id, query, "submitting query");

        Some(PendingRequest {
            id,
            variant: self.variant,
            body,
        })
    }

    /// Apply the outcome of request `id` and clear the busy state.
    pub fn complete(&mut self, id: u64, outcome: Result<RawReply, BackendError>) -> Completion {
        let is_current = self.state == RequestState::InFlight { id };
        if !is_current {
            if self.options.fence_stale_responses {
                warn!(variant = self.variant.as_str(), id, "dropping reply from abandoned request");
                return Completion::Stale;
            }
            warn!(variant = self.variant.as_str(), id, "applying reply from abandoned request");
        }

        match outcome.and_then(|raw| parse_reply(self.variant, &raw)) {
            Ok(reply) => {
                self.apply(reply);
                self.state = RequestState::Succeeded;
                Completion::Succeeded
            }
            Err(err) => {
                warn!(variant = self.variant.as_str(), id, error = %err, "query failed");
                self.apply_failure();
                self.state = RequestState::Failed;
                Completion::Failed
            }
        }
    }

    /// Begin, send, and complete one submission, then return what is shown.
    pub async fn submit(&mut self, client: &BackendClient, query: &str) -> Vec<DisplayItem> {
        if let Some(pending) = self.begin(query) {
            let outcome = pending.send(client).await;
            self.complete(pending.id, outcome);
        }
        self.items()
    }

    /// Abandon any in-flight request and forget results and history.
    pub fn reset(&mut self) {
        if let RequestState::InFlight { id } = self.state {
            debug!(variant = self.variant.as_str(), id, "abandoning in-flight request");
        }
        self.state = RequestState::Idle;
        self.results.clear();
        self.history.clear();
    }

    fn apply(&mut self, reply: Reply) {
        match reply {
            Reply::Query(reply) => {
                debug!(?reply, "query reply");
                self.results = reply.into_items();
            }
            Reply::Papers(reply) => {
                if let PapersReply::Empty { error: Some(error) } = &reply {
                    warn!(%error, "backend reported an error without results");
                }
                self.results = reply.into_items();
            }
            Reply::Agent(reply) => {
                self.history.push(ChatMessage::assistant(reply.into_content()));
            }
        }
    }

    fn apply_failure(&mut self) {
        let text = self.variant.failure_text();
        if self.variant.keeps_history() {
            self.history.push(ChatMessage {
                role: ChatRole::Assistant,
                content: text.to_string(),
            });
        } else {
            self.results = vec![DisplayItem::text(text)];
        }
    }
}
