use std::path::PathBuf;

use anyhow::Result;
use paper_search_core::{
    BackendClient, BackendError, Config, RawReply, Submitter, Variant,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::{debug, warn};

use crate::tui::{AppEvent, EventSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub mode: Variant,
    pub input_mode: InputMode,

    // Query input (shared across modes)
    pub query_input: String,
    pub query_cursor: usize, // cursor position in query_input, in chars

    // One submitter per exchange variant
    pub search: Submitter,
    pub papers: Submitter,
    pub chat: Submitter,
    /// Where background requests post their replies
    pub events: EventSender,

    // Results state
    pub results_state: ListState,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub results_area: Option<Rect>,

    // Backends
    pub backend: BackendClient,
    pub agent: BackendClient,

    // Settings
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl App {
    /// Build the app from `config`. Mode switches are persisted to
    /// `config_path` when one is given.
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        mode: Option<Variant>,
        events: EventSender,
    ) -> Result<Self> {
        let timeout = config.request_timeout();
        let backend = BackendClient::with_timeout(Variant::Search.base_url(), timeout)?;
        let agent = BackendClient::with_timeout(Variant::Chat.base_url(), timeout)?;

        let options = config.submitter_options();
        let mode = mode.unwrap_or_else(|| config.mode());

        Ok(Self {
            should_quit: false,
            mode,
            input_mode: InputMode::Editing,

            query_input: String::new(),
            query_cursor: 0,

            search: Submitter::with_options(Variant::Search, options),
            papers: Submitter::with_options(Variant::Papers, options),
            chat: Submitter::with_options(Variant::Chat, options),
            events,

            results_state: ListState::default(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            results_area: None,

            backend,
            agent,

            config,
            config_path,
        })
    }

    pub fn submitter(&self, variant: Variant) -> &Submitter {
        match variant {
            Variant::Search => &self.search,
            Variant::Papers => &self.papers,
            Variant::Chat => &self.chat,
        }
    }

    pub fn submitter_mut(&mut self, variant: Variant) -> &mut Submitter {
        match variant {
            Variant::Search => &mut self.search,
            Variant::Papers => &mut self.papers,
            Variant::Chat => &mut self.chat,
        }
    }

    pub fn current(&self) -> &Submitter {
        self.submitter(self.mode)
    }

    fn client_for(&self, variant: Variant) -> BackendClient {
        match variant {
            Variant::Search | Variant::Papers => self.backend.clone(),
            Variant::Chat => self.agent.clone(),
        }
    }

    /// Submit the input in the current mode. Returns false while busy.
    pub fn submit_query(&mut self) -> bool {
        let variant = self.mode;
        let query = self.query_input.clone();

        let Some(pending) = self.submitter_mut(variant).begin(&query) else {
            return false;
        };

        // The chat box empties after sending; the search boxes keep the query
        if variant.keeps_history() {
            self.query_input.clear();
            self.query_cursor = 0;
            self.scroll_chat_to_bottom();
        } else {
            self.results_state.select(None);
        }

        let client = self.client_for(variant);
        let events = self.events.clone();
        let id = pending.id;
        tokio::spawn(async move {
            // The POST runs on its own task so a panic there still reports back
            let outcome = match tokio::spawn(async move { pending.send(&client).await }).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(variant = variant.as_str(), id, error = %err, "request task did not finish");
                    Err(BackendError::Transport(err.to_string()))
                }
            };
            // The loop is gone when the app quit mid-request
            let _ = events.send(AppEvent::Reply { variant, id, outcome });
        });
        true
    }

    /// Hand a finished request to its submitter.
    pub fn apply_reply(&mut self, variant: Variant, id: u64, outcome: Result<RawReply, BackendError>) {
        let completion = self.submitter_mut(variant).complete(id, outcome);
        debug!(variant = variant.as_str(), id, ?completion, "request completed");

        if variant == self.mode {
            if variant.keeps_history() {
                self.scroll_chat_to_bottom();
            } else if !self.current().results().is_empty() {
                self.results_state.select(Some(0));
            }
        }
    }

    pub fn any_busy(&self) -> bool {
        Variant::all().into_iter().any(|v| self.submitter(v).is_busy())
    }

    pub fn switch_mode(&mut self, mode: Variant) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        let has_results = !self.current().results().is_empty();
        self.results_state.select(if has_results { Some(0) } else { None });
        if mode.keeps_history() {
            self.scroll_chat_to_bottom();
        }

        self.config.default_mode = mode.as_str().to_string();
        if let Some(path) = &self.config_path {
            if let Err(err) = self.config.save_to(path) {
                warn!(error = %err, "could not save default mode");
            }
        }
    }

    /// Abandon the current mode's request and clear its results.
    pub fn reset_current(&mut self) {
        let mode = self.mode;
        self.submitter_mut(mode).reset();
        self.results_state.select(None);
        self.chat_scroll = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.any_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn results_nav_down(&mut self) {
        let len = self.current().results().len();
        if len > 0 {
            let i = self.results_state.selected().unwrap_or(0);
            self.results_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn results_nav_up(&mut self) {
        if !self.current().results().is_empty() {
            let i = self.results_state.selected().unwrap_or(0);
            self.results_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn results_first(&mut self) {
        if !self.current().results().is_empty() {
            self.results_state.select(Some(0));
        }
    }

    pub fn results_last(&mut self) {
        let len = self.current().results().len();
        if len > 0 {
            self.results_state.select(Some(len - 1));
        }
    }

    pub fn scroll_down(&mut self) {
        if self.mode.keeps_history() {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        } else {
            self.results_nav_down();
        }
    }

    pub fn scroll_up(&mut self) {
        if self.mode.keeps_history() {
            self.chat_scroll = self.chat_scroll.saturating_sub(1);
        } else {
            self.results_nav_up();
        }
    }

    /// Scroll chat to bottom so the newest entry (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for msg in self.chat.history() {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines += char_count / wrap_width + 1;
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_busy() {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height as usize
        } else {
            20
        };

        // Paragraph scroll offsets are u16
        let offset = total_lines.saturating_sub(visible_height);
        self.chat_scroll = u16::try_from(offset).unwrap_or(u16::MAX);
    }
}
