use anyhow::Result;
use tokio::task::JoinHandle;

use crate::client::ReplyClient;

/// Fixed transcript line shown for every failed exchange. The distinguishing
/// detail goes to the diagnostic log only.
pub const ERROR_REPLY_TEXT: &str = "Error connecting to the reply service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Transcript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
    Error,
}

/// One transcript entry. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

/// The chat widget: input buffer, append-only transcript, and the set of
/// in-flight exchanges. All bound state lives here; nothing is looked up
/// ambiently.
pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Input state
    pub input: String,
    pub cursor: usize, // char index into input

    // Transcript state
    pub transcript: Vec<Message>,
    pub transcript_scroll: u16,
    pub transcript_height: u16, // inner height of the transcript pane
    pub transcript_width: u16,  // inner width, for wrap calculations

    // In-flight exchanges. A submit while others are outstanding is allowed;
    // replies append in whatever order completions are observed.
    pub exchanges: Vec<JoinHandle<Result<String>>>,

    // Animation state (0-2 for the ellipsis)
    pub animation_frame: u8,

    pub client: ReplyClient,
}

impl App {
    pub fn new(client: ReplyClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            input: String::new(),
            cursor: 0,

            transcript: Vec::new(),
            transcript_scroll: 0,
            transcript_height: 0,
            transcript_width: 0,

            exchanges: Vec::new(),

            animation_frame: 0,

            client,
        }
    }

    /// Handle the send action: trim the input, append the user line, clear
    /// the field and spawn one exchange. Empty or whitespace-only input is a
    /// no-op (nothing appended, nothing sent, field untouched).
    pub fn submit(&mut self) {
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return;
        }

        self.transcript.push(Message {
            sender: Sender::User,
            text: message.clone(),
        });
        self.input.clear();
        self.cursor = 0;

        tracing::debug!(chars = message.chars().count(), "sending message");
        let client = self.client.clone();
        self.exchanges
            .push(tokio::spawn(async move { client.send(&message).await }));

        self.scroll_to_bottom();
    }

    /// Collect finished exchanges, appending exactly one Bot or Error line
    /// per completion. Outstanding exchanges are left alone; nothing is
    /// cancelled or reordered.
    pub async fn drain_exchanges(&mut self) {
        if self.exchanges.is_empty() {
            return;
        }

        let mut outstanding = Vec::with_capacity(self.exchanges.len());
        let mut appended = false;
        for handle in std::mem::take(&mut self.exchanges) {
            if !handle.is_finished() {
                outstanding.push(handle);
                continue;
            }
            match handle.await {
                Ok(Ok(reply)) => {
                    self.transcript.push(Message {
                        sender: Sender::Bot,
                        text: reply,
                    });
                }
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "exchange failed");
                    self.transcript.push(Message {
                        sender: Sender::Error,
                        text: ERROR_REPLY_TEXT.to_string(),
                    });
                }
                Err(err) => {
                    tracing::error!(error = %err, "exchange task aborted");
                    self.transcript.push(Message {
                        sender: Sender::Error,
                        text: ERROR_REPLY_TEXT.to_string(),
                    });
                }
            }
            appended = true;
        }
        self.exchanges = outstanding;
        if appended {
            self.scroll_to_bottom();
        }
    }

    pub fn pending_exchanges(&self) -> usize {
        self.exchanges.len()
    }

    /// Total rendered transcript lines at the current wrap width: a sender
    /// line plus wrapped content lines plus a blank separator per message,
    /// and the Thinking indicator while exchanges are outstanding.
    pub fn transcript_line_count(&self) -> u16 {
        let wrap_width = if self.transcript_width > 0 {
            self.transcript_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;
        for msg in &self.transcript {
            total += 1; // sender line
            if msg.text.is_empty() {
                total += 1;
            }
            for line in msg.text.lines() {
                // Character count, not byte length, for UTF-8 content
                let char_count = line.chars().count();
                if char_count == 0 {
                    total += 1;
                } else {
                    total += (char_count / wrap_width + 1) as u16;
                }
            }
            total += 1; // blank line after message
        }

        if !self.exchanges.is_empty() {
            total += 2; // sender line + "Thinking..."
        }

        total
    }

    pub fn scroll_to_bottom(&mut self) {
        let visible = if self.transcript_height > 0 {
            self.transcript_height
        } else {
            20
        };
        self.transcript_scroll = self.transcript_line_count().saturating_sub(visible);
    }

    pub fn scroll_down(&mut self) {
        let max_scroll = self
            .transcript_line_count()
            .saturating_sub(self.transcript_height);
        if self.transcript_scroll < max_scroll {
            self.transcript_scroll = self.transcript_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.transcript_height / 2;
        let max_scroll = self
            .transcript_line_count()
            .saturating_sub(self.transcript_height);
        self.transcript_scroll = (self.transcript_scroll + half_page).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.transcript_height / 2;
        self.transcript_scroll = self.transcript_scroll.saturating_sub(half_page);
    }

    pub fn scroll_to_top(&mut self) {
        self.transcript_scroll = 0;
    }

    /// Tick animation frame (driven by the Tick event).
    pub fn tick_animation(&mut self) {
        if !self.exchanges.is_empty() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
