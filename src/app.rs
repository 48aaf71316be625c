use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::warn;
use crate::config::{Config, DEFAULT_BASE_URL};
use crate::dikai::{AskResponse, DikaiClient};

/// Shown when the backend responds without an answer field.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I couldn't find an answer to that. Please try rephrasing your question.";

/// Shown when the request itself fails; the underlying error is only logged.
pub const REQUEST_FAILED: &str =
    "Sorry, something went wrong while reaching the knowledge base. Please try again.";

pub const SUGGESTIONS: [&str; 4] = [
    "How do I register for courses?",
    "What is the grading system?",
    "When was Daystar founded?",
    "How do I pay tuition fees?",
];

/// Static department directory shown in the sidebar.
#[derive(Debug, Clone, Copy)]
pub struct Department {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub const DEPARTMENTS: [Department; 4] = [
    Department { name: "Finance Office", icon: "$", description: "Fees & billing" },
    Department { name: "Registrar", icon: "≡", description: "Transcripts & registration" },
    Department { name: "ICT Helpdesk", icon: "⌨", description: "Portal support" },
    Department { name: "Student Affairs", icon: "☺", description: "Clubs & life" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Chat,
    Suggestions,
    Input,
}

/// Display label only; the request payload always sends "en".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Kiswahili,
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Kiswahili => "Kiswahili",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::English => Language::Kiswahili,
            Language::Kiswahili => Language::English,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub sources: Vec<String>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation state
    pub messages: Vec<Message>,
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars
    pub pending: Vec<JoinHandle<anyhow::Result<AskResponse>>>,

    // View flags
    pub sidebar_open: bool,
    pub language: Language,

    // Sidebar and suggestion selection
    pub sidebar_state: ListState,
    pub suggestion_idx: usize,

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub sidebar_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    pub client: DikaiClient,
}

impl App {
    pub fn new() -> Self {
        // Load config; env var wins over the file, then the fallback
        let config = Config::load().unwrap_or_else(|_| Config::new());
        let base_url = std::env::var("DIKAI_BASE_URL")
            .ok()
            .or_else(|| config.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = DikaiClient::new(&base_url);

        let mut sidebar_state = ListState::default();
        sidebar_state.select(Some(0));

        Self {
            should_quit: false,
            // Start ready to type, like the web UI's always-focused input
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            messages: Vec::new(),
            input: String::new(),
            input_cursor: 0,
            pending: Vec::new(),

            sidebar_open: true,
            language: Language::English,

            sidebar_state,
            suggestion_idx: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            sidebar_area: None,
            chat_area: None,

            client,
        }
    }

    /// Accept a question for sending. Uses `text` (from a suggestion chip)
    /// if given, else the current draft. Whitespace-only input is ignored.
    /// On acceptance the user message is appended, the draft cleared, and
    /// the accepted question returned for the caller to dispatch.
    pub fn submit(&mut self, text: Option<&str>) -> Option<String> {
        let question = match text {
            Some(text) => text.to_string(),
            None => self.input.clone(),
        };
        if question.trim().is_empty() {
            return None;
        }

        self.messages.push(Message {
            sender: Sender::User,
            text: question.clone(),
            sources: Vec::new(),
        });
        self.input.clear();
        self.input_cursor = 0;
        self.scroll_chat_to_bottom();

        Some(question)
    }

    /// Append the bot's turn from a finished request. A missing answer
    /// falls back to a fixed text; a failed request becomes a fixed error
    /// message and the cause goes to the log only.
    pub fn push_answer(&mut self, result: anyhow::Result<AskResponse>) {
        let message = match result {
            Ok(response) => Message {
                sender: Sender::Bot,
                text: response
                    .answer
                    .map(|answer| answer.into_text())
                    .unwrap_or_else(|| FALLBACK_ANSWER.to_string()),
                sources: response.sources,
            },
            Err(err) => {
                warn!("ask request failed: {err:#}");
                Message {
                    sender: Sender::Bot,
                    text: REQUEST_FAILED.to_string(),
                    sources: Vec::new(),
                }
            }
        };
        self.messages.push(message);
        self.scroll_chat_to_bottom();
    }

    /// Clear the conversation and the draft. View flags are untouched, and
    /// in-flight requests keep running; a late answer lands in whatever
    /// conversation exists when it resolves.
    pub fn new_chat(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.input_cursor = 0;
        self.chat_scroll = 0;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn toggle_language(&mut self) {
        self.language = self.language.toggled();
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    // Sidebar navigation
    pub fn sidebar_nav_down(&mut self) {
        let len = DEPARTMENTS.len();
        if len > 0 {
            let i = self.sidebar_state.selected().unwrap_or(0);
            self.sidebar_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn sidebar_nav_up(&mut self) {
        let i = self.sidebar_state.selected().unwrap_or(0);
        self.sidebar_state.select(Some(i.saturating_sub(1)));
    }

    // Suggestion chip selection
    pub fn suggestion_next(&mut self) {
        self.suggestion_idx = (self.suggestion_idx + 1).min(SUGGESTIONS.len() - 1);
    }

    pub fn suggestion_prev(&mut self) {
        self.suggestion_idx = self.suggestion_idx.saturating_sub(1);
    }

    pub fn selected_suggestion(&self) -> &'static str {
        SUGGESTIONS[self.suggestion_idx.min(SUGGESTIONS.len() - 1)]
    }

    // Chat scrolling
    pub fn scroll_chat_down(&mut self) {
        let total = self.chat_line_count();
        if self.chat_scroll < total.saturating_sub(self.chat_height) {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.chat_height / 2;
        let max_scroll = self.chat_line_count().saturating_sub(self.chat_height);
        self.chat_scroll = (self.chat_scroll + half_page).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.chat_height / 2;
        self.chat_scroll = self.chat_scroll.saturating_sub(half_page);
    }

    /// Scroll so the newest turn (or the "Thinking..." indicator) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Rendered line count of the conversation, mirroring the wrap rules
    /// the chat paragraph uses.
    fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.messages {
            total_lines += 1; // Label line ("You:" or "DIKAI:")
            for line in msg.text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += msg.sources.len() as u16;
            total_lines += 1; // Blank line after message
        }

        if self.is_loading() {
            total_lines += 2; // "DIKAI:" + "Thinking..."
        }

        total_lines
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dikai::AskResponse;
    use anyhow::anyhow;

    fn response(json: &str) -> AskResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_submit_is_ignored() {
        let mut app = App::new();
        assert!(app.submit(None).is_none());
        assert!(app.messages.is_empty());
    }

    #[test]
    fn whitespace_submit_is_ignored() {
        let mut app = App::new();
        app.input = "   \t ".to_string();
        assert!(app.submit(None).is_none());
        assert!(app.messages.is_empty());
        // The rejected draft is kept for the user to fix
        assert_eq!(app.input, "   \t ");
    }

    #[test]
    fn submit_appends_user_message_and_clears_draft() {
        let mut app = App::new();
        app.input = "How do I pay tuition fees?".to_string();
        app.input_cursor = app.input.chars().count();

        let question = app.submit(None);

        assert_eq!(question.as_deref(), Some("How do I pay tuition fees?"));
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].sender, Sender::User);
        assert_eq!(app.messages[0].text, "How do I pay tuition fees?");
        assert!(app.messages[0].sources.is_empty());
        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);
    }

    #[test]
    fn suggestion_submit_overrides_draft_and_clears_it() {
        let mut app = App::new();
        app.input = "half-typed".to_string();

        let question = app.submit(Some("When was Daystar founded?"));

        assert_eq!(question.as_deref(), Some("When was Daystar founded?"));
        assert_eq!(app.messages[0].text, "When was Daystar founded?");
        assert!(app.input.is_empty());
    }

    #[test]
    fn answer_list_is_joined_with_newlines() {
        let mut app = App::new();
        app.push_answer(Ok(response(r#"{"answer": ["A", "B"], "sources": ["http://x"]}"#)));

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].sender, Sender::Bot);
        assert_eq!(app.messages[0].text, "A\nB");
        assert_eq!(app.messages[0].sources, vec!["http://x".to_string()]);
    }

    #[test]
    fn missing_answer_uses_fallback_text() {
        let mut app = App::new();
        app.push_answer(Ok(response("{}")));

        assert_eq!(app.messages[0].text, FALLBACK_ANSWER);
        assert!(app.messages[0].sources.is_empty());
    }

    #[test]
    fn failed_request_appends_fixed_error_message() {
        let mut app = App::new();
        app.push_answer(Err(anyhow!("connection refused")));

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].sender, Sender::Bot);
        assert_eq!(app.messages[0].text, REQUEST_FAILED);
        assert!(app.messages[0].sources.is_empty());
    }

    #[test]
    fn one_question_one_answer() {
        let mut app = App::new();
        app.input = "How do I pay tuition fees?".to_string();
        app.submit(None);
        app.push_answer(Ok(response(r#"{"answer": "At the Finance Office."}"#)));

        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].sender, Sender::User);
        assert_eq!(app.messages[1].sender, Sender::Bot);
        assert_eq!(app.messages[1].text, "At the Finance Office.");
    }

    #[test]
    fn new_chat_clears_conversation_and_draft() {
        let mut app = App::new();
        app.input = "pending question".to_string();
        app.submit(None);
        app.push_answer(Ok(response(r#"{"answer": "An answer."}"#)));
        app.input = "another draft".to_string();

        app.new_chat();

        assert!(app.messages.is_empty());
        assert!(app.input.is_empty());
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn new_chat_leaves_view_flags_alone() {
        let mut app = App::new();
        app.sidebar_open = false;
        app.language = Language::Kiswahili;

        app.new_chat();

        assert!(!app.sidebar_open);
        assert_eq!(app.language, Language::Kiswahili);
    }

    #[test]
    fn toggling_sidebar_does_not_alter_conversation() {
        let mut app = App::new();
        app.input = "How do I register for courses?".to_string();
        app.submit(None);
        let before: Vec<String> = app.messages.iter().map(|m| m.text.clone()).collect();

        app.toggle_sidebar();
        app.toggle_sidebar();

        let after: Vec<String> = app.messages.iter().map(|m| m.text.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn language_toggle_cycles_labels() {
        let mut app = App::new();
        assert_eq!(app.language.label(), "English");
        app.toggle_language();
        assert_eq!(app.language.label(), "Kiswahili");
        app.toggle_language();
        assert_eq!(app.language.label(), "English");
    }

    #[test]
    fn suggestion_selection_clamps_at_both_ends() {
        let mut app = App::new();
        app.suggestion_prev();
        assert_eq!(app.selected_suggestion(), SUGGESTIONS[0]);

        for _ in 0..10 {
            app.suggestion_next();
        }
        assert_eq!(app.selected_suggestion(), SUGGESTIONS[SUGGESTIONS.len() - 1]);
    }

    #[tokio::test]
    async fn scroll_to_bottom_accounts_for_thinking_indicator() {
        let mut app = App::new();
        app.chat_height = 5;
        app.chat_width = 40;
        for _ in 0..4 {
            app.input = "a question that is long enough to wrap over the configured width".to_string();
            app.submit(None);
        }
        let without = app.chat_scroll;

        app.pending.push(tokio::spawn(async { Ok(response("{}")) }));
        app.scroll_chat_to_bottom();

        assert!(app.chat_scroll > without);
    }
}
