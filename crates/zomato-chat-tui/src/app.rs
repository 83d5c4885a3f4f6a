use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use zomato_chat_core::client;
use zomato_chat_core::{BackendClient, Conversation, HealthStatus, ToolInfo};
use crate::scroll::ScrollState;

/// Ticks per frame of the typing indicator animation
const TYPING_FRAME_TICKS: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Healthy(String),
    Unreachable,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Message input
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Conversation
    pub conversation: Conversation,
    pub chat_task: Option<JoinHandle<client::Result<String>>>,
    pub reset_task: Option<JoinHandle<client::Result<()>>>,
    pub scroll: ScrollState,
    pub chat_height: u16, // Inner height of the message area
    pub chat_width: u16,  // Inner width of the message area

    // Backend
    pub backend: BackendClient,
    pub backend_status: BackendStatus,
    pub health_task: Option<JoinHandle<client::Result<HealthStatus>>>,
    pub status_message: Option<String>,

    // Tools popup
    pub show_tools: bool,
    pub tools: Vec<ToolInfo>,
    pub tools_state: ListState,
    pub tools_task: Option<JoinHandle<client::Result<Vec<ToolInfo>>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator
    tick_count: u8,

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            input: String::new(),
            input_cursor: 0,

            conversation: Conversation::new(),
            chat_task: None,
            reset_task: None,
            scroll: ScrollState::default(),
            chat_height: 0,
            chat_width: 0,

            backend,
            backend_status: BackendStatus::Unknown,
            health_task: None,
            status_message: None,

            show_tools: false,
            tools: Vec::new(),
            tools_state: ListState::default(),
            tools_task: None,

            animation_frame: 0,
            tick_count: 0,

            chat_area: None,
        }
    }

    /// Input is disabled while a reply is pending
    pub fn input_enabled(&self) -> bool {
        !self.conversation.is_loading()
    }

    /// Send the input box contents to the backend in the background.
    pub fn submit_input(&mut self) {
        let Some(request) = self.conversation.begin_send(&self.input) else {
            return;
        };

        self.input.clear();
        self.input_cursor = 0;

        let backend = self.backend.clone();
        self.chat_task = Some(tokio::spawn(async move { backend.chat(&request).await }));
    }

    pub fn start_reset(&mut self) {
        if self.reset_task.is_some() {
            return;
        }

        let backend = self.backend.clone();
        self.reset_task = Some(tokio::spawn(async move { backend.reset().await }));
    }

    pub fn check_health(&mut self) {
        let backend = self.backend.clone();
        self.health_task = Some(tokio::spawn(async move { backend.health().await }));
    }

    pub fn open_tools(&mut self) {
        if self.tools_task.is_some() {
            return;
        }

        self.status_message = Some("Loading tools...".to_string());
        let backend = self.backend.clone();
        self.tools_task = Some(tokio::spawn(async move { backend.list_tools().await }));
    }

    pub fn close_tools(&mut self) {
        self.show_tools = false;
    }

    /// Collect background tasks that have finished. Called once per loop
    /// iteration; never blocks on a task that is still running.
    pub async fn poll_tasks(&mut self) {
        if let Some(task) = take_finished(&mut self.chat_task) {
            let outcome = match task.await {
                Ok(outcome) => outcome.map_err(anyhow::Error::from),
                Err(e) => Err(anyhow::Error::from(e).context("chat task did not complete")),
            };
            self.conversation.complete_send(outcome);
        }

        if let Some(task) = take_finished(&mut self.reset_task) {
            match task.await {
                Ok(outcome) => self.conversation.complete_reset(outcome),
                Err(e) => tracing::error!("reset task did not complete: {}", e),
            }
        }

        if let Some(task) = take_finished(&mut self.health_task) {
            self.backend_status = match task.await {
                Ok(Ok(health)) => {
                    let service = health.service.unwrap_or_else(|| "backend".to_string());
                    tracing::info!(status = %health.status, %service, "backend is up");
                    BackendStatus::Healthy(service)
                }
                Ok(Err(e)) => {
                    tracing::warn!("backend health check failed: {}", e);
                    BackendStatus::Unreachable
                }
                Err(e) => {
                    tracing::warn!("health check task did not complete: {}", e);
                    BackendStatus::Unreachable
                }
            };
        }

        if let Some(task) = take_finished(&mut self.tools_task) {
            match task.await {
                Ok(Ok(tools)) => self.show_tool_list(tools),
                Ok(Err(e)) => {
                    tracing::warn!("could not list tools: {}", e);
                    self.status_message = Some(format!("Could not load tools: {}", e));
                }
                Err(e) => {
                    tracing::warn!("tools task did not complete: {}", e);
                    self.status_message = Some("Could not load tools".to_string());
                }
            }
        }
    }

    pub fn show_tool_list(&mut self, tools: Vec<ToolInfo>) {
        self.status_message = None;
        self.tools = tools;
        self.tools_state.select(if self.tools.is_empty() { None } else { Some(0) });
        self.show_tools = true;
    }

    pub fn tools_nav_down(&mut self) {
        let len = self.tools.len();
        if len > 0 {
            let i = self.tools_state.selected().unwrap_or(0);
            self.tools_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn tools_nav_up(&mut self) {
        let i = self.tools_state.selected().unwrap_or(0);
        self.tools_state.select(Some(i.saturating_sub(1)));
    }

    /// Called by the Tick event
    pub fn tick(&mut self) {
        self.scroll.tick();

        if self.conversation.is_loading() {
            self.tick_count = self.tick_count.wrapping_add(1);
            if self.tick_count % TYPING_FRAME_TICKS == 0 {
                self.animation_frame = (self.animation_frame + 1) % 3;
            }
        }
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll.scroll_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll.scroll_up((self.chat_height / 2).max(1));
    }
}

fn take_finished<T>(slot: &mut Option<JoinHandle<T>>) -> Option<JoinHandle<T>> {
    if slot.as_ref().is_some_and(|task| task.is_finished()) {
        slot.take()
    } else {
        None
    }
}
