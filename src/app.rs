use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::config::Config;
use crate::feed::{self, FeedClient, Message};
use crate::format;
use crate::poll::{PollEvent, Poller};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    List,
    Reader,
}

/// Inline banner shown above the message table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Banner {
    /// The last fetch failed; polling continues on the next trigger.
    FetchFailed,
    /// The fetch pipeline died; no automatic triggers until it is rebuilt.
    StreamDead,
}

/// Focusable controls of the detail dialog. Tab cycles between them while
/// the dialog is open; nothing behind it can take input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ModalControl {
    #[default]
    CloseIcon,
    CloseButton,
}

impl ModalControl {
    pub fn next(self) -> Self {
        match self {
            Self::CloseIcon => Self::CloseButton,
            Self::CloseButton => Self::CloseIcon,
        }
    }
}

/// Screen rectangles of the rendered dialog, kept for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalAreas {
    pub dialog: Rect,
    pub close_icon: Rect,
    pub close_button: Rect,
}

/// Detail-dialog controller. Owned by the [`App`]; `message_id` doubles as
/// the open/closed state.
#[derive(Debug, Default)]
pub struct ModalState {
    pub message_id: Option<String>,
    pub focus: ModalControl,
    pub scroll: u16,
    pub areas: ModalAreas,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        self.message_id.is_some()
    }

    pub fn set_areas(&mut self, areas: ModalAreas) {
        self.areas = areas;
    }
}

pub struct App {
    pub config: Arc<Config>,
    pub view: View,
    pub messages: Vec<Message>,
    pub list_state: ListState,
    pub modal: ModalState,
    pub should_quit: bool,

    pub auto_refresh: bool,
    pub interval: Duration,
    pub banner: Option<Banner>,

    // Stats line
    pub fresh_count: usize,
    pub last_update: Option<String>,

    // Set during render, read for mouse handling
    pub list_area: Rect,

    poller: Option<Poller>,
    next_tick: Option<Instant>,
    in_flight: bool,
}

impl App {
    pub fn new(config: Arc<Config>) -> Self {
        let interval = Duration::from_secs(config.poll.interval_secs.max(1));
        let auto_refresh = config.poll.auto_refresh;
        Self {
            config,
            view: View::List,
            messages: Vec::new(),
            list_state: ListState::default(),
            modal: ModalState::default(),
            should_quit: false,
            auto_refresh,
            interval,
            banner: None,
            fresh_count: 0,
            last_update: None,
            list_area: Rect::default(),
            poller: None,
            next_tick: None,
            in_flight: false,
        }
    }

    /// Build the fetch pipeline and fire the initial refresh.
    pub fn start(&mut self) {
        self.rebuild_pipeline();
    }

    /// (Re)arm the trigger pipeline. Called at startup and whenever the
    /// interval or the auto-refresh toggle changes; a dead pipeline is
    /// revived here. Every rebuild starts with one immediate fetch.
    fn rebuild_pipeline(&mut self) {
        if self.poller.is_none() {
            match FeedClient::new(&self.config.endpoint) {
                Ok(client) => self.poller = Some(Poller::spawn(client)),
                Err(err) => {
                    warn!("cannot build feed client: {err:#}");
                    self.banner = Some(Banner::StreamDead);
                    return;
                }
            }
        }
        self.next_tick = Some(Instant::now() + self.interval);
        self.request_refresh();
    }

    /// Manual refresh, also serving as the retry control. Does nothing while
    /// the pipeline is dead; a config change brings it back.
    pub fn request_refresh(&mut self) {
        if let Some(poller) = self.poller.as_mut() {
            self.in_flight = true;
            poller.trigger();
        }
    }

    /// Fire the periodic trigger when due. The timer keeps running while
    /// auto-refresh is off; its ticks are just swallowed.
    pub fn tick(&mut self, now: Instant) {
        let Some(next) = self.next_tick else { return };
        if now < next {
            return;
        }
        self.next_tick = Some(now + self.interval);
        if self.auto_refresh {
            self.request_refresh();
        }
    }

    /// Apply any completed fetch. Superseded fetches never show up here;
    /// the poller already dropped them.
    pub fn drain_fetches(&mut self) {
        let Some(poller) = self.poller.as_mut() else {
            return;
        };
        match poller.poll() {
            PollEvent::Idle => {}
            PollEvent::Finished(outcome) => self.apply_fetch_result(outcome.result),
            PollEvent::Died => {
                warn!("fetch pipeline died");
                self.in_flight = false;
                self.banner = Some(Banner::StreamDead);
                self.poller = None;
                self.next_tick = None;
            }
        }
    }

    pub fn apply_fetch_result(&mut self, result: anyhow::Result<Vec<Message>>) {
        self.in_flight = false;
        self.last_update = Some(format::clock_now());
        match result {
            Ok(incoming) => {
                let outcome = feed::merge_new(&mut self.messages, incoming);
                self.fresh_count = outcome.fresh;
                self.banner = None;
                debug!("merge applied: {} fresh, {} total", outcome.fresh, self.messages.len());
                if self.list_state.selected().is_none() && !self.messages.is_empty() {
                    self.list_state.select(Some(0));
                }
                // The cap can push the opened message out of the list
                if self
                    .modal
                    .message_id
                    .as_deref()
                    .is_some_and(|id| !self.messages.iter().any(|m| m.id == id))
                {
                    self.close_modal();
                }
            }
            Err(_) => {
                self.banner = Some(Banner::FetchFailed);
                self.fresh_count = 0;
            }
        }
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.auto_refresh = !self.auto_refresh;
        self.rebuild_pipeline();
    }

    /// Switch to the next configured polling period.
    pub fn cycle_interval(&mut self) {
        let choices = &self.config.poll.interval_choices;
        if choices.is_empty() {
            return;
        }
        let secs = self.interval.as_secs();
        let next = choices
            .iter()
            .position(|&c| c == secs)
            .map(|i| choices[(i + 1) % choices.len()])
            .unwrap_or(choices[0]);
        self.interval = Duration::from_secs(next.max(1));
        self.rebuild_pipeline();
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.list_state.selected().and_then(|i| self.messages.get(i))
    }

    pub fn next(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let max = self.messages.len() - 1;
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(max),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.selected_message().map(|m| m.id.clone()) {
            self.open_message(&id);
        }
    }

    /// Open the detail dialog for a message id; an unknown id does nothing.
    pub fn open_message(&mut self, id: &str) {
        if !self.messages.iter().any(|m| m.id == id) {
            return;
        }
        self.modal.message_id = Some(id.to_string());
        self.modal.focus = ModalControl::CloseIcon;
        self.modal.scroll = 0;
        self.view = View::Reader;
    }

    /// No-op when the dialog is already closed; otherwise the message table
    /// regains input focus.
    pub fn close_modal(&mut self) {
        if self.modal.message_id.is_none() {
            return;
        }
        self.modal.message_id = None;
        self.modal.scroll = 0;
        self.view = View::List;
    }

    pub fn modal_message(&self) -> Option<&Message> {
        let id = self.modal.message_id.as_deref()?;
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn modal_focus_next(&mut self) {
        self.modal.focus = self.modal.focus.next();
    }

    pub fn modal_scroll_down(&mut self) {
        self.modal.scroll = self.modal.scroll.saturating_add(3);
    }

    pub fn modal_scroll_up(&mut self) {
        self.modal.scroll = self.modal.scroll.saturating_sub(3);
    }

    /// Handle a mouse click at (x, y).
    pub fn handle_click(&mut self, x: u16, y: u16) {
        if self.view == View::Reader {
            let areas = self.modal.areas;
            if hit(areas.close_icon, x, y)
                || hit(areas.close_button, x, y)
                || !hit(areas.dialog, x, y)
            {
                self.close_modal();
            }
            return;
        }

        if hit(self.list_area, x, y) {
            // +1 for the top border
            let visual_row = y.saturating_sub(self.list_area.y + 1) as usize;
            let row = visual_row + self.list_state.offset();
            if row < self.messages.len() {
                self.list_state.select(Some(row));
                self.open_selected();
            }
        }
    }

    /// Tear the widget down: close the dialog, stop the fetch worker and
    /// drop the message list.
    pub fn shutdown(&mut self) {
        self.close_modal();
        self.poller = None;
        self.next_tick = None;
        self.messages.clear();
        debug!("widget torn down");
    }
}

fn hit(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn msg(id: &str) -> Message {
        Message {
            id: id.to_string(),
            from: format!("{id}@example.org"),
            subject: format!("subject {id}"),
            body: "body".to_string(),
            received: 1_700_000_000,
            is_new: false,
        }
    }

    fn app() -> App {
        App::new(Arc::new(Config::default()))
    }

    #[test]
    fn second_fetch_merges_only_the_unseen_message() {
        let mut app = app();
        app.apply_fetch_result(Ok(vec![msg("1")]));
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.fresh_count, 1);

        app.apply_fetch_result(Ok(vec![msg("1"), msg("2")]));
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.fresh_count, 1);
        assert_eq!(app.messages[0].id, "2");
        assert!(app.last_update.is_some());
    }

    #[test]
    fn failed_fetch_keeps_the_list_and_clears_loading() {
        let mut app = app();
        app.apply_fetch_result(Ok(vec![msg("1")]));
        app.apply_fetch_result(Err(anyhow!("server said no")));
        assert_eq!(app.banner, Some(Banner::FetchFailed));
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.fresh_count, 0);
        assert!(!app.is_loading());
    }

    #[test]
    fn next_success_clears_the_error_banner() {
        let mut app = app();
        app.apply_fetch_result(Err(anyhow!("down")));
        assert_eq!(app.banner, Some(Banner::FetchFailed));
        app.apply_fetch_result(Ok(vec![msg("1")]));
        assert_eq!(app.banner, None);
    }

    #[test]
    fn opening_an_unknown_id_is_a_no_op() {
        let mut app = app();
        app.apply_fetch_result(Ok(vec![msg("1")]));
        app.open_message("missing");
        assert_eq!(app.view, View::List);
        assert!(!app.modal.is_open());
    }

    #[test]
    fn modal_opens_closes_and_ignores_redundant_close() {
        let mut app = app();
        app.apply_fetch_result(Ok(vec![msg("1")]));
        app.open_message("1");
        assert_eq!(app.view, View::Reader);
        assert_eq!(app.modal.focus, ModalControl::CloseIcon);
        assert_eq!(app.modal_message().unwrap().id, "1");

        app.close_modal();
        assert_eq!(app.view, View::List);
        app.close_modal();
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn tab_cycles_the_two_close_controls() {
        let mut app = app();
        app.apply_fetch_result(Ok(vec![msg("1")]));
        app.open_message("1");
        app.modal_focus_next();
        assert_eq!(app.modal.focus, ModalControl::CloseButton);
        app.modal_focus_next();
        assert_eq!(app.modal.focus, ModalControl::CloseIcon);
    }

    #[test]
    fn interval_cycles_through_the_configured_choices() {
        let mut app = app();
        app.cycle_interval();
        assert_eq!(app.interval, Duration::from_secs(30));
        app.cycle_interval();
        assert_eq!(app.interval, Duration::from_secs(60));
        app.cycle_interval();
        assert_eq!(app.interval, Duration::from_secs(5));
    }

    #[test]
    fn first_merge_selects_the_top_row() {
        let mut app = app();
        app.apply_fetch_result(Ok(vec![msg("1"), msg("2")]));
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn polls_a_live_endpoint_end_to_end() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(tiny_http::Response::from_string(
                    r#"{"status":"ok","timestamp":1700000000,
                        "messages":[{"id":"1","from":"john.doe@x.com","subject":"hi","body":"text","received":1700000000}]}"#,
                ));
            }
        });

        let config = Config {
            endpoint: format!("http://{addr}/messages/unread"),
            ..Config::default()
        };
        let mut app = App::new(Arc::new(config));
        app.start();
        assert!(app.is_loading());

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.messages.is_empty() {
            app.drain_fetches();
            assert!(Instant::now() < deadline, "fetch never completed");
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(app.messages[0].id, "1");
        assert!(!app.is_loading());
        app.shutdown();
        assert!(app.messages.is_empty());
    }
}
