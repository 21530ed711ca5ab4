use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use reviewgen_core::{Category, GeneratedItem, Preset};
use reviewgen_service::{BlockingService, GenerativeService, ServiceError, ServiceRequest};
use reviewgen_session::{
    copy_batch, copy_item, finish, Clipboard, Effect, Event, Outcome, Rejection, SessionConfig,
    SessionState,
};
use tracing::{debug, info};

use crate::components::review_list::ReviewList;

type Pending = Receiver<Result<String, ServiceError>>;

/// What the app is currently doing
#[derive(Debug, Clone)]
pub enum Mode {
    /// Browsing the generated reviews
    Normal,
    /// Editing the sample text
    EditSample { input: String },
    /// Category picker
    CategoryPick { selected: usize },
    /// Preset picker
    PresetPick { list_state: ListState },
}

pub struct App<S, C> {
    service: Arc<BlockingService<S>>,
    state: SessionState,
    presets: Vec<Preset>,
    list: ReviewList,
    mode: Mode,
    clipboard: C,
    status_message: Option<String>,
    /// Receives the answer of the in-flight service call.
    pending: Option<Pending>,
}

impl<S, C> App<S, C>
where
    S: GenerativeService + 'static,
    C: Clipboard,
{
    pub fn new(service: S, config: SessionConfig, presets: Vec<Preset>, clipboard: C) -> Result<Self> {
        let service = BlockingService::new(service).context("failed to start async runtime")?;
        Ok(Self {
            service: Arc::new(service),
            state: SessionState::new(config),
            presets,
            list: ReviewList::new(),
            mode: Mode::Normal,
            clipboard,
            status_message: None,
            pending: None,
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn service(&self) -> &BlockingService<S> {
        &self.service
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.state.is_loading()
    }

    pub fn selected_item(&self) -> Option<&GeneratedItem> {
        self.list.selected_item(&self.state)
    }

    /// Set the category before the first frame, e.g. from the command line.
    pub fn set_category(&mut self, category: Category) {
        self.state.apply(Event::SetCategory(category));
    }

    /// Whether the current mode captures free text (so 'q' shouldn't quit).
    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::EditSample { .. })
    }

    /// Whether the event loop should wake up without a key press.
    pub fn needs_polling(&self) -> bool {
        self.pending.is_some() || self.state.has_copy_acks()
    }

    /// Expire copy acknowledgments and collect a finished generation.
    pub fn tick(&mut self, now: Instant) {
        self.state.apply(Event::Tick { now });
        self.poll_generation();
    }

    /// Check whether the worker thread has answered. Never blocks.
    pub fn poll_generation(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(ServiceError::Transport(
                "generation worker exited without a result".into(),
            )),
        };
        self.pending = None;

        let outcome = finish(&mut self.state, result, Utc::now());
        self.list.reset(self.state.items().len());
        self.status_message = match outcome {
            Outcome::Generated(n) => Some(format!("Generated {n} reviews")),
            Outcome::Empty | Outcome::Failed => None,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match &self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::EditSample { input } => self.handle_edit_sample(key, input.clone()),
            Mode::CategoryPick { selected } => self.handle_category_pick(key, *selected),
            Mode::PresetPick { list_state } => self.handle_preset_pick(key, list_state.clone()),
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        let len = self.state.items().len();
        match key.code {
            KeyCode::Char('i') | KeyCode::Char('e') => {
                self.mode = Mode::EditSample {
                    input: self.state.sample_text().to_string(),
                };
            }
            KeyCode::Char('c') => {
                self.mode = Mode::CategoryPick {
                    selected: self.state.category().index(),
                };
            }
            KeyCode::Char(']') => {
                let next = self.state.category().next();
                self.state.apply(Event::SetCategory(next));
            }
            KeyCode::Char('[') => {
                let prev = self.state.category().prev();
                self.state.apply(Event::SetCategory(prev));
            }
            KeyCode::Char('p') => {
                if self.presets.is_empty() {
                    self.status_message = Some("No presets loaded (use --presets FILE)".into());
                } else {
                    let mut list_state = ListState::default();
                    let current = self
                        .state
                        .selected_preset()
                        .and_then(|name| self.presets.iter().position(|p| p.name == name));
                    list_state.select(Some(current.unwrap_or(0)));
                    self.mode = Mode::PresetPick { list_state };
                }
            }
            KeyCode::Char('g') | KeyCode::Enter => {
                let effect = self.state.apply(Event::Generate);
                self.handle_effect(effect);
            }
            KeyCode::Char('y') => self.copy_selected(),
            KeyCode::Char('Y') => self.copy_all(),
            _ => self.list.handle_key(key, len),
        }
    }

    fn handle_edit_sample(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.apply(Event::SetSampleText(input));
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                input.push('\n');
                self.mode = Mode::EditSample { input };
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::EditSample { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::EditSample { input };
            }
            _ => {}
        }
    }

    fn handle_category_pick(&mut self, key: KeyEvent, selected: usize) {
        let last = Category::ALL.len() - 1;
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                self.mode = Mode::CategoryPick {
                    selected: (selected + 1).min(last),
                };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.mode = Mode::CategoryPick {
                    selected: selected.saturating_sub(1),
                };
            }
            KeyCode::Enter => self.pick_category(selected),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if idx <= last {
                    self.pick_category(idx);
                }
            }
            _ => {}
        }
    }

    fn pick_category(&mut self, idx: usize) {
        if let Some(category) = Category::ALL.get(idx) {
            self.state.apply(Event::SetCategory(*category));
        }
        self.mode = Mode::Normal;
    }

    fn handle_preset_pick(&mut self, key: KeyEvent, mut list_state: ListState) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                let i = list_state.selected().unwrap_or(0);
                if i + 1 < self.presets.len() {
                    list_state.select(Some(i + 1));
                }
                self.mode = Mode::PresetPick { list_state };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let i = list_state.selected().unwrap_or(0);
                list_state.select(Some(i.saturating_sub(1)));
                self.mode = Mode::PresetPick { list_state };
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let Some(preset) = list_state
                    .selected()
                    .and_then(|i| self.presets.get(i))
                    .cloned()
                else {
                    return;
                };
                let name = preset.name.clone();
                let effect = self.state.apply(Event::SelectPreset(preset));
                if matches!(effect, Effect::None) {
                    self.status_message = Some(format!("Loaded preset: {name}"));
                }
                self.handle_effect(effect);
            }
            _ => {}
        }
    }

    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::CallService(request) => self.spawn_generation(request),
            Effect::Busy => {
                self.status_message = Some("Generation already in progress".into());
            }
            Effect::Rejected(Rejection::EmptySampleText) => {
                self.status_message = Some("Sample text is empty (press i to edit)".into());
            }
        }
    }

    fn spawn_generation(&mut self, request: ServiceRequest) {
        let (tx, rx) = mpsc::channel();
        let service = Arc::clone(&self.service);
        info!(
            service = service.name(),
            category = %self.state.category(),
            "starting generation"
        );
        thread::spawn(move || {
            let result = service.generate(&request);
            // The app may have quit in the meantime.
            let _ = tx.send(result);
        });
        self.pending = Some(rx);
    }

    fn copy_selected(&mut self) {
        let Some(id) = self.selected_item().map(|item| item.id.clone()) else {
            self.status_message = Some("Nothing to copy".into());
            return;
        };
        if copy_item(&mut self.state, &mut self.clipboard, &id, Instant::now()) {
            debug!(%id, "copied review");
            self.status_message = Some("Copied!".into());
        } else {
            self.status_message = Some("Copy failed".into());
        }
    }

    fn copy_all(&mut self) {
        if self.state.latest_batch().is_empty() {
            self.status_message = Some("Nothing to copy".into());
            return;
        }
        if copy_batch(&mut self.state, &mut self.clipboard, Instant::now()) {
            self.status_message = Some("Copied latest batch!".into());
        } else {
            self.status_message = Some("Copy failed".into());
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(layout[1]);
        self.render_sample(frame, body[0]);
        self.list
            .render(frame, body[1], &self.state, Instant::now());

        self.render_status_bar(frame, layout[2]);

        // Overlays
        match &self.mode {
            Mode::Normal => {}
            Mode::EditSample { input } => self.render_sample_editor(frame, input, area),
            Mode::CategoryPick { selected } => self.render_category_pick(frame, *selected, area),
            Mode::PresetPick { list_state } => self.render_preset_pick(frame, list_state, area),
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" reviewgen ", Style::default().fg(Color::Black).bg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(
                self.state.category().display_name(),
                Style::default().fg(Color::Cyan).bold(),
            ),
        ];
        if let Some(preset) = self.state.selected_preset() {
            spans.push(Span::styled(
                format!("  preset: {preset}"),
                Style::default().fg(Color::Magenta),
            ));
        }
        if self.is_generating() {
            spans.push(Span::styled(
                "  Generating...",
                Style::default().fg(Color::Yellow).bold(),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_sample(&self, frame: &mut Frame, area: Rect) {
        let text = self.state.sample_text();
        let body = if text.trim().is_empty() {
            Paragraph::new("Paste customer reviews here (press i)")
                .style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(text)
        };
        frame.render_widget(
            body.wrap(Wrap { trim: false })
                .block(Block::default().title(" Sample Text ").borders(Borders::ALL)),
            area,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(msg) = &self.status_message {
            Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Yellow),
            ))
        } else if let Some(diag) = self.state.diagnostic() {
            Line::from(Span::styled(
                format!(" {diag}"),
                Style::default().fg(Color::Red),
            ))
        } else {
            let hints = match self.mode {
                Mode::Normal => {
                    " i:edit  c:category  [/]:cycle  p:preset  g:generate  j/k:move  y:copy  Y:copy all  q:quit"
                }
                Mode::EditSample { .. } => " Ctrl+S:save  Esc:cancel",
                Mode::CategoryPick { .. } | Mode::PresetPick { .. } => {
                    " j/k:move  Enter:select  Esc:cancel"
                }
            };
            Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_sample_editor(&self, frame: &mut Frame, input: &str, area: Rect) {
        let popup = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup);
        let editor = Paragraph::new(format!("{input}_"))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Edit Sample Text (Ctrl+S save, Esc cancel) ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(editor, popup);
    }

    fn render_category_pick(&self, frame: &mut Frame, selected: usize, area: Rect) {
        let popup = centered_rect(40, 40, area);
        frame.render_widget(Clear, popup);

        let items: Vec<ListItem> = Category::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let marker = if *c == self.state.category() { "*" } else { " " };
                ListItem::new(format!("{marker} {}. {}", i + 1, c.display_name()))
            })
            .collect();
        let mut list_state = ListState::default();
        list_state.select(Some(selected));

        let list = List::new(items)
            .block(Block::default().title(" Category ").borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, popup, &mut list_state);
    }

    fn render_preset_pick(&self, frame: &mut Frame, list_state: &ListState, area: Rect) {
        let popup = centered_rect(50, 50, area);
        frame.render_widget(Clear, popup);

        let items: Vec<ListItem> = self
            .presets
            .iter()
            .map(|p| ListItem::new(p.name.as_str()))
            .collect();
        let mut list_state = list_state.clone();

        let list = List::new(items)
            .block(Block::default().title(" Presets ").borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, popup, &mut list_state);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
