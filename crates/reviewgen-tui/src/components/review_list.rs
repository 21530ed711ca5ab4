use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use reviewgen_core::GeneratedItem;
use reviewgen_session::SessionState;

/// Cursor over the session's items plus their rendering.
///
/// Items are split into the latest batch and everything older, mirroring
/// `SessionState::latest_batch` and `SessionState::previous_items`.
#[derive(Debug, Default)]
pub struct ReviewList {
    selected: Option<usize>,
}

impl ReviewList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the first item, or nothing when the list is empty.
    pub fn reset(&mut self, len: usize) {
        self.selected = if len == 0 { None } else { Some(0) };
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item<'a>(&self, state: &'a SessionState) -> Option<&'a GeneratedItem> {
        state.items().get(self.selected?)
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        });
    }

    pub fn select_prev(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    pub fn handle_key(&mut self, key: KeyEvent, len: usize) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select_next(len),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(len),
            KeyCode::Home => self.reset(len),
            KeyCode::End => {
                if len > 0 {
                    self.selected = Some(len - 1);
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &SessionState, now: Instant) {
        if state.items().is_empty() {
            let block = Block::default()
                .title(" Generated Reviews ")
                .borders(Borders::ALL);
            let hint = Paragraph::new(
                "No reviews generated yet. Start by generating your first review!",
            )
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
            frame.render_widget(hint, area);
            return;
        }

        let latest = state.latest_batch();
        let previous = state.previous_items();

        let constraints = if previous.is_empty() {
            vec![Constraint::Min(0)]
        } else {
            vec![Constraint::Percentage(60), Constraint::Percentage(40)]
        };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let latest_title = format!(" Latest Generated Batch ({} reviews) ", latest.len());
        self.render_section(frame, layout[0], &latest_title, latest, 0, true, state, now);

        if !previous.is_empty() {
            self.render_section(
                frame,
                layout[1],
                " Previous Reviews ",
                previous,
                latest.len(),
                false,
                state,
                now,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_section(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        items: &[GeneratedItem],
        offset: usize,
        numbered: bool,
        state: &SessionState,
        now: Instant,
    ) {
        let width = area.width.saturating_sub(4).max(10) as usize;
        let list_items: Vec<ListItem> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut header = Vec::new();
                if numbered {
                    header.push(Span::styled(
                        format!("Review {} ", i + 1),
                        Style::default().fg(Color::Blue).bold(),
                    ));
                }
                header.push(Span::styled(
                    format!("[{}] ", item.category),
                    Style::default().fg(Color::Cyan),
                ));
                header.push(Span::styled(
                    item.rating.stars(),
                    Style::default().fg(Color::Yellow),
                ));
                if state.is_copied(&item.id, now) {
                    header.push(Span::styled(
                        "  Copied!",
                        Style::default().fg(Color::Green).bold(),
                    ));
                }
                header.push(Span::styled(
                    format!("  {}", item.created_at.format("%Y-%m-%d %H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ));

                let mut lines = vec![Line::from(header)];
                for line in wrap_text(&item.text, width) {
                    lines.push(Line::from(line));
                }
                lines.push(Line::from(""));
                ListItem::new(lines)
            })
            .collect();

        let mut list_state = ListState::default();
        if let Some(sel) = self.selected {
            if sel >= offset && sel < offset + items.len() {
                list_state.select(Some(sel - offset));
            }
        }

        let list = List::new(list_items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

/// Greedy word wrap; list items do not wrap on their own.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        out.push(line);
    }
    out
}
