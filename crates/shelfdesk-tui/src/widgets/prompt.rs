//! Single-line prompt and y/n confirmation overlays.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use tui_input::Input;

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;

use super::{centered, dialog_frame, edit_input};

/// Asks for one line of text on behalf of a book (the borrow flow).
pub struct PromptDialog {
    book_id: u64,
    message: &'static str,
    input: Input,
}

impl PromptDialog {
    pub fn new(book_id: u64, message: &'static str) -> Self {
        Self {
            book_id,
            message,
            input: Input::default(),
        }
    }

    pub fn book_id(&self) -> u64 {
        self.book_id
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }
}

impl Component for PromptDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc => Ok(Some(Action::CloseDialog)),
            KeyCode::Enter => Ok(Some(Action::SubmitBorrow)),
            _ => {
                edit_input(&mut self.input, key);
                Ok(None)
            }
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let dialog = centered(area, 50, 8);
        let inner = dialog_frame(
            frame,
            dialog,
            &format!("Borrow Book #{}", self.book_id),
            theme::border_focused(),
        );

        frame.render_widget(
            Paragraph::new(Span::styled(self.message, Style::default().fg(theme::DIM_WHITE))),
            Rect::new(inner.x, inner.y, inner.width, 1),
        );

        let box_area = Rect::new(inner.x, inner.y + 1, inner.width, 3);
        let text_width = usize::from(box_area.width.saturating_sub(2).max(1));
        let scroll = self.input.visual_scroll(text_width);
        frame.render_widget(
            Paragraph::new(self.input.value())
                .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX)))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(theme::border_focused()),
                ),
            box_area,
        );
        let cursor = self.input.visual_cursor().max(scroll) - scroll;
        frame.set_cursor_position(Position::new(
            box_area.x + 1 + u16::try_from(cursor).unwrap_or(0),
            box_area.y + 1,
        ));

        let hints = Line::from(vec![
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("borrow  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]);
        frame.render_widget(
            Paragraph::new(hints),
            Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1),
        );
    }
}

/// Render a centered y/n confirmation dialog.
pub fn render_confirm(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog = centered(area, 50, 6);
    let inner = dialog_frame(
        frame,
        dialog,
        "Confirm",
        Style::default().fg(theme::ELECTRIC_YELLOW),
    );

    let text = vec![
        Line::from(Span::styled(
            confirm.to_string(),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}
