//! Create and edit dialogs: one text input per field descriptor.
//!
//! The dialog owns the text buffers; the core form owns the coerced values
//! and the closed/editing/submitting state. Every keystroke re-coerces the
//! active field so number inputs are validated as they are typed.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use serde::Serialize;
use tui_input::Input;

use shelfdesk_core::{
    Command, CoreError, DialogState, EditForm, EntityForm, EntityKind, FieldDescriptor,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

use super::{centered, dialog_frame, edit_input};

const WIDTH: u16 = 60;

enum FormTarget {
    Create(EntityForm),
    Edit(EditForm),
}

pub struct FormDialog {
    target: FormTarget,
    inputs: Vec<Input>,
    active: usize,
    input_error: Option<String>,
}

impl FormDialog {
    /// An empty create dialog.
    pub fn create(kind: EntityKind) -> Self {
        let mut form = EntityForm::new(kind);
        form.open();
        let inputs = form
            .fields()
            .iter()
            .map(|f| Input::new(form.field_text(f.name)))
            .collect();
        Self {
            target: FormTarget::Create(form),
            inputs,
            active: 0,
            input_error: None,
        }
    }

    /// An edit dialog pre-filled from `entity`.
    pub fn edit<E: Serialize>(kind: EntityKind, id: u64, entity: &E) -> Self {
        let form = EditForm::open(kind, id, entity);
        let inputs = form
            .fields()
            .iter()
            .map(|f| Input::new(form.field_text(f.name)))
            .collect();
        Self {
            target: FormTarget::Edit(form),
            inputs,
            active: 0,
            input_error: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match &self.target {
            FormTarget::Create(f) => f.kind(),
            FormTarget::Edit(f) => f.kind(),
        }
    }

    pub fn title(&self) -> &'static str {
        match &self.target {
            FormTarget::Create(f) => f.title(),
            FormTarget::Edit(f) => f.title(),
        }
    }

    fn fields(&self) -> &'static [FieldDescriptor] {
        match &self.target {
            FormTarget::Create(f) => f.fields(),
            FormTarget::Edit(f) => f.fields(),
        }
    }

    fn state(&self) -> DialogState {
        match &self.target {
            FormTarget::Create(f) => f.state(),
            FormTarget::Edit(f) => f.state(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() != DialogState::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == DialogState::Submitting
    }

    /// Message shown inline: a coercion problem, else the last rejection.
    pub fn error(&self) -> Option<&str> {
        self.input_error.as_deref().or(match &self.target {
            FormTarget::Create(f) => f.error(),
            FormTarget::Edit(_) => None,
        })
    }

    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), CoreError> {
        match &mut self.target {
            FormTarget::Create(f) => f.set_field(name, raw),
            FormTarget::Edit(f) => f.set_field(name, raw),
        }
    }

    fn sync_active(&mut self) {
        let Some(field) = self.fields().get(self.active) else {
            return;
        };
        let Some(raw) = self.inputs.get(self.active).map(|i| i.value().to_owned()) else {
            return;
        };
        self.input_error = self.set_field(field.name, &raw).err().map(|e| e.to_string());
    }

    /// Coerce every input and hand back the command to run. `None` while a
    /// field is invalid or a submit is already in flight.
    pub fn begin_submit(&mut self) -> Option<Command> {
        let raws: Vec<String> = self.inputs.iter().map(|i| i.value().to_owned()).collect();
        for (idx, (field, raw)) in self.fields().iter().zip(&raws).enumerate() {
            if let Err(e) = self.set_field(field.name, raw) {
                self.input_error = Some(e.to_string());
                self.active = idx;
                return None;
            }
        }
        self.input_error = None;

        match &mut self.target {
            FormTarget::Create(f) => f.begin_submit(),
            FormTarget::Edit(f) => f.begin_submit(),
        }
    }

    /// Settle a submit. Create dialogs stay open on failure; edit dialogs
    /// always close. Returns whether the dialog is still open.
    pub fn finish(&mut self, result: Result<(), String>) -> bool {
        match &mut self.target {
            FormTarget::Create(f) => f.finish(result),
            FormTarget::Edit(f) => f.finish(),
        }
        self.is_open()
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.inputs.len();
        if len == 0 {
            return;
        }
        self.active = if forward {
            (self.active + 1) % len
        } else {
            (self.active + len - 1) % len
        };
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

impl Component for FormDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.is_submitting() {
            return Ok(None);
        }
        match key.code {
            KeyCode::Esc => Ok(Some(Action::CloseDialog)),
            KeyCode::Enter => Ok(Some(Action::SubmitForm)),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                Ok(None)
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                Ok(None)
            }
            _ => {
                let consumed = self
                    .inputs
                    .get_mut(self.active)
                    .is_some_and(|input| edit_input(input, key));
                if consumed {
                    self.sync_active();
                }
                Ok(None)
            }
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let fields = self.fields();
        // label + 3-row input per field, error line, hint line, borders
        let height = to_u16(fields.len() * 4 + 4);
        let dialog = centered(area, WIDTH, height);
        let inner = dialog_frame(frame, dialog, self.title(), theme::border_focused());

        let mut y = inner.y;
        for (idx, (field, input)) in fields.iter().zip(&self.inputs).enumerate() {
            if y + 4 > inner.bottom() {
                break;
            }
            let active = idx == self.active;
            frame.render_widget(
                Paragraph::new(Span::styled(field.label, theme::title_style())),
                Rect::new(inner.x, y, inner.width, 1),
            );

            let box_area = Rect::new(inner.x, y + 1, inner.width, 3);
            let border = if active {
                theme::border_focused()
            } else {
                theme::border_default()
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border);
            let text_width = usize::from(box_area.width.saturating_sub(2).max(1));
            let scroll = input.visual_scroll(text_width);
            frame.render_widget(
                Paragraph::new(input.value())
                    .style(Style::default().fg(theme::DIM_WHITE))
                    .scroll((0, to_u16(scroll)))
                    .block(block),
                box_area,
            );
            if active && !self.is_submitting() {
                let cursor = input.visual_cursor().max(scroll) - scroll;
                frame.set_cursor_position(Position::new(
                    box_area.x + 1 + to_u16(cursor),
                    box_area.y + 1,
                ));
            }
            y += 4;
        }

        if let Some(error) = self.error() {
            frame.render_widget(
                Paragraph::new(Span::styled(error, theme::error_text())),
                Rect::new(inner.x, y.min(inner.bottom().saturating_sub(2)), inner.width, 1),
            );
        }

        let hints = if self.is_submitting() {
            Line::from(Span::styled("Saving...", theme::key_hint()))
        } else {
            Line::from(vec![
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("save  ", theme::key_hint()),
                Span::styled("Tab ", theme::key_hint_key()),
                Span::styled("next field  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])
        };
        frame.render_widget(
            Paragraph::new(hints),
            Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use shelfdesk_core::{Book, NewBook};

    use super::*;

    fn press(dialog: &mut FormDialog, code: KeyCode) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(dialog: &mut FormDialog, text: &str) {
        for c in text.chars() {
            press(dialog, KeyCode::Char(c));
        }
    }

    fn dune() -> Book {
        Book {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            copies: Some(3),
        }
    }

    #[test]
    fn create_dialog_builds_command_from_typed_fields() {
        let mut dialog = FormDialog::create(EntityKind::Book);
        type_text(&mut dialog, "Emma");
        press(&mut dialog, KeyCode::Tab);
        type_text(&mut dialog, "Jane Austen");

        assert!(matches!(
            press(&mut dialog, KeyCode::Enter),
            Some(Action::SubmitForm)
        ));
        match dialog.begin_submit() {
            Some(Command::CreateBook(book)) => assert_eq!(
                book,
                NewBook {
                    title: "Emma".into(),
                    author: "Jane Austen".into(),
                }
            ),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(dialog.is_submitting());
    }

    #[test]
    fn rejected_create_stays_open_with_message() {
        let mut dialog = FormDialog::create(EntityKind::Book);
        dialog.begin_submit().unwrap();
        assert!(dialog.finish(Err("title required".into())));
        assert_eq!(dialog.error(), Some("title required"));
        assert!(!dialog.is_submitting());

        dialog.begin_submit().unwrap();
        assert!(!dialog.finish(Ok(())));
    }

    #[test]
    fn edit_dialog_prefills_and_validates_numbers() {
        let mut dialog = FormDialog::edit(EntityKind::Book, 1, &dune());
        assert_eq!(dialog.inputs[2].value(), "3");

        press(&mut dialog, KeyCode::Up);
        type_text(&mut dialog, "x");
        assert!(dialog.error().unwrap().contains("not a number"));
        assert!(dialog.begin_submit().is_none());

        press(&mut dialog, KeyCode::Backspace);
        match dialog.begin_submit() {
            Some(Command::Update { id, data, .. }) => {
                assert_eq!(id, 1);
                assert_eq!(data["copies"], serde_json::json!(3));
                assert_eq!(data["title"], serde_json::json!("Dune"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_dialog_leaves_untouched_missing_fields_out() {
        let emma = Book {
            id: 2,
            title: "Emma".into(),
            author: "Jane Austen".into(),
            copies: None,
        };
        let mut dialog = FormDialog::edit(EntityKind::Book, 2, &emma);
        assert_eq!(dialog.inputs[2].value(), "");

        press(&mut dialog, KeyCode::Tab);
        press(&mut dialog, KeyCode::Home);
        for _ in 0.."Jane ".len() {
            press(&mut dialog, KeyCode::Delete);
        }
        press(&mut dialog, KeyCode::Tab);
        press(&mut dialog, KeyCode::End);

        match dialog.begin_submit() {
            Some(Command::Update { data, .. }) => {
                assert_eq!(
                    serde_json::to_value(&data).unwrap(),
                    serde_json::json!({ "title": "Emma", "author": "Austen" })
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_dialog_closes_even_after_failure() {
        let mut dialog = FormDialog::edit(EntityKind::Book, 1, &dune());
        dialog.begin_submit().unwrap();
        assert!(!dialog.finish(Err("boom".into())));
    }

    #[test]
    fn escape_closes_and_keys_are_ignored_while_saving() {
        let mut dialog = FormDialog::create(EntityKind::Member);
        assert!(matches!(
            press(&mut dialog, KeyCode::Esc),
            Some(Action::CloseDialog)
        ));

        dialog.begin_submit().unwrap();
        assert!(press(&mut dialog, KeyCode::Esc).is_none());
    }

    #[test]
    fn renders_title_labels_and_values() {
        let dialog = FormDialog::edit(EntityKind::Book, 1, &dune());
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| dialog.render(f, f.area())).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect();
        assert!(text.contains("Edit Book"));
        assert!(text.contains("Author"));
        assert!(text.contains("Frank Herbert"));
    }
}
