//! Library dashboard: books, members and borrowed books in three stacked
//! panels, with row actions on the focused panel.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use shelfdesk_core::{Book, EntityKind, Loan, Member};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Books,
    Members,
    Loans,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Self::Books, Self::Members, Self::Loans];

    fn index(self) -> usize {
        match self {
            Self::Books => 0,
            Self::Members => 1,
            Self::Loans => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Books => Self::Members,
            Self::Members => Self::Loans,
            Self::Loans => Self::Books,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Books => Self::Loans,
            Self::Members => Self::Books,
            Self::Loans => Self::Members,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Books => "Books",
            Self::Members => "Members",
            Self::Loans => "Borrowed Books",
        }
    }

    fn empty_text(self) -> &'static str {
        match self {
            Self::Books => "No books found.",
            Self::Members => "No members found.",
            Self::Loans => "No borrowed books.",
        }
    }

    /// Entity kind editable from this panel. Loans are read-only.
    fn kind(self) -> Option<EntityKind> {
        match self {
            Self::Books => Some(EntityKind::Book),
            Self::Members => Some(EntityKind::Member),
            Self::Loans => None,
        }
    }
}

pub struct DashboardScreen {
    books: Arc<Vec<Arc<Book>>>,
    members: Arc<Vec<Arc<Member>>>,
    loans: Arc<Vec<Arc<Loan>>>,
    loading: bool,
    focus: Panel,
    tables: [TableState; 3],
    throbber_state: ThrobberState,
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardScreen {
    /// Starts in the loading state until the first refresh settles.
    pub fn new() -> Self {
        Self {
            books: Arc::default(),
            members: Arc::default(),
            loans: Arc::default(),
            loading: true,
            focus: Panel::default(),
            tables: [TableState::default(); 3],
            throbber_state: ThrobberState::default(),
        }
    }

    fn len(&self, panel: Panel) -> usize {
        match panel {
            Panel::Books => self.books.len(),
            Panel::Members => self.members.len(),
            Panel::Loans => self.loans.len(),
        }
    }

    /// Keep the panel's selection on a real row after its data changes.
    fn clamp(&mut self, panel: Panel) {
        let len = self.len(panel);
        let state = &mut self.tables[panel.index()];
        if len == 0 {
            state.select(None);
        } else {
            state.select(Some(state.selected().unwrap_or(0).min(len - 1)));
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.len(self.focus);
        if len == 0 {
            return;
        }
        let state = &mut self.tables[self.focus.index()];
        let current = state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        state.select(Some(next));
    }

    /// ID of the selected row in the focused panel.
    pub fn selected_id(&self) -> Option<u64> {
        let idx = self.tables[self.focus.index()].selected()?;
        match self.focus {
            Panel::Books => self.books.get(idx).map(|b| b.id),
            Panel::Members => self.members.get(idx).map(|m| m.id),
            Panel::Loans => self.loans.get(idx).map(|l| l.id),
        }
    }

    /// Row action for `e`/`d` on the focused books or members panel.
    fn entity_action(&self, make: fn(EntityKind, u64) -> Action) -> Option<Action> {
        let kind = self.focus.kind()?;
        self.selected_id().map(|id| make(kind, id))
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_header(frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" Library Dashboard", theme::heading()),
            Span::raw("    "),
            Span::styled("a ", theme::key_hint_key()),
            Span::styled("Add Book  ", theme::key_hint()),
            Span::styled("m ", theme::key_hint_key()),
            Span::styled("Add Member", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        let throbber = Throbber::default()
            .label("  Loading dashboard...")
            .style(Style::default().fg(theme::NEON_CYAN))
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
    }

    fn panel_block(&self, panel: Panel) -> Block<'static> {
        let border = if panel == self.focus {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        Block::default()
            .title(format!(" {} ({}) ", panel.title(), self.len(panel)))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect, panel: Panel) {
        let block = self.panel_block(panel);
        if self.len(panel) == 0 {
            frame.render_widget(
                Paragraph::new(Span::styled(panel.empty_text(), theme::empty_state()))
                    .block(block),
                area,
            );
            return;
        }

        let (headers, widths, rows): (&[&str], Vec<Constraint>, Vec<Row>) = match panel {
            Panel::Books => (
                &["ID", "Title", "Author", "Copies"],
                vec![
                    Constraint::Length(6),
                    Constraint::Fill(3),
                    Constraint::Fill(2),
                    Constraint::Length(7),
                ],
                self.books.iter().map(|b| book_row(b)).collect(),
            ),
            Panel::Members => (
                &["ID", "Name", "Email", "Mobile"],
                vec![
                    Constraint::Length(6),
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(14),
                ],
                self.members.iter().map(|m| member_row(m)).collect(),
            ),
            Panel::Loans => (
                &["Loan ID", "Book", "Member", "Borrowed", "Returned"],
                vec![
                    Constraint::Length(8),
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(17),
                    Constraint::Length(17),
                ],
                self.loans.iter().map(|l| loan_row(l)).collect(),
            ),
        };

        let header = Row::new(headers.iter().map(|h| Cell::from(*h))).style(theme::table_header());
        let highlight = if panel == self.focus {
            theme::table_selected()
        } else {
            theme::table_row()
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(highlight);

        let mut state = self.tables[panel.index()];
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_hints(frame: &mut Frame, area: Rect) {
        let hints = Line::from(vec![
            Span::styled(" Tab ", theme::key_hint_key()),
            Span::styled("panel  ", theme::key_hint()),
            Span::styled("j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("edit  ", theme::key_hint()),
            Span::styled("b ", theme::key_hint_key()),
            Span::styled("borrow  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), area);
    }
}

fn book_row(b: &Book) -> Row<'static> {
    Row::new(vec![
        Cell::from(b.id.to_string()),
        Cell::from(b.title.clone()),
        Cell::from(b.author.clone()),
        Cell::from(b.copies.map(|c| c.to_string()).unwrap_or_default()),
    ])
    .style(theme::table_row())
}

fn member_row(m: &Member) -> Row<'static> {
    Row::new(vec![
        Cell::from(m.id.to_string()),
        Cell::from(m.name.clone()),
        Cell::from(m.email.clone()),
        Cell::from(m.mobile.clone()),
    ])
    .style(theme::table_row())
}

fn loan_row(l: &Loan) -> Row<'static> {
    let returned = match l.returned_at {
        Some(at) => Cell::from(at.format(DATE_FORMAT).to_string())
            .style(Style::default().fg(theme::SUCCESS_GREEN)),
        None => Cell::from("Not Returned").style(Style::default().fg(theme::CORAL)),
    };
    Row::new(vec![
        Cell::from(l.id.to_string()),
        Cell::from(format!("{} (ID: {})", l.book.title, l.book.id)),
        Cell::from(format!("{} (ID: {})", l.member.name, l.member.id)),
        Cell::from(l.borrowed_at.format(DATE_FORMAT).to_string()),
        returned,
    ])
    .style(theme::table_row())
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(false);
                None
            }
            KeyCode::Char('a') => Some(Action::OpenCreate(EntityKind::Book)),
            KeyCode::Char('m') => Some(Action::OpenCreate(EntityKind::Member)),
            KeyCode::Char('e') => self.entity_action(Action::OpenEdit),
            KeyCode::Char('d') => self.entity_action(Action::RequestDelete),
            KeyCode::Char('b') if self.focus == Panel::Books => {
                self.selected_id().map(Action::RequestBorrow)
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::BooksUpdated(books) => {
                self.books = Arc::clone(books);
                self.clamp(Panel::Books);
            }
            Action::MembersUpdated(members) => {
                self.members = Arc::clone(members);
                self.clamp(Panel::Members);
            }
            Action::LoansUpdated(loans) => {
                self.loans = Arc::clone(loans);
                self.clamp(Panel::Loans);
            }
            Action::LoadingChanged(loading) => self.loading = *loading,
            Action::Tick if self.loading => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

        Self::render_header(frame, layout[0]);

        if self.loading {
            self.render_loading(frame, layout[1]);
        } else {
            let panels = Layout::vertical([Constraint::Fill(1); 3]).split(layout[1]);
            for (panel, panel_area) in Panel::ALL.into_iter().zip(panels.iter()) {
                self.render_panel(frame, *panel_area, panel);
            }
        }

        Self::render_hints(frame, layout[2]);
    }
}
