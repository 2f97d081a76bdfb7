//! Application core: event loop, overlay management, action dispatch.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shelfdesk_core::actions::{self, BORROW_PROMPT};
use shelfdesk_core::{ActionOutcome, Answers, Command, Controller, EntityKind};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::dashboard::DashboardScreen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::form::FormDialog;
use crate::widgets::prompt::{PromptDialog, render_confirm};

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Modal dialog drawn over the dashboard. Captures all keys while open.
enum Overlay {
    Form(FormDialog),
    Borrow(PromptDialog),
}

impl Overlay {
    fn component(&self) -> &dyn Component {
        match self {
            Self::Form(dialog) => dialog,
            Self::Borrow(prompt) => prompt,
        }
    }

    fn component_mut(&mut self) -> &mut dyn Component {
        match self {
            Self::Form(dialog) => dialog,
            Self::Borrow(prompt) => prompt,
        }
    }
}

/// Top-level application state and event loop.
pub struct App {
    dashboard: DashboardScreen,
    overlay: Option<Overlay>,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            dashboard: DashboardScreen::new(),
            overlay: None,
            pending_confirm: None,
            notification: None,
            running: true,
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let controller = self.controller.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize | Event::Render => self.action_tx.send(Action::Render)?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Route a key: confirmation first, then the open overlay, then global
    /// keys, then the dashboard.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if let Some(overlay) = self.overlay.as_mut() {
            return overlay.component_mut().handle_key_event(key);
        }

        if key.code == KeyCode::Char('q') {
            return Ok(Some(Action::Quit));
        }

        self.dashboard.handle_key_event(key)
    }

    // ── Actions ──────────────────────────────────────────────────────

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render => {}
            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_TTL)
                {
                    self.notification = None;
                }
                self.dashboard.update(action)?;
            }

            Action::BooksUpdated(_)
            | Action::MembersUpdated(_)
            | Action::LoansUpdated(_)
            | Action::LoadingChanged(_) => {
                self.dashboard.update(action)?;
            }

            Action::OpenCreate(kind) => {
                self.overlay = Some(Overlay::Form(FormDialog::create(*kind)));
            }
            Action::OpenEdit(kind, id) => self.open_edit(*kind, *id),
            Action::SubmitForm => self.submit_form(),
            Action::CreateFinished(result) => {
                let Some(Overlay::Form(dialog)) = self.overlay.as_mut() else {
                    return Ok(());
                };
                let kind = dialog.kind();
                if !dialog.finish(result.clone()) {
                    self.overlay = None;
                    self.notify(Notification::success(format!(
                        "{} created",
                        kind.title_label()
                    )));
                }
            }
            Action::CloseDialog => self.overlay = None,

            Action::RequestBorrow(book_id) => {
                self.overlay = Some(Overlay::Borrow(PromptDialog::new(*book_id, BORROW_PROMPT)));
            }
            Action::SubmitBorrow => {
                if let Some(Overlay::Borrow(prompt)) = self.overlay.take() {
                    let book_id = prompt.book_id();
                    let answers = Answers::input(prompt.value());
                    self.spawn_outcome(move |controller| async move {
                        actions::borrow_book(&controller, book_id, &answers).await
                    });
                }
            }
            Action::RequestDelete(kind, id) => {
                self.pending_confirm = Some(ConfirmAction::Delete {
                    kind: *kind,
                    id: *id,
                });
            }
            Action::ConfirmYes => {
                if let Some(ConfirmAction::Delete { kind, id }) = self.pending_confirm.take() {
                    self.spawn_outcome(move |controller| async move {
                        actions::delete_entity(&controller, kind, id, &Answers::confirmed()).await
                    });
                }
            }
            Action::ConfirmNo => {
                debug!("confirmation dismissed");
                self.pending_confirm = None;
            }

            Action::Notify(notification) => self.notify(notification.clone()),
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    /// Open the edit dialog pre-filled from the current store snapshot.
    fn open_edit(&mut self, kind: EntityKind, id: u64) {
        let store = self.controller.store();
        let dialog = match kind {
            EntityKind::Book => store
                .book_by_id(id)
                .map(|book| FormDialog::edit(kind, id, &*book)),
            EntityKind::Member => store
                .member_by_id(id)
                .map(|member| FormDialog::edit(kind, id, &*member)),
        };
        match dialog {
            Some(dialog) => self.overlay = Some(Overlay::Form(dialog)),
            None => {
                warn!(%kind, id, "edit target vanished from store");
                self.notify(Notification::error(format!(
                    "{} not found",
                    kind.title_label()
                )));
            }
        }
    }

    /// Submit the open form. Edits close immediately and report through a
    /// toast; creates keep the dialog open until the request settles.
    fn submit_form(&mut self) {
        let Some(Overlay::Form(dialog)) = self.overlay.as_mut() else {
            return;
        };
        let Some(cmd) = dialog.begin_submit() else {
            return;
        };

        if let Command::Update { kind, id, data } = cmd {
            dialog.finish(Ok(()));
            self.overlay = None;
            self.spawn_outcome(move |controller| async move {
                actions::update_entity(&controller, kind, id, data).await
            });
            return;
        }

        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = controller.execute(cmd).await.map(|_| ()).map_err(|e| {
                warn!(error = %e, "create failed");
                e.to_string()
            });
            let _ = tx.send(Action::CreateFinished(result));
        });
    }

    /// Run a dashboard action in the background and toast its outcome.
    fn spawn_outcome<F, Fut>(&self, run: F)
    where
        F: FnOnce(Controller) -> Fut + Send + 'static,
        Fut: Future<Output = ActionOutcome> + Send,
    {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = run(controller).await;
            if let Some(notification) = Notification::from_outcome(&outcome) {
                let _ = tx.send(Action::Notify(notification));
            }
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        self.dashboard.render(frame, area);

        // Overlays on top (order matters: last = topmost)
        if let Some(overlay) = &self.overlay {
            overlay.component().render(frame, area);
        }

        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }

        if let Some(ref confirm) = self.pending_confirm {
            render_confirm(frame, area, confirm);
        }
    }

    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 1); // above the hint bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}
