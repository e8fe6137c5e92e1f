use std::path::PathBuf;

use arboard::Clipboard;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::save_subject_to;
use crate::error::AnalysisError;
use crate::models::{FocusArea, RequestState, Subject};
use crate::network::AnalysisClient;
use crate::report::render_text_report;
use crate::session::{AnalysisSession, SharedSession, lock_session, spawn_submission};
use crate::utils;

pub struct App {
    pub session: SharedSession,
    pub client: AnalysisClient,
    pub focus: FocusArea,
    pub cursor: usize,
    pub result_scroll: u16,
    pub result_max_scroll: u16,
    pub status: Option<String>,
    /// Config file the last successful subject is written to, if remembering is on
    pub subject_store: Option<PathBuf>,
    pub should_quit: bool,
    pub pending: Option<PendingSubmission>,
}

/// A background submission and the subject it was sent with.
pub struct PendingSubmission {
    pub subject: Subject,
    pub handle: JoinHandle<()>,
}

impl App {
    pub fn new(session: AnalysisSession, client: AnalysisClient, subject_store: Option<PathBuf>) -> Self {
        let cursor = session.comments_text().len();
        Self {
            session: SharedSession::new(session.into()),
            client,
            focus: FocusArea::default(),
            cursor,
            result_scroll: 0,
            result_max_scroll: 0,
            status: None,
            subject_store,
            should_quit: false,
            pending: None,
        }
    }

    fn submit(&mut self, rt: &Handle) {
        let subject = {
            let session = lock_session(&self.session);
            if session.is_loading() {
                return;
            }
            session.subject()
        };
        match spawn_submission(&self.session, &self.client, rt) {
            Some(handle) => {
                self.pending = Some(PendingSubmission { subject, handle });
                self.result_scroll = 0;
                self.status = Some(format!("Analyzing comments for {}...", subject));
            }
            None => self.status = Some("A request is already running".into()),
        }
    }

    /// Picks up a finished submission: updates the status line and, on success,
    /// remembers the subject it was sent with.
    pub fn poll_pending(&mut self) {
        if !self.pending.as_ref().is_some_and(|p| p.handle.is_finished()) {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        let mut session = lock_session(&self.session);
        if session.is_loading() {
            session.settle(Err(AnalysisError::Interrupted("request task ended without a result".into())));
        }
        match session.state() {
            RequestState::Succeeded(_) => {
                self.status = Some(format!("Analysis complete for {}", pending.subject));
                if let Some(path) = &self.subject_store {
                    if let Err(e) = save_subject_to(path, pending.subject) {
                        tracing::warn!("Could not remember subject: {}", e);
                    }
                }
            }
            _ => self.status = None,
        }
    }

    fn copy(&mut self, what: CopyTarget) {
        let text = {
            let session = lock_session(&self.session);
            let Some(result) = session.state().result() else {
                self.status = Some("Nothing to copy yet".into());
                return;
            };
            match what {
                CopyTarget::Report => render_text_report(session.subject(), result, self.client.api_base()),
                CopyTarget::WordcloudUrl => result.resolved_wordcloud_url(self.client.api_base()),
            }
        };
        let copied = Clipboard::new().and_then(|mut cb| cb.set_text(text));
        self.status = Some(match copied {
            Ok(()) => match what {
                CopyTarget::Report => "Copied report to clipboard".into(),
                CopyTarget::WordcloudUrl => "Copied wordcloud URL to clipboard".into(),
            },
            Err(e) => format!("Clipboard unavailable: {}", e),
        });
    }
}

#[derive(Clone, Copy)]
enum CopyTarget {
    Report,
    WordcloudUrl,
}

pub fn handle_key(app: &mut App, key: KeyEvent, rt: &Handle) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // The failure notification is modal: nothing else reacts until it is dismissed
    {
        let mut session = lock_session(&app.session);
        if matches!(session.state(), RequestState::Failed(_)) {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                session.dismiss_error();
            }
            return;
        }
    }

    if (ctrl && key.code == KeyCode::Char('s')) || key.code == KeyCode::F(5) {
        app.submit(rt);
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.previous();
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusArea::Subject => match key.code {
            KeyCode::Left => {
                let mut session = lock_session(&app.session);
                let subject = session.subject().previous();
                session.set_subject(subject);
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                let mut session = lock_session(&app.session);
                let subject = session.subject().next();
                session.set_subject(subject);
            }
            KeyCode::Char('c') => app.copy(CopyTarget::Report),
            KeyCode::Char('u') => app.copy(CopyTarget::WordcloudUrl),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        },
        FocusArea::Comments => edit_comments(app, key),
        FocusArea::Results => match key.code {
            KeyCode::Up => app.result_scroll = app.result_scroll.saturating_sub(1),
            KeyCode::Down => app.result_scroll = (app.result_scroll + 1).min(app.result_max_scroll),
            KeyCode::PageUp => app.result_scroll = app.result_scroll.saturating_sub(10),
            KeyCode::PageDown => app.result_scroll = (app.result_scroll + 10).min(app.result_max_scroll),
            KeyCode::Home => app.result_scroll = 0,
            KeyCode::Char('c') => app.copy(CopyTarget::Report),
            KeyCode::Char('u') => app.copy(CopyTarget::WordcloudUrl),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        },
    }
}

fn edit_comments(app: &mut App, key: KeyEvent) {
    let mut session = lock_session(&app.session);
    let text = session.comments_text_mut();
    let cursor = &mut app.cursor;
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => utils::insert_char(text, cursor, c),
        KeyCode::Enter => utils::insert_char(text, cursor, '\n'),
        KeyCode::Backspace => utils::backspace(text, cursor),
        KeyCode::Delete => utils::delete(text, cursor),
        KeyCode::Left => *cursor = utils::move_left(text, *cursor),
        KeyCode::Right => *cursor = utils::move_right(text, *cursor),
        KeyCode::Up => *cursor = utils::move_up(text, *cursor),
        KeyCode::Down => *cursor = utils::move_down(text, *cursor),
        KeyCode::Home => *cursor = utils::line_start(text, *cursor),
        KeyCode::End => *cursor = utils::line_end(text, *cursor),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            text.clear();
            *cursor = 0;
        }
        _ => {}
    }
}

/// Bracketed paste lands in the comment editor regardless of focus.
pub fn handle_paste(app: &mut App, pasted: &str) {
    let mut session = lock_session(&app.session);
    if matches!(session.state(), RequestState::Failed(_)) {
        return;
    }
    utils::insert_str(session.comments_text_mut(), &mut app.cursor, pasted);
    drop(session);
    app.focus = FocusArea::Comments;
}
