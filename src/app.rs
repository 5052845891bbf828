use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use crossterm::event::KeyCode;
use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::api::error::Result as ApiResult;
use crate::api::types::{
    ExtensionSelection, FileItem, FileType, Repository, RepositoryPreview, TreeRow, flatten_tree,
};
use crate::api::{ApiError, RepositoryService};
use crate::config::Config;
use crate::session::practice::PracticeSession;
use crate::session::result::SessionResult;
use crate::session::scroll::{AutoScroller, Bounds, Viewport};
use crate::session::typing::{Key, KeyOutcome, TypingStatus};
use crate::store::progress::ProgressStore;
use crate::ui::components::dashboard::SyncState;
use crate::ui::components::typing_area::cursor_bounds;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    RepositoryList,
    FileTree,
    Typing,
    Result,
    Import,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// A "mark as typed" request running on a worker thread.
struct CompletionJob {
    repository_id: u64,
    file_item_id: u64,
    rx: Receiver<ApiResult<Vec<FileItem>>>,
}

/// Host key to typing-core key. Control combinations are UI actions and are
/// dispatched before this is consulted.
pub fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        _ => Key::Other,
    }
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: Theme,
    pub repository: Option<Repository>,
    pub tree_rows: Vec<TreeRow>,
    pub tree_selected: usize,
    pub repository_input: LineInput,
    pub import_url: LineInput,
    pub import_preview: Option<RepositoryPreview>,
    pub import_selected: usize,
    pub session: Option<PracticeSession>,
    pub last_result: Option<SessionResult>,
    pub sync_state: SyncState,
    pub status: Option<StatusMessage>,
    pub viewport: Viewport,
    pub should_quit: bool,
    service: Arc<dyn RepositoryService>,
    store: Option<ProgressStore>,
    auto_scroller: AutoScroller,
    completion: Option<CompletionJob>,
}

impl App {
    pub fn new(
        config: Config,
        theme: Theme,
        service: Arc<dyn RepositoryService>,
        store: Option<ProgressStore>,
    ) -> Self {
        let auto_scroller =
            AutoScroller::with_settings(config.auto_scroll_cool_time(), config.auto_scroll_margin);
        Self {
            screen: AppScreen::RepositoryList,
            config,
            theme,
            repository: None,
            tree_rows: Vec::new(),
            tree_selected: 0,
            repository_input: LineInput::new("").digits_only(),
            import_url: LineInput::new(""),
            import_preview: None,
            import_selected: 0,
            session: None,
            last_result: None,
            sync_state: SyncState::Pending,
            status: None,
            viewport: Viewport::default(),
            should_quit: false,
            service,
            store,
            auto_scroller,
            completion: None,
        }
    }

    fn report(&mut self, context: &str, err: &ApiError) {
        warn!(%err, "{context}");
        self.status = Some(StatusMessage::error(err.user_message()));
    }

    // --- repository and file tree ---

    pub fn open_repository(&mut self, id: u64) {
        match self.service.get_repository(id) {
            Ok(repository) => self.show_repository(repository),
            Err(err) => self.report("loading repository failed", &err),
        }
    }

    /// Parse the id typed on the repository screen and open it.
    pub fn submit_repository_input(&mut self) {
        match self.repository_input.value().trim().parse::<u64>() {
            Ok(id) => self.open_repository(id),
            Err(_) => self.status = Some(StatusMessage::error("Enter a numeric repository id.")),
        }
    }

    fn show_repository(&mut self, repository: Repository) {
        info!(id = repository.id, name = %repository.name, "repository opened");
        self.repository = Some(repository);
        self.tree_selected = 0;
        self.refresh_tree();
        self.screen = AppScreen::FileTree;
    }

    fn refresh_tree(&mut self) {
        self.tree_rows = self
            .repository
            .as_ref()
            .map(|repo| flatten_tree(&repo.file_items))
            .unwrap_or_default();
        if self.tree_selected >= self.tree_rows.len() {
            self.tree_selected = self.tree_rows.len().saturating_sub(1);
        }
    }

    pub fn tree_next(&mut self) {
        if self.tree_selected + 1 < self.tree_rows.len() {
            self.tree_selected += 1;
        }
    }

    pub fn tree_prev(&mut self) {
        self.tree_selected = self.tree_selected.saturating_sub(1);
    }

    pub fn open_selected_file(&mut self) {
        let Some(row) = self.tree_rows.get(self.tree_selected) else {
            return;
        };
        if row.kind == FileType::Dir {
            return;
        }
        let file_item_id = row.id;
        self.open_file(file_item_id);
    }

    /// Fetch a file and build a fresh session for it, restoring saved
    /// progress when it still fits the file.
    pub fn open_file(&mut self, file_item_id: u64) {
        let Some(repository_id) = self.repository.as_ref().map(|r| r.id) else {
            return;
        };
        let file = match self.service.get_file_item(repository_id, file_item_id) {
            Ok(file) => file,
            Err(err) => {
                self.report("loading file failed", &err);
                return;
            }
        };

        let path = file.full_path.as_deref().unwrap_or(&file.name);
        let mut session =
            PracticeSession::new(repository_id, file.id, path, file.content.as_deref());
        self.status = None;

        if let Some(store) = &self.store {
            if let Some(saved) = store.load(repository_id, file.id) {
                if session.restore(saved) {
                    self.status = Some(StatusMessage::info(
                        "Restored saved progress. [Esc] to resume.",
                    ));
                } else if let Err(err) = store.remove(repository_id, file.id) {
                    warn!(%err, "removing stale progress failed");
                }
            }
        }

        if session.status() == TypingStatus::Unsupported {
            self.status = Some(StatusMessage::error("This file cannot be typed."));
        }

        self.session = Some(session);
        self.viewport = Viewport::default();
        self.auto_scroller = AutoScroller::with_settings(
            self.config.auto_scroll_cool_time(),
            self.config.auto_scroll_margin,
        );
        self.screen = AppScreen::Typing;
    }

    // --- typing ---

    pub fn start_typing(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.start(now);
            self.viewport = Viewport::default();
        }
    }

    /// Esc: pause while typing, resume while paused.
    pub fn toggle_pause(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.status() {
            TypingStatus::Typing => {
                session.pause();
                self.save_progress();
            }
            TypingStatus::Paused => {
                session.resume(now);
                self.status = None;
            }
            _ => {}
        }
    }

    pub fn reset_typing(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.reset();
        let (repository_id, file_item_id) = (session.repository_id, session.file_item_id);
        self.viewport = Viewport::default();
        if let Some(store) = &self.store {
            if let Err(err) = store.remove(repository_id, file_item_id) {
                warn!(%err, "removing saved progress failed");
            }
        }
    }

    pub fn type_key(&mut self, key: Key) -> KeyOutcome {
        let Some(session) = self.session.as_mut() else {
            return KeyOutcome::Ignored;
        };
        let outcome = session.handle_key(key);
        if matches!(outcome, KeyOutcome::Completed { .. }) {
            self.on_completed();
        }
        outcome
    }

    fn on_completed(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (repository_id, file_item_id) = (session.repository_id, session.file_item_id);
        self.last_result = Some(session.result());

        if let Some(store) = &self.store {
            if let Err(err) = store.remove(repository_id, file_item_id) {
                warn!(%err, "removing saved progress failed");
            }
        }

        let (tx, rx) = mpsc::channel();
        let service = Arc::clone(&self.service);
        thread::spawn(move || {
            let _ = tx.send(service.mark_file_typed(repository_id, file_item_id));
        });
        self.completion = Some(CompletionJob {
            repository_id,
            file_item_id,
            rx,
        });
        self.sync_state = SyncState::Pending;
        self.screen = AppScreen::Result;
    }

    /// Pick up the result of a finished "mark as typed" request. The local
    /// `completed` status stands whatever the outcome.
    pub fn poll_completion(&mut self) {
        let Some(job) = self.completion.as_ref() else {
            return;
        };
        let outcome = match job.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(ApiError::Unexpected("completion worker exited".to_string()))
            }
        };
        let (repository_id, file_item_id) = (job.repository_id, job.file_item_id);
        self.completion = None;

        match outcome {
            Ok(file_items) => {
                info!(repository_id, file_item_id, "file marked as typed");
                if let Some(repo) = self.repository.as_mut().filter(|r| r.id == repository_id) {
                    repo.file_items = file_items;
                }
                self.refresh_tree();
                self.sync_state = SyncState::Saved;
            }
            Err(err) => {
                self.report("marking file as typed failed", &err);
                self.sync_state = SyncState::Failed(err.user_message());
            }
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.completion.is_some()
    }

    /// Write progress for the current session, if it has any worth keeping.
    pub fn save_progress(&mut self) {
        if !self.config.save_progress {
            return;
        }
        let (Some(store), Some(session)) = (&self.store, &self.session) else {
            return;
        };
        if !session.has_progress() {
            return;
        }
        match store.save(&session.to_saved_progress()) {
            Ok(()) => self.status = Some(StatusMessage::info("Progress saved.")),
            Err(err) => {
                warn!(%err, "saving progress failed");
                self.status = Some(StatusMessage::error(format!("Could not save progress: {err}")));
            }
        }
    }

    /// Leave the typing screen for the tree. An unfinished session is
    /// paused and saved first.
    pub fn leave_typing(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pause();
        }
        self.save_progress();
        self.session = None;
        self.screen = AppScreen::FileTree;
    }

    /// Type the same file again from the result screen.
    pub fn retype(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
            self.viewport = Viewport::default();
            self.screen = AppScreen::Typing;
        }
    }

    pub fn back_to_tree(&mut self) {
        self.session = None;
        self.screen = if self.repository.is_some() {
            AppScreen::FileTree
        } else {
            AppScreen::RepositoryList
        };
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.on_tick(now);
        }
        self.poll_completion();
    }

    /// Keep the cursor cell inside `inner`, the typing area's text region.
    pub fn sync_viewport(&mut self, inner: Rect, now: Instant) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.status() == TypingStatus::Unsupported {
            return;
        }
        let buffer = session.machine().buffer();
        let cursor = cursor_bounds(buffer, inner, self.viewport);
        if let Some(request) =
            self.auto_scroller
                .scroll_into_view(Some(cursor), Some(Bounds::from(inner)), now)
        {
            self.viewport.apply(request);
        }
        self.viewport
            .follow_row(buffer.cursor_line as u16, inner.height);
    }

    // --- import ---

    pub fn begin_import(&mut self, url: Option<&str>) {
        self.import_url = LineInput::new(url.unwrap_or(""));
        self.import_preview = None;
        self.import_selected = 0;
        self.status = None;
        self.screen = AppScreen::Import;
    }

    pub fn preview_import(&mut self) {
        let url = self.import_url.value().trim().to_string();
        if url.is_empty() {
            self.status = Some(StatusMessage::error("Enter a repository URL."));
            return;
        }
        match self.service.preview_repository(&url) {
            Ok(preview) => {
                self.import_preview = Some(preview);
                self.import_selected = 0;
                self.status = None;
            }
            Err(err) => self.report("repository preview failed", &err),
        }
    }

    pub fn import_next(&mut self) {
        let len = self.import_preview.as_ref().map_or(0, |p| p.extensions.len());
        if self.import_selected + 1 < len {
            self.import_selected += 1;
        }
    }

    pub fn import_prev(&mut self) {
        self.import_selected = self.import_selected.saturating_sub(1);
    }

    pub fn toggle_extension(&mut self) {
        if let Some(ext) = self
            .import_preview
            .as_mut()
            .and_then(|p| p.extensions.get_mut(self.import_selected))
        {
            ext.is_active = !ext.is_active;
        }
    }

    pub fn create_import(&mut self) {
        let url = self.import_url.value().trim().to_string();
        let selections: Option<Vec<ExtensionSelection>> = self
            .import_preview
            .as_ref()
            .map(|p| p.extensions.iter().map(ExtensionSelection::from).collect());
        match self.service.create_repository(&url, selections.as_deref()) {
            Ok(repository) => {
                self.import_preview = None;
                self.status = Some(StatusMessage::info(format!(
                    "Imported {}.",
                    repository.name
                )));
                self.show_repository(repository);
            }
            Err(err) => self.report("repository creation failed", &err),
        }
    }

    pub fn quit(&mut self) {
        if self.screen == AppScreen::Typing {
            if let Some(session) = self.session.as_mut() {
                session.pause();
            }
            self.save_progress();
        }
        self.should_quit = true;
    }
}
