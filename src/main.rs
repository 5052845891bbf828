use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{error, info, warn};

use repotype::api::ApiClient;
use repotype::app::{App, AppScreen, map_key};
use repotype::config::Config;
use repotype::event::{AppEvent, EventHandler};
use repotype::logging;
use repotype::session::typing::TypingStatus;
use repotype::store::progress::ProgressStore;
use repotype::ui::components::dashboard::Dashboard;
use repotype::ui::components::file_tree::FileTree;
use repotype::ui::components::import_form::ImportForm;
use repotype::ui::components::progress_bar::ProgressBar;
use repotype::ui::components::stats_sidebar::{StatsSidebar, compact_stats_line};
use repotype::ui::components::typing_area::TypingArea;
use repotype::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use repotype::ui::line_input::InputResult;
use repotype::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "repotype",
    version,
    about = "Practice typing the source files of a GitHub repository"
)]
struct Cli {
    #[arg(short, long, value_name = "ID", help = "Open this repository directly")]
    repository: Option<u64>,

    #[arg(long, value_name = "URL", help = "Base URL of the repository service")]
    api_url: Option<String>,

    #[arg(
        long,
        env = "REPOTYPE_TOKEN",
        hide_env_values = true,
        help = "Bearer token for the repository service"
    )]
    token: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_name = "GIT_URL", help = "Preview and import a repository")]
    import: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = logging::default_log_path() {
        if let Err(err) = logging::init(&path) {
            eprintln!("warning: logging disabled: {err:#}");
        }
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        warn!(%err, "config unreadable, using defaults");
        Config::default()
    });
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(token) = cli.token {
        config.api_token = Some(token);
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.normalize();

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });

    let client = ApiClient::new(
        &config.api_url,
        config.api_token.clone(),
        config.request_timeout(),
    )
    .context("building HTTP client")?;

    let store = if config.save_progress {
        ProgressStore::new()
            .inspect_err(|err| warn!(%err, "progress will not be saved"))
            .ok()
    } else {
        None
    };

    info!(api_url = %config.api_url, "starting");
    let tick_rate = config.tick_rate();
    let mut app = App::new(config, theme, Arc::new(client), store);

    if let Some(url) = cli.import.as_deref() {
        app.begin_import(Some(url));
        app.preview_import();
    } else if let Some(id) = cli.repository {
        app.open_repository(id);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Release events let us ignore key-up on terminals that report them.
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(%err, "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            if app.screen == AppScreen::Typing {
                let layout = AppLayout::new(frame.area());
                app.sync_viewport(TypingArea::inner(layout.main), Instant::now());
            }
            render(frame, app);
        })?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only Press: Repeat and Release would inflate input
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::RepositoryList => handle_repository_list_key(app, key),
        AppScreen::FileTree => handle_tree_key(app, key),
        AppScreen::Typing => handle_typing_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
        AppScreen::Import => handle_import_key(app, key),
    }
}

fn handle_repository_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('i') => app.begin_import(None),
        _ => match app.repository_input.handle(key) {
            InputResult::Submit => app.submit_repository_input(),
            InputResult::Cancel => app.quit(),
            InputResult::Continue => {}
        },
    }
}

fn handle_tree_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.screen = AppScreen::RepositoryList,
        KeyCode::Up | KeyCode::Char('k') => app.tree_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.tree_next(),
        KeyCode::Enter => app.open_selected_file(),
        KeyCode::Char('i') => app.begin_import(None),
        KeyCode::Char('r') => {
            if let Some(id) = app.repository.as_ref().map(|r| r.id) {
                app.open_repository(id);
            }
        }
        _ => {}
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.start_typing(now),
            KeyCode::Char('r') => app.reset_typing(),
            KeyCode::Char('q') => app.leave_typing(),
            _ => {}
        }
        return;
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return;
    }
    match key.code {
        KeyCode::Esc => app.toggle_pause(now),
        code => {
            app.type_key(map_key(code));
        }
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('c') => app.back_to_tree(),
        KeyCode::Char('r') => app.retype(),
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn handle_import_key(app: &mut App, key: KeyEvent) {
    if app.import_preview.is_none() {
        match app.import_url.handle(key) {
            InputResult::Submit => app.preview_import(),
            InputResult::Cancel => app.back_to_tree(),
            InputResult::Continue => {}
        }
        return;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.import_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.import_next(),
        KeyCode::Char(' ') => app.toggle_extension(),
        KeyCode::Enter => app.create_import(),
        KeyCode::Esc => app.import_preview = None,
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::RepositoryList => render_repository_list(frame, app),
        AppScreen::FileTree => render_file_tree(frame, app),
        AppScreen::Typing => render_typing(frame, app),
        AppScreen::Result => render_result(frame, app),
        AppScreen::Import => render_import(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " repotype ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

/// Status message (if any) on top, then as many hint lines as fit.
fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        let text = status.text.lines().collect::<Vec<_>>().join("  ");
        lines.push(Line::from(Span::styled(
            format!(" {text}"),
            Style::default().fg(if status.is_error {
                colors.error()
            } else {
                colors.success()
            }),
        )));
    }
    for hint in pack_hint_lines(hints, area.width as usize) {
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.text_pending()),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn screen_rows(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(area)
}

fn render_repository_list(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let rows = screen_rows(frame.area());
    render_header(frame, app, rows[0], "");

    let popup = centered_rect(40, 30, rows[1]);
    let block = Block::bordered()
        .title(" Open Repository ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let (before, cursor_ch, after) = app.repository_input.render_parts();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Repository id:",
            Style::default().fg(colors.fg()),
        )),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(before.to_string(), Style::default().fg(colors.accent())),
            Span::styled(
                cursor_ch.unwrap_or(' ').to_string(),
                Style::default()
                    .fg(colors.text_cursor_fg())
                    .bg(colors.text_cursor_bg()),
            ),
            Span::styled(after.to_string(), Style::default().fg(colors.accent())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Service: {}", app.config.api_url),
            Style::default().fg(colors.text_pending()),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);

    render_footer(frame, app, rows[2], &["[Enter] Open", "[i] Import", "[q] Quit"]);
}

fn render_file_tree(frame: &mut ratatui::Frame, app: &App) {
    let rows = screen_rows(frame.area());

    let (title, summary) = match &app.repository {
        Some(repo) => {
            let (files, typed) = repo.typed_summary();
            (repo.name.as_str(), format!("| {typed}/{files} files typed"))
        }
        None => ("", String::new()),
    };
    render_header(frame, app, rows[0], &summary);

    let tree = FileTree::new(title, &app.tree_rows, app.tree_selected, &app.theme);
    frame.render_widget(tree, rows[1]);

    render_footer(
        frame,
        app,
        rows[2],
        &[
            "[Enter] Type file",
            "[j/k] Move",
            "[r] Reload",
            "[i] Import",
            "[Esc] Repositories",
            "[q] Quit",
        ],
    );
}

fn render_typing(frame: &mut ratatui::Frame, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let area = frame.area();
    let layout = AppLayout::new(area);
    let stats = session.stats();
    let buffer = session.machine().buffer();
    let status = session.status();

    let header_info = if layout.tier.show_sidebar() {
        format!("| {}", session.file_path)
    } else {
        compact_stats_line(&stats, buffer.progress())
    };
    render_header(frame, app, layout.header, &header_info);

    let typing = TypingArea::new(buffer, status, &session.file_path, app.viewport, &app.theme);
    frame.render_widget(typing, layout.main);

    if let Some(progress_area) = layout.progress {
        frame.render_widget(
            ProgressBar::new("Progress", buffer.progress(), &app.theme),
            progress_area,
        );
    }

    if let Some(sidebar_area) = layout.sidebar {
        let sidebar = StatsSidebar::new(&stats, buffer.progress(), status, &app.theme);
        frame.render_widget(sidebar, sidebar_area);
    }

    let hints: &[&str] = match status {
        TypingStatus::Ready => &["[Ctrl-S] Start", "[Ctrl-Q] Files", "[Ctrl-C] Quit"],
        TypingStatus::Typing => &["[Esc] Pause", "[Ctrl-R] Reset", "[Ctrl-Q] Files"],
        TypingStatus::Paused => &["[Esc] Resume", "[Ctrl-R] Reset", "[Ctrl-Q] Files"],
        TypingStatus::Completed => &["[Ctrl-R] Reset", "[Ctrl-Q] Files"],
        TypingStatus::Unsupported => &["[Ctrl-Q] Files", "[Ctrl-C] Quit"],
    };
    render_footer(frame, app, layout.footer, hints);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    if let Some(result) = &app.last_result {
        let centered = centered_rect(60, 60, frame.area());
        frame.render_widget(Dashboard::new(result, &app.sync_state, &app.theme), centered);
    }
}

fn render_import(frame: &mut ratatui::Frame, app: &App) {
    let rows = screen_rows(frame.area());
    render_header(frame, app, rows[0], "| import");

    let popup = centered_rect(60, 70, rows[1]);
    let form = ImportForm::new(
        &app.import_url,
        app.import_preview.as_ref(),
        app.import_selected,
        &app.theme,
    );
    frame.render_widget(form, popup);

    render_footer(frame, app, rows[2], &[]);
}
