use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use searchica_client::{ClientResult, SearchApi};
use searchica_core::{Completion, MainPanel, SearchResponse, SearchSession};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub mod detail;
pub mod onboarding;
pub mod plot;
pub mod result_list;
pub mod search_bar;

use detail::DetailView;
use onboarding::Onboarding;
use plot::PlotView;
use result_list::ResultList;
use search_bar::SearchBar;

/// How long to wait for terminal input before checking for completed
/// searches again.
const TICK: Duration = Duration::from_millis(50);

/// Lines moved per detail-view scroll step with the mouse wheel.
const WHEEL_LINES: i16 = 3;

type SearchOutcome = (u64, ClientResult<SearchResponse>);

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    Main,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Search => Self::Results,
            Self::Results => Self::Main,
            Self::Main => Self::Search,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Search => Self::Main,
            Self::Results => Self::Search,
            Self::Main => Self::Results,
        }
    }
}

/// Screen regions, as laid out for the last frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub search: Rect,
    pub main: Rect,
    pub list: Rect,
    pub status: Rect,
    pub help: Rect,
}

impl Areas {
    pub fn compute(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar
                Constraint::Min(0),    // Map or email, and the result list
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Help bar
            ])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(rows[1]);

        Self {
            search: rows[0],
            main: body[0],
            list: body[1],
            status: rows[2],
            help: rows[3],
        }
    }
}

/// Start-up options for the interactive client.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Query run on start-up and shown in the search bar. `None` starts
    /// with an empty screen.
    pub initial_query: Option<String>,
    pub show_onboarding: bool,
}

/// Application state for the interactive client.
///
/// Searches run as tasks on the tokio runtime; their outcomes come back
/// over a channel and are applied on the UI thread by
/// [`App::drain_completions`].
#[derive(Debug)]
pub struct App {
    session: SearchSession,
    search_bar: SearchBar,
    list: ResultList,
    plot_view: PlotView,
    detail: DetailView,
    onboarding: Onboarding,
    focus: Focus,
    areas: Areas,
    mouse_in_list: bool,
    should_quit: bool,
    initial_query: Option<String>,
    api: Arc<dyn SearchApi>,
    runtime: Handle,
    tx: UnboundedSender<SearchOutcome>,
    rx: UnboundedReceiver<SearchOutcome>,
}

impl App {
    pub fn new(api: Arc<dyn SearchApi>, runtime: Handle, options: AppOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: SearchSession::new(),
            search_bar: SearchBar::new(options.initial_query.clone()),
            list: ResultList::default(),
            plot_view: PlotView::default(),
            detail: DetailView::default(),
            onboarding: Onboarding::new(options.show_onboarding),
            focus: Focus::Search,
            areas: Areas::default(),
            mouse_in_list: false,
            should_quit: false,
            initial_query: options.initial_query,
            api,
            runtime,
            tx,
            rx,
        }
    }

    /// Issue the start-up query, if there is one.
    pub fn start(&mut self) {
        if let Some(query) = self.initial_query.clone() {
            log::info!("initial search: {:?}", query);
            self.search(query);
        }
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Submit `query` and return its generation. The request runs in the
    /// background; see [`App::drain_completions`].
    pub fn search(&mut self, query: impl Into<String>) -> u64 {
        let ticket = self.session.begin_search(query);
        self.spawn_search(ticket.generation, ticket.query);
        ticket.generation
    }

    fn retry(&mut self) {
        if let Some(ticket) = self.session.retry() {
            self.spawn_search(ticket.generation, ticket.query);
        }
    }

    fn spawn_search(&self, generation: u64, query: String) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = api.search(&query).await;
            if tx.send((generation, outcome)).is_err() {
                log::debug!("search #{} finished after the UI closed", generation);
            }
        });
    }

    /// Apply every search outcome that has arrived. Returns whether any
    /// result set was replaced.
    pub fn drain_completions(&mut self) -> bool {
        let mut applied = false;
        while let Ok((generation, outcome)) = self.rx.try_recv() {
            applied |= self.apply(generation, outcome);
        }
        applied
    }

    fn apply(&mut self, generation: u64, outcome: ClientResult<SearchResponse>) -> bool {
        match self.session.complete(generation, outcome) {
            Completion::Applied { .. } => {
                self.list.reset();
                self.plot_view.reset();
                self.detail.reset();
                true
            }
            Completion::Stale | Completion::Failed(_) => false,
        }
    }

    /// Record the layout of the frame about to be drawn.
    pub fn set_areas(&mut self, areas: Areas) {
        self.areas = areas;
        self.list.set_viewport(areas.list);
    }

    /// Scroll the list to the result of plot point `index`.
    fn point_click(&mut self, index: usize) {
        if let Some(row) = self.session.point_clicked(index) {
            self.list.scroll_to(row, self.session.results().len());
            self.plot_view.set_cursor(Some(index));
        }
    }

    fn hover_row(&mut self, row: Option<usize>) {
        if self.session.hover(row) {
            self.list.set_cursor(row);
        }
    }

    fn showing_detail(&self) -> bool {
        matches!(self.session.main_panel(), MainPanel::Detail(_))
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.onboarding.handle_key(key) {
            return;
        }
        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Results => {
                if !self.handle_results_key(key) {
                    self.handle_common_key(key);
                }
            }
            Focus::Main => {
                let handled = if self.showing_detail() {
                    self.handle_detail_key(key)
                } else {
                    self.handle_plot_key(key)
                };
                if !handled {
                    self.handle_common_key(key);
                }
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let query = self.search_bar.submit();
                self.search(query);
                self.focus = Focus::Results;
            }
            KeyCode::Esc => self.focus = Focus::Results,
            _ => {
                self.search_bar.handle_key(key);
            }
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> bool {
        let len = self.session.results().len();
        let page = self.list.viewport_rows() as isize;
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => {
                let row = self.list.move_cursor(-1, len);
                self.session.hover(row);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let row = self.list.move_cursor(1, len);
                self.session.hover(row);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(row) = self.list.cursor() {
                    self.session.toggle_selection(row);
                    self.detail.reset();
                }
            }
            KeyCode::Char('g') | KeyCode::Home => self.list.scroll_to_top(),
            KeyCode::PageUp => self.list.scroll_by(-page, len),
            KeyCode::PageDown => self.list.scroll_by(page, len),
            KeyCode::Esc => {
                self.session.clear_selection();
                self.session.hover(None);
                self.list.set_cursor(None);
            }
            _ => return false,
        }
        true
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => self.scroll_detail(-1),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_detail(1),
            KeyCode::PageUp => self.scroll_detail(-10),
            KeyCode::PageDown => self.scroll_detail(10),
            KeyCode::Esc | KeyCode::Enter => {
                self.session.clear_selection();
                self.detail.reset();
            }
            _ => return false,
        }
        true
    }

    fn scroll_detail(&mut self, delta: i16) {
        let max = match self.session.main_panel() {
            MainPanel::Detail(doc) => detail::max_scroll(doc, self.areas.main),
            MainPanel::Plot => 0,
        };
        self.detail.scroll_by(delta, max);
    }

    fn handle_plot_key(&mut self, key: KeyEvent) -> bool {
        let len = self.session.results().len();
        let trace = self.session.plot().and_then(|plot| plot.primary_trace());
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Left if shift => self.plot_view.pan(trace, -1.0, 0.0),
            KeyCode::Right if shift => self.plot_view.pan(trace, 1.0, 0.0),
            KeyCode::Up if shift => self.plot_view.pan(trace, 0.0, 1.0),
            KeyCode::Down if shift => self.plot_view.pan(trace, 0.0, -1.0),
            KeyCode::Char('H') => self.plot_view.pan(trace, -1.0, 0.0),
            KeyCode::Char('L') => self.plot_view.pan(trace, 1.0, 0.0),
            KeyCode::Char('K') => self.plot_view.pan(trace, 0.0, 1.0),
            KeyCode::Char('J') => self.plot_view.pan(trace, 0.0, -1.0),
            KeyCode::Char('h') | KeyCode::Left => {
                self.plot_view.step(-1, len);
                self.plot_view.follow_cursor(trace);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.plot_view.step(1, len);
                self.plot_view.follow_cursor(trace);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.plot_view.zoom_in(trace),
            KeyCode::Char('-') => self.plot_view.zoom_out(),
            KeyCode::Char('0') => self.plot_view.reset_zoom(),
            KeyCode::Enter => {
                if let Some(point) = self.plot_view.cursor() {
                    self.point_click(point);
                }
            }
            KeyCode::Esc => self.plot_view.set_cursor(None),
            _ => return false,
        }
        true
    }

    fn handle_common_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.retry(),
            KeyCode::Char('?') => self.onboarding.show(),
            KeyCode::Char('/') => self.focus = Focus::Search,
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.onboarding.is_visible() {
            return;
        }
        let pos = Position::new(mouse.column, mouse.row);
        let len = self.session.results().len();
        let in_list = self.areas.list.contains(pos);

        match mouse.kind {
            MouseEventKind::Moved => {
                if in_list {
                    let row = self.list.row_at(self.areas.list, pos, len);
                    self.hover_row(row);
                } else if self.mouse_in_list {
                    self.hover_row(None);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if in_list {
                    self.focus = Focus::Results;
                    if let Some(row) = self.list.row_at(self.areas.list, pos, len) {
                        self.session.toggle_selection(row);
                        self.detail.reset();
                    }
                } else if self.areas.main.contains(pos) {
                    self.focus = Focus::Main;
                    if !self.showing_detail() {
                        let shown = self.session.display_plot();
                        let bounds = self.plot_view.bounds(shown.primary_trace());
                        let hit = plot::hit_test(self.areas.main, &shown, bounds, pos);
                        if let Some(point) = hit {
                            self.point_click(point);
                        }
                    }
                } else if self.areas.search.contains(pos) {
                    let (_, button) = search_bar::split(self.areas.search);
                    if button.contains(pos) {
                        let query = self.search_bar.submit();
                        self.search(query);
                    } else {
                        self.focus = Focus::Search;
                    }
                }
            }
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let down = mouse.kind == MouseEventKind::ScrollDown;
                if in_list {
                    self.list.scroll_by(if down { 1 } else { -1 }, len);
                } else if self.areas.main.contains(pos) && self.showing_detail() {
                    self.scroll_detail(if down { WHEEL_LINES } else { -WHEEL_LINES });
                } else if self.areas.main.contains(pos) {
                    let trace = self.session.plot().and_then(|plot| plot.primary_trace());
                    if down {
                        self.plot_view.zoom_out();
                    } else {
                        self.plot_view.zoom_in(trace);
                    }
                }
            }
            _ => {}
        }
        self.mouse_in_list = in_list;
    }
}

/// Draw the whole screen.
pub fn render(frame: &mut Frame, app: &App) {
    let full = frame.area();
    let areas = Areas::compute(full);
    let modal = app.onboarding.is_visible();
    let focus = |pane: Focus| !modal && app.focus() == pane;

    search_bar::render(
        frame,
        areas.search,
        &app.search_bar,
        focus(Focus::Search),
        app.session().is_searching(),
    );
    match app.session().main_panel() {
        MainPanel::Plot => plot::render(
            frame,
            areas.main,
            &app.session().display_plot(),
            &app.plot_view,
            app.session().hovered(),
            focus(Focus::Main),
        ),
        MainPanel::Detail(doc) => {
            detail::render(frame, areas.main, doc, &app.detail, focus(Focus::Main));
        }
    }
    result_list::render(frame, areas.list, app.session(), &app.list, focus(Focus::Results));
    render_status(frame, areas.status, app);
    render_help(frame, areas.help, app);

    if modal {
        onboarding::render(frame, full);
    }
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let line = if let Some(query) = session.pending_query() {
        Line::from(Span::styled(
            format!(" Searching for {:?}...", query),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = session.last_error() {
        Line::from(vec![
            Span::styled(format!(" {}", error), Style::default().fg(Color::Red)),
            Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
        ])
    } else if let Some(query) = session.last_query() {
        Line::from(Span::styled(
            format!(" {} results for {:?}", session.results().len(), query),
            Style::default().fg(Color::Gray),
        ))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let text = match app.focus() {
        Focus::Search => "  Enter Search  Tab Next pane  Esc Results  Ctrl-C Quit",
        Focus::Results => {
            "  \u{2191}/k \u{2193}/j Hover  Enter Open/close  g Top  r Retry  / Search  ? Help  q Quit"
        }
        Focus::Main if app.showing_detail() => "  \u{2191}/k \u{2193}/j Scroll  Esc Back to map  Tab Next pane  q Quit",
        Focus::Main => {
            "  \u{2190}/h \u{2192}/l Point  Enter Go to result  +/- Zoom  Shift+arrows Pan  0 Reset  ? Help  q Quit"
        }
    };
    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, area);
}

/// Run the interactive client.
///
/// Sets up the terminal, runs the main event loop, and restores the terminal
/// on exit (including on error). Must be called from within a multi-threaded
/// tokio runtime.
pub fn run_tui(api: Arc<dyn SearchApi>, options: AppOptions) -> Result<()> {
    let mut app = App::new(api, Handle::current(), options);
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the event loop, capturing any error so we can restore the terminal
    let result = tokio::task::block_in_place(|| run_event_loop(&mut terminal, app));

    // Restore terminal regardless of success or failure
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    loop {
        app.drain_completions();

        let size = terminal.size()?;
        app.set_areas(Areas::compute(Rect::from((Position::ORIGIN, size))));
        terminal.draw(|frame| render(frame, &app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit() {
            log::info!("quitting");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use searchica_client::ClientError;
    use searchica_core::{
        ApiStatus, DocumentId, DocumentResult, Marker, MarkerSize, PlotPayload, Trace,
        EXAMPLE_QUERY,
    };

    /// Answers every query with two results, twelve for queries starting
    /// with "many", and an HTTP 500 for "fail".
    #[derive(Debug)]
    struct StubApi;

    fn stub_response(query: &str) -> SearchResponse {
        let n = if query.starts_with("many") { 12 } else { 2 };
        let results = (0..n)
            .map(|i| DocumentResult {
                id: DocumentId::new(i as u64 + 1),
                subject: format!("{query} #{}", i + 1),
                sender: "Sherron Watkins".to_string(),
                recipient: "kenneth.lay@enron.com".to_string(),
                cc: None,
                date: "Wed, 15 Aug 2001 09:00:00 -0500".to_string(),
                body: "body".to_string(),
                score: 1.0 - i as f64 * 0.05,
            })
            .collect();
        SearchResponse {
            plot_data: PlotPayload {
                data: vec![Trace {
                    x: (0..n).map(|i| i as f64).collect(),
                    y: (0..n).map(|i| ((i * 3) % 5) as f64).collect(),
                    marker: Marker {
                        color: vec!["rgb(255, 0, 0)".to_string(); n],
                        size: MarkerSize::Uniform(10.0),
                        opacity: vec![1.0; n],
                    },
                    hovertext: (0..n).map(|i| format!("Match rank: {}", i + 1)).collect(),
                    ..Trace::default()
                }],
                ..PlotPayload::default()
            },
            results,
        }
    }

    #[async_trait]
    impl SearchApi for StubApi {
        async fn search(&self, query: &str) -> ClientResult<SearchResponse> {
            if query == "fail" {
                return Err(ClientError::Status {
                    status: 500,
                    url: "http://stub/api/search".to_string(),
                    message: "index not loaded".to_string(),
                });
            }
            Ok(stub_response(query))
        }

        async fn status(&self) -> ClientResult<ApiStatus> {
            Ok(ApiStatus {
                status: "running".to_string(),
                version: "1.0".to_string(),
                api: "stub".to_string(),
                environment: "test".to_string(),
            })
        }
    }

    fn app(initial_query: Option<&str>) -> App {
        let mut app = App::new(
            Arc::new(StubApi),
            Handle::current(),
            AppOptions {
                initial_query: initial_query.map(str::to_string),
                show_onboarding: false,
            },
        );
        app.set_areas(Areas::compute(Rect::new(0, 0, 120, 40)));
        app
    }

    /// Wait until the latest search has been applied or has failed.
    async fn settle(app: &mut App) {
        for _ in 0..200 {
            app.drain_completions();
            if !app.session.is_searching() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("search did not complete");
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, pos: Position) -> MouseEvent {
        MouseEvent {
            kind,
            column: pos.x,
            row: pos.y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..40)
            .map(|y| (0..120).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_example_query_flow() {
        let mut app = app(Some(EXAMPLE_QUERY));
        app.start();
        assert!(app.session().is_searching());
        settle(&mut app).await;

        let results = app.session().results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].subject, format!("{EXAMPLE_QUERY} #1"));
        assert_eq!(results[1].subject, format!("{EXAMPLE_QUERY} #2"));
        assert_eq!(app.session().display_plot().point_count(), 2);

        let text = screen(&app);
        let first = text.find(&format!("{EXAMPLE_QUERY} #1")).unwrap();
        let second = text.find(&format!("{EXAMPLE_QUERY} #2")).unwrap();
        assert!(first < second);
        assert!(text.contains("Semantic map (2 points)"));

        // Hovering row 0 enlarges point 0 only
        app.focus = Focus::Results;
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.session().hovered(), Some(0));
        let plot = app.session().display_plot();
        let marker = &plot.data[0].marker;
        assert_eq!(marker.size_at(0), 20.0);
        assert_eq!(marker.size_at(1), 10.0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_initial_search() {
        let mut app = app(None);
        app.start();
        assert!(!app.session().is_searching());
        assert!(app.session().results().is_empty());
        assert!(screen(&app).contains("No results yet"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_new_search_replaces_results() {
        let mut app = app(Some("budget"));
        app.start();
        settle(&mut app).await;
        app.focus = Focus::Results;
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.showing_detail());

        app.search("many memos");
        settle(&mut app).await;

        assert_eq!(app.session().results().len(), 12);
        assert_eq!(app.session().results()[0].subject, "many memos #1");
        assert_eq!(app.session().display_plot().point_count(), 12);
        assert!(!app.showing_detail());
        assert_eq!(app.session().hovered(), None);
        assert_eq!(app.list.cursor(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_search_keeps_results() {
        let mut app = app(Some("budget"));
        app.start();
        settle(&mut app).await;

        app.search("fail");
        settle(&mut app).await;

        assert_eq!(app.session().results().len(), 2);
        assert_eq!(app.session().results()[0].subject, "budget #1");
        let error = app.session().last_error().unwrap();
        assert!(error.starts_with("Search failed"), "{error}");
        assert!(screen(&app).contains("(r to retry)"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stale_completion_is_discarded() {
        let mut app = app(None);
        let first = app.session.begin_search("first").generation;
        let second = app.session.begin_search("second").generation;

        assert!(app.apply(second, Ok(stub_response("second"))));
        assert!(!app.apply(first, Ok(stub_response("first"))));
        assert_eq!(app.session().results()[0].subject, "second #1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_selection_toggles_main_panel() {
        let mut app = app(Some("budget"));
        app.start();
        settle(&mut app).await;
        app.focus = Focus::Results;

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().selected_index(), Some(0));
        assert!(screen(&app).contains("Email #1"));

        // Another row replaces the detail directly
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().selected_index(), Some(1));

        // The same row again goes back to the map
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().selected_index(), None);
        assert!(screen(&app).contains("Semantic map"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_plot_point_click_scrolls_list() {
        let mut app = app(Some("many results"));
        app.start();
        settle(&mut app).await;
        assert_eq!(app.list.viewport_rows(), 10);

        let plot = app.session().display_plot().into_owned();
        let canvas = plot::canvas_area(app.areas.main);
        let bounds = app.plot_view.bounds(plot.primary_trace());
        let point = plot.data[0].point(1).unwrap();
        let pos = bounds.project(canvas, point).unwrap();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), pos));
        assert_eq!(app.focus(), Focus::Main);
        assert_eq!(app.list.offset(), 1);
        assert_eq!(app.plot_view.cursor(), Some(1));

        // Keyboard: the last point scrolls as far as the list allows
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.plot_view.cursor(), Some(11));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.list.offset(), 2);
        assert!(app.list.is_visible(11));

        // Out of range is a no-op
        app.point_click(40);
        assert_eq!(app.list.offset(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_plot_click_after_zoom() {
        let mut app = app(Some("many results"));
        app.start();
        settle(&mut app).await;
        app.focus = Focus::Main;

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.plot_view.cursor(), Some(1));
        app.handle_key(key(KeyCode::Char('+')));
        assert!((app.plot_view.zoom() - 1.5).abs() < 1e-9);
        assert!(screen(&app).contains("zoom 1.5x"));

        let plot = app.session().display_plot().into_owned();
        let canvas = plot::canvas_area(app.areas.main);
        let bounds = app.plot_view.bounds(plot.primary_trace());
        let point = plot.data[0].point(3).unwrap();
        let pos = bounds.project(canvas, point).unwrap();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), pos));
        assert_eq!(app.plot_view.cursor(), Some(3));

        app.handle_key(key(KeyCode::Char('0')));
        assert_eq!(app.plot_view.zoom(), 1.0);
        assert_eq!(app.plot_view.bounds(plot.primary_trace()), plot::PlotBounds::fit(plot.primary_trace()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_detail_scroll_stops_at_end() {
        let mut app = app(Some("budget"));
        app.start();
        settle(&mut app).await;
        app.focus = Focus::Results;
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.showing_detail());

        app.focus = Focus::Main;
        app.handle_key(key(KeyCode::PageDown));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.detail.scroll(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mouse_hover_follows_list() {
        let mut app = app(Some("budget"));
        app.start();
        settle(&mut app).await;

        let list = app.areas.list;
        let first_row = Position::new(list.x + 2, list.y + 1);
        let second_row = Position::new(list.x + 2, list.y + 1 + result_list::ROW_HEIGHT);

        app.handle_mouse(mouse(MouseEventKind::Moved, first_row));
        assert_eq!(app.session().hovered(), Some(0));
        app.handle_mouse(mouse(MouseEventKind::Moved, second_row));
        assert_eq!(app.session().hovered(), Some(1));

        // Leaving the list clears the hover
        app.handle_mouse(mouse(MouseEventKind::Moved, Position::new(1, 1)));
        assert_eq!(app.session().hovered(), None);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), second_row));
        assert_eq!(app.session().selected_index(), Some(1));
        assert_eq!(app.focus(), Focus::Results);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_retry_reissues_last_query() {
        let mut app = app(Some("budget"));
        app.start();
        settle(&mut app).await;
        let generation = app.session().generation();

        app.focus = Focus::Results;
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.session().generation(), generation + 1);
        assert_eq!(app.session().pending_query(), Some("budget"));
        settle(&mut app).await;
        assert_eq!(app.session().results().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_bar_submits_on_enter() {
        let mut app = app(None);
        for c in "raptor".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.focus(), Focus::Results);
        settle(&mut app).await;
        assert_eq!(app.session().results()[0].subject, "raptor #1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_onboarding_is_modal() {
        let mut app = App::new(
            Arc::new(StubApi),
            Handle::current(),
            AppOptions {
                initial_query: None,
                show_onboarding: true,
            },
        );
        assert!(screen(&app).contains("Welcome to Searchica"));

        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.search_bar.value(), "");

        app.handle_key(key(KeyCode::Enter));
        assert!(!app.onboarding.is_visible());
        assert!(!app.session().is_searching());

        app.focus = Focus::Results;
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.onboarding.is_visible());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_quit_keys() {
        let mut app = app(None);
        // 'q' is text while the search bar has focus
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn test_areas_layout() {
        let areas = Areas::compute(Rect::new(0, 0, 120, 40));
        assert_eq!(areas.search.height, 3);
        assert_eq!(areas.status.height, 1);
        assert_eq!(areas.help.height, 3);
        assert_eq!(areas.main.height, 33);
        assert_eq!(areas.main.x, 0);
        assert!(areas.list.x > areas.main.x);
        assert_eq!(areas.main.width + areas.list.width, 120);
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(Focus::Search.next().next().next(), Focus::Search);
        assert_eq!(Focus::Search.prev(), Focus::Main);
    }
}
