use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::warn;

use zenspend::coach::{Reply, Role, SUGGESTED_QUESTIONS};
use zenspend::{
    AlertType, BudgetStatus, BurnStatus, CategorySelector, Currency, NotificationKind, Transaction,
    Workspace, CONTRIBUTION_PRESETS,
};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Transactions,
    Budgets,
    Goals,
    Analytics,
    Alerts,
    Settings,
    Coach,
}

impl Page {
    pub const ALL: [Page; 8] = [
        Page::Dashboard,
        Page::Transactions,
        Page::Budgets,
        Page::Goals,
        Page::Analytics,
        Page::Alerts,
        Page::Settings,
        Page::Coach,
    ];

    fn index(&self) -> usize {
        Page::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Transactions => "Transactions",
            Page::Budgets => "Budgets",
            Page::Goals => "Goals",
            Page::Analytics => "Analytics",
            Page::Alerts => "Alerts",
            Page::Settings => "Settings",
            Page::Coach => "Coach",
        }
    }
}

/// Where typed characters go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Chat,
}

pub struct App {
    pub ws: Workspace,
    pub current_page: Page,
    pub input_mode: InputMode,
    pub chat_input: String,
    pub show_detail: bool,
    pub status: Option<String>,
    pub alert_filter: Option<AlertType>,
    pub tx_state: TableState,
    pub goal_state: TableState,
    pub alert_state: TableState,
    pub settings_state: TableState,
    runtime: Handle,
    reply_tx: Sender<Reply>,
    reply_rx: Receiver<Reply>,
}

impl App {
    pub fn new(ws: Workspace, runtime: Handle) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel();

        let mut app = Self {
            ws,
            current_page: Page::Dashboard,
            input_mode: InputMode::Normal,
            chat_input: String::new(),
            show_detail: false,
            status: None,
            alert_filter: None,
            tx_state: TableState::default(),
            goal_state: TableState::default(),
            alert_state: TableState::default(),
            settings_state: TableState::default(),
            runtime,
            reply_tx,
            reply_rx,
        };

        app.reset_selection();
        app.goal_state.select(Some(0));
        app.settings_state.select(Some(0));
        app
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.show_detail = false;
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.show_detail = false;
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        let filtered = self.ws.filtered_transactions();
        self.tx_state.selected().and_then(|i| filtered.get(i).copied())
    }

    fn visible_alert_ids(&self) -> Vec<String> {
        self.ws
            .alerts()
            .filter(self.alert_filter)
            .into_iter()
            .map(|a| a.id.clone())
            .collect()
    }

    // Reset selection to first item of every list whose contents may have changed
    fn reset_selection(&mut self) {
        let tx_len = self.ws.filtered_transactions().len();
        self.tx_state.select(if tx_len > 0 { Some(0) } else { None });

        let alert_len = self.visible_alert_ids().len();
        self.alert_state.select(if alert_len > 0 { Some(0) } else { None });
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    pub fn push_search_char(&mut self, c: char) {
        let mut query = self.ws.filter().query.clone();
        query.push(c);
        self.ws.set_query(&query);
        self.reset_selection();
    }

    pub fn pop_search_char(&mut self) {
        let mut query = self.ws.filter().query.clone();
        query.pop();
        self.ws.set_query(&query);
        self.reset_selection();
    }

    pub fn cycle_category(&mut self) {
        let next = self.ws.filter().category.next();
        self.ws.set_category(next);
        self.reset_selection();
    }

    pub fn clear_filter(&mut self) {
        self.ws.set_query("");
        self.ws.set_category(CategorySelector::All);
        self.reset_selection();
    }

    pub fn contribute_preset(&mut self, preset: usize) {
        let Some(amount) = CONTRIBUTION_PRESETS.get(preset).copied() else {
            return;
        };
        let Some(id) = self
            .goal_state
            .selected()
            .and_then(|i| self.ws.goals().get(i))
            .map(|g| g.id.clone())
        else {
            return;
        };

        self.status = Some(match self.ws.add_to_goal(&id, amount) {
            Ok(outcome) if outcome.reached_target => "🎉 Goal reached!".to_string(),
            Ok(outcome) => format!("Added {}", self.ws.money(outcome.applied)),
            Err(err) => err.to_string(),
        });
    }

    pub fn set_alert_filter(&mut self, filter: Option<AlertType>) {
        self.alert_filter = filter;
        self.reset_selection();
    }

    pub fn dismiss_selected_alert(&mut self) {
        let ids = self.visible_alert_ids();
        let Some(id) = self.alert_state.selected().and_then(|i| ids.get(i)) else {
            return;
        };

        if let Err(err) = self.ws.dismiss_alert(id) {
            self.status = Some(err.to_string());
        }

        let remaining = self.visible_alert_ids().len();
        match self.alert_state.selected() {
            _ if remaining == 0 => self.alert_state.select(None),
            Some(i) if i >= remaining => self.alert_state.select(Some(remaining - 1)),
            _ => {}
        }
    }

    /// Row 0 is the currency; rows 1.. are the notification toggles
    pub fn activate_setting(&mut self) {
        match self.settings_state.selected() {
            Some(0) => {
                let current = self.ws.settings().currency;
                let index = Currency::ALL.iter().position(|c| *c == current).unwrap_or(0);
                let next = Currency::ALL[(index + 1) % Currency::ALL.len()];
                self.ws.settings_mut().set_currency(next);
            }
            Some(i) => {
                if let Some(kind) = NotificationKind::ALL.get(i - 1) {
                    self.ws.settings_mut().toggle(*kind);
                }
            }
            None => {}
        }
    }

    /// Send a chat message; the reply arrives later through `drain_replies`.
    /// Returns whether the coach took the message.
    pub fn send_chat(&mut self, text: &str) -> bool {
        match self.ws.coach_mut().submit(text) {
            Ok(pending) => {
                let tx = self.reply_tx.clone();
                self.runtime.spawn(async move {
                    let reply = pending.resolve().await;
                    if tx.send(reply).is_err() {
                        warn!("coach reply dropped: dashboard closed");
                    }
                });
                true
            }
            Err(err) => {
                self.status = Some(err.to_string());
                false
            }
        }
    }

    /// The typed text stays in the input box when the coach rejects it
    pub fn submit_chat_input(&mut self) {
        let text = self.chat_input.clone();
        if self.send_chat(&text) {
            self.chat_input.clear();
        }
    }

    pub fn drain_replies(&mut self) {
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.ws.coach_mut().finish(reply);
        }
    }

    fn list_len(&self) -> usize {
        match self.current_page {
            Page::Transactions => self.ws.filtered_transactions().len(),
            Page::Goals => self.ws.goals().len(),
            Page::Alerts => self.visible_alert_ids().len(),
            Page::Settings => 1 + NotificationKind::ALL.len(),
            _ => 0,
        }
    }

    fn list_state(&mut self) -> Option<&mut TableState> {
        match self.current_page {
            Page::Transactions => Some(&mut self.tx_state),
            Page::Goals => Some(&mut self.goal_state),
            Page::Alerts => Some(&mut self.alert_state),
            Page::Settings => Some(&mut self.settings_state),
            _ => None,
        }
    }

    pub fn next(&mut self) {
        let len = self.list_len();
        if let Some(state) = self.list_state() {
            select_next(state, len);
        }
    }

    pub fn previous(&mut self) {
        let len = self.list_len();
        if let Some(state) = self.list_state() {
            select_previous(state, len);
        }
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.input_mode {
            InputMode::Search => {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => self.input_mode = InputMode::Normal,
                    KeyCode::Backspace => self.pop_search_char(),
                    KeyCode::Char(c) => self.push_search_char(c),
                    _ => {}
                }
                return false;
            }
            InputMode::Chat => {
                match key.code {
                    KeyCode::Esc => self.input_mode = InputMode::Normal,
                    KeyCode::Enter => self.submit_chat_input(),
                    KeyCode::Backspace => {
                        self.chat_input.pop();
                    }
                    KeyCode::Char(c) => self.chat_input.push(c),
                    _ => {}
                }
                return false;
            }
            InputMode::Normal => {}
        }

        self.status = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            _ => self.handle_page_key(key.code),
        }

        false
    }

    fn handle_page_key(&mut self, code: KeyCode) {
        match (self.current_page, code) {
            (Page::Transactions, KeyCode::Char('/')) => self.input_mode = InputMode::Search,
            (Page::Transactions, KeyCode::Char('f')) => self.cycle_category(),
            (Page::Transactions, KeyCode::Char('c')) => self.clear_filter(),
            (Page::Transactions, KeyCode::Enter) => self.toggle_detail(),
            (Page::Goals, KeyCode::Char('1')) => self.contribute_preset(0),
            (Page::Goals, KeyCode::Char('2')) => self.contribute_preset(1),
            (Page::Alerts, KeyCode::Char('a')) => self.set_alert_filter(None),
            (Page::Alerts, KeyCode::Char('w')) => self.set_alert_filter(Some(AlertType::Warning)),
            (Page::Alerts, KeyCode::Char('i')) => self.set_alert_filter(Some(AlertType::Info)),
            (Page::Alerts, KeyCode::Char('s')) => self.set_alert_filter(Some(AlertType::Success)),
            (Page::Alerts, KeyCode::Char('d')) => self.dismiss_selected_alert(),
            (Page::Settings, KeyCode::Enter | KeyCode::Char(' ')) => self.activate_setting(),
            (Page::Coach, KeyCode::Char('i') | KeyCode::Enter) => self.input_mode = InputMode::Chat,
            (Page::Coach, KeyCode::Char('x')) => self.ws.coach_mut().clear(),
            (Page::Coach, KeyCode::Char(c @ '1'..='4')) => {
                let index = c as usize - '1' as usize;
                self.send_chat(SUGGESTED_QUESTIONS[index]);
            }
            _ => {}
        }
    }
}

fn select_next(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    };
    state.select(Some(i));
}

fn select_previous(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    };
    state.select(Some(i));
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.drain_replies();
        terminal.draw(|f| ui(f, app))?;

        // Poll so coach replies show up without a key press
        if !event::poll(TICK)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Dashboard => render_dashboard(f, chunks[1], app),
        Page::Transactions => {
            if app.show_detail {
                let content_chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Percentage(60), // Transaction list
                        Constraint::Percentage(40), // Detail panel
                    ])
                    .split(chunks[1]);

                render_transactions(f, content_chunks[0], app);
                render_detail_panel(f, content_chunks[1], app);
            } else {
                render_transactions(f, chunks[1], app);
            }
        }
        Page::Budgets => render_budgets(f, chunks[1], app),
        Page::Goals => render_goals(f, chunks[1], app),
        Page::Analytics => render_analytics(f, chunks[1], app),
        Page::Alerts => render_alerts(f, chunks[1], app),
        Page::Settings => render_settings(f, chunks[1], app),
        Page::Coach => render_coach(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn bordered(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn amount_color(amount: f64) -> Color {
    if amount < 0.0 {
        Color::Red
    } else {
        Color::Green
    }
}

fn budget_color(status: BudgetStatus) -> Color {
    match status {
        BudgetStatus::Under => Color::Green,
        BudgetStatus::NearLimit => Color::Yellow,
        BudgetStatus::Over => Color::Red,
    }
}

fn alert_color(alert_type: AlertType) -> Color {
    match alert_type {
        AlertType::Warning => Color::Yellow,
        AlertType::Info => Color::Blue,
        AlertType::Success => Color::Green,
    }
}

/// Text progress bar, `width` cells wide
fn bar(fill: u32, width: usize) -> String {
    let filled = (fill.min(100) as usize * width) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let warnings = app.ws.alerts().count(AlertType::Warning);
    if warnings > 0 {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("⚠ {}", warnings),
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let overview = match app.ws.overview() {
        Ok(overview) => overview,
        Err(err) => {
            f.render_widget(Paragraph::new(err.to_string()).block(bordered(" Dashboard ", Color::Red)), area);
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Stat tiles
            Constraint::Length(3), // Burn rate
            Constraint::Min(0),    // Recent + donut
        ])
        .split(area);

    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(rows[0]);

    let flow = overview.cash_flow;
    let stats = [
        (" Income ", app.ws.money(flow.income), Color::Green),
        (" Expenses ", app.ws.money(flow.expenses), Color::Red),
        (" Net ", app.ws.money(flow.net), amount_color(flow.net)),
        (" Savings Rate ", format!("{:.0}%", overview.savings_rate * 100.0), Color::Cyan),
    ];
    for (tile, (title, value, color)) in tiles.iter().zip(stats) {
        let widget = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .block(bordered(title, Color::White));
        f.render_widget(widget, *tile);
    }

    let burn = overview.burn_rate;
    let burn_color = match burn.status {
        BurnStatus::OnTrack => Color::Green,
        BurnStatus::Caution => Color::Yellow,
        BurnStatus::OverBudget => Color::Red,
    };
    let gauge = Gauge::default()
        .block(bordered(" Monthly Budget ", Color::White))
        .gauge_style(Style::default().fg(burn_color))
        .percent(burn.budget_used.clamp(0, 100) as u16)
        .label(format!(
            "{}% used, {}% of month elapsed: {}",
            burn.budget_used,
            burn.expected_usage,
            burn.status.message()
        ));
    f.render_widget(gauge, rows[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);

    let recent: Vec<Row> = overview
        .recent_transactions
        .iter()
        .map(|tx| {
            Row::new(vec![
                Cell::from(tx.date.format("%b %d").to_string()),
                Cell::from(truncate(&tx.description, 24)),
                Cell::from(app.ws.money(tx.amount)).style(Style::default().fg(amount_color(tx.amount))),
            ])
        })
        .collect();
    let recent_table = Table::new(
        recent,
        [Constraint::Length(8), Constraint::Min(16), Constraint::Length(12)],
    )
    .block(bordered(" Recent Transactions ", Color::White));
    f.render_widget(recent_table, bottom[0]);

    let categories = app.ws.categories();
    let donut: Vec<Line> = overview
        .category_spending
        .iter()
        .map(|slice| {
            Line::from(vec![
                Span::raw(format!(" {:<16}", truncate(&categories.name_of(slice.category), 16))),
                Span::styled(bar(slice.percentage, 20), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {:>3}%", slice.percentage)),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(donut).block(bordered(" Spending by Category ", Color::White)),
        bottom[1],
    );
}

fn render_transactions(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let filter = app.ws.filter();
    let searching = app.input_mode == InputMode::Search;
    let search = Paragraph::new(Line::from(vec![
        Span::styled(" 🔍 ", Style::default().fg(Color::Cyan)),
        Span::styled(
            if filter.query.is_empty() && !searching {
                "press / to search".to_string()
            } else {
                format!("{}{}", filter.query, if searching { "▏" } else { "" })
            },
            Style::default().fg(if searching { Color::White } else { Color::DarkGray }),
        ),
        Span::raw("   Category: "),
        Span::styled(filter.category.to_string(), Style::default().fg(Color::Yellow)),
    ]))
    .block(bordered(" Search ", if searching { Color::Yellow } else { Color::White }));
    f.render_widget(search, chunks[0]);

    let categories = app.ws.categories();
    let rows: Vec<Row> = app
        .ws
        .filtered_transactions()
        .iter()
        .map(|tx| {
            Row::new(vec![
                Cell::from(tx.date.to_string()),
                Cell::from(truncate(&tx.description, 30)),
                Cell::from(categories.name_of(tx.category)),
                Cell::from(app.ws.money(tx.amount)).style(Style::default().fg(amount_color(tx.amount))),
            ])
            .height(1)
        })
        .collect();
    let count = rows.len();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(32),
            Constraint::Length(18),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["Date", "Description", "Category", "Amount"]))
    .block(bordered(" Transactions ", Color::White).title(format!(" {} shown ", count)))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.tx_state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let tx = match app.selected_transaction() {
        Some(t) => t,
        None => {
            let no_selection = Paragraph::new("No transaction selected")
                .block(bordered(" Transaction Details ", Color::Yellow));
            f.render_widget(no_selection, area);
            return;
        }
    };

    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![label("  Date: "), Span::raw(tx.date.format("%B %d, %Y").to_string())]),
        Line::from(""),
        Line::from(vec![label("  Description: "), Span::raw(tx.description.clone())]),
        Line::from(""),
        Line::from(vec![
            label("  Amount: "),
            Span::styled(app.ws.money(tx.amount), Style::default().fg(amount_color(tx.amount))),
        ]),
        Line::from(""),
        Line::from(vec![label("  Category: "), Span::raw(app.ws.categories().name_of(tx.category))]),
        Line::from(""),
        Line::from(vec![label("  ID: "), Span::raw(tx.id.clone())]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![
            label("  Fingerprint: "),
            Span::styled(truncate(&tx.fingerprint(), 16), Style::default().fg(Color::Green)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Press Enter to close",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]),
    ];

    let detail_panel = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(bordered(" Transaction Details ", Color::Yellow));

    f.render_widget(detail_panel, area);
}

fn render_budgets(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(9)])
        .split(area);

    let rows: Vec<Row> = match app.ws.budget_rows() {
        Ok(rows) => rows
            .iter()
            .map(|row| {
                let color = budget_color(row.status);
                Row::new(vec![
                    Cell::from(row.name.clone()),
                    Cell::from(format!("{} / {}", app.ws.money(row.spent), app.ws.money(row.limit))),
                    Cell::from(bar(row.fill, 20)).style(Style::default().fg(color)),
                    Cell::from(format!("{:>3}%", row.percentage)).style(Style::default().fg(color)),
                    Cell::from(row.status.label()).style(Style::default().fg(color)),
                ])
            })
            .collect(),
        Err(err) => vec![Row::new(vec![Cell::from(err.to_string())])],
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(24),
            Constraint::Length(22),
            Constraint::Length(6),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["Category", "Spent / Limit", "Progress", "%", "Status"]))
    .block(bordered(" Budgets ", Color::White));
    f.render_widget(table, chunks[0]);

    let today = app.ws.today();
    let subs: Vec<Row> = app
        .ws
        .subscriptions()
        .iter()
        .map(|sub| {
            Row::new(vec![
                Cell::from(format!("{} {}", sub.icon, sub.name)),
                Cell::from(app.ws.money(sub.amount)),
                Cell::from(sub.billing_cycle.as_str()),
                Cell::from(sub.next_payment.to_string()),
                Cell::from(format!("{} days", sub.days_until_payment(today))),
            ])
        })
        .collect();
    let monthly = zenspend::entities::subscription::total_monthly_cost(app.ws.subscriptions());

    let table = Table::new(
        subs,
        [
            Constraint::Length(22),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&["Subscription", "Amount", "Cycle", "Next", "Due in"]))
    .block(bordered(" Subscriptions ", Color::White).title(format!(" {}/month ", app.ws.money(monthly))));
    f.render_widget(table, chunks[1]);
}

fn render_goals(f: &mut Frame, area: Rect, app: &mut App) {
    let today = app.ws.today();
    let rows: Vec<Row> = app
        .ws
        .goals()
        .iter()
        .map(|goal| {
            let percentage = goal.percentage().unwrap_or(0);
            let color = if goal.is_complete() { Color::Green } else { Color::Cyan };
            Row::new(vec![
                Cell::from(format!("{} {}", goal.icon().glyph(), goal.name)),
                Cell::from(format!("{} / {}", app.ws.money(goal.current), app.ws.money(goal.target))),
                Cell::from(bar(percentage, 20)).style(Style::default().fg(color)),
                Cell::from(format!("{:>3}%", percentage)),
                Cell::from(if goal.is_complete() {
                    "Complete".to_string()
                } else {
                    format!("{} days left", goal.days_left(today))
                }),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(26),
            Constraint::Length(22),
            Constraint::Length(6),
            Constraint::Length(16),
        ],
    )
    .header(header_row(&["Goal", "Saved / Target", "Progress", "%", "Deadline"]))
    .block(bordered(" Savings Goals ", Color::White).title(format!(
        " 1: +{}  2: +{} ",
        app.ws.money(CONTRIBUTION_PRESETS[0]),
        app.ws.money(CONTRIBUTION_PRESETS[1])
    )))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.goal_state);
}

fn render_analytics(f: &mut Frame, area: Rect, app: &App) {
    let analytics = app.ws.analytics();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let peak = analytics
        .monthly_trends
        .iter()
        .map(|t| t.income.max(t.expenses))
        .fold(0.0_f64, f64::max);
    let scale = |value: f64| if peak > 0.0 { (value / peak * 100.0).round() as u32 } else { 0 };

    let mut lines = vec![Line::from("")];
    for (trend, net) in analytics.monthly_trends.iter().zip(&analytics.monthly_net) {
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<4}", trend.month)),
            Span::styled(bar(scale(trend.income), 16), Style::default().fg(Color::Green)),
            Span::raw(format!(" {:>12}", app.ws.money(trend.income))),
        ]));
        lines.push(Line::from(vec![
            Span::raw("      "),
            Span::styled(bar(scale(trend.expenses), 16), Style::default().fg(Color::Red)),
            Span::raw(format!(" {:>12}", app.ws.money(trend.expenses))),
            Span::styled(
                format!("  net {}", app.ws.money(net.net)),
                Style::default().fg(amount_color(net.net)),
            ),
        ]));
    }
    f.render_widget(
        Paragraph::new(lines).block(bordered(" Income vs Expenses ", Color::White)),
        chunks[0],
    );

    let mut lines = vec![Line::from("")];
    for change in &analytics.changes {
        let color = if change.change <= 0.0 { Color::Green } else { Color::Red };
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<10}", format!("{:?}", change.series))),
            Span::styled(
                format!("{:>12}", app.ws.money(change.change)),
                Style::default().fg(color),
            ),
            Span::styled(
                format!("  {} → {}", change.from_month, change.to_month),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    f.render_widget(
        Paragraph::new(lines).block(bordered(" Category Trends ", Color::White)),
        chunks[1],
    );
}

fn render_alerts(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let counts = app.ws.alerts().counts();
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[0]);
    let stats = [
        (" Warnings ", counts.warning, AlertType::Warning),
        (" Info ", counts.info, AlertType::Info),
        (" Success ", counts.success, AlertType::Success),
    ];
    for (tile, (title, count, alert_type)) in tiles.iter().zip(stats) {
        let selected = app.alert_filter == Some(alert_type);
        let widget = Paragraph::new(Line::from(Span::styled(
            format!(" {}", count),
            Style::default().fg(alert_color(alert_type)).add_modifier(Modifier::BOLD),
        )))
        .block(bordered(title, if selected { Color::Yellow } else { Color::White }));
        f.render_widget(widget, *tile);
    }

    let rows: Vec<Row> = app
        .ws
        .alerts()
        .filter(app.alert_filter)
        .into_iter()
        .map(|alert| {
            Row::new(vec![
                Cell::from(alert.alert_type.as_str()).style(Style::default().fg(alert_color(alert.alert_type))),
                Cell::from(alert.title.clone()),
                Cell::from(alert.message.clone()),
                Cell::from(alert.date.format("%b %d").to_string()),
            ])
        })
        .collect();

    let filter_label = app.alert_filter.map(|t| t.as_str()).unwrap_or("all");
    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(32),
            Constraint::Min(30),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["Type", "Title", "Message", "Date"]))
    .block(bordered(" Alerts ", Color::White).title(format!(" showing {} ", filter_label)))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.alert_state);
}

fn render_settings(f: &mut Frame, area: Rect, app: &mut App) {
    let settings = app.ws.settings();

    let mut rows = vec![Row::new(vec![
        Cell::from("Currency"),
        Cell::from(format!(
            "{} ({}) {}",
            settings.currency.symbol(),
            settings.currency.code(),
            settings.currency.name()
        ))
        .style(Style::default().fg(Color::Yellow)),
        Cell::from("Display currency for every amount"),
    ])];

    for kind in NotificationKind::ALL {
        let enabled = settings.notifications.get(kind);
        rows.push(Row::new(vec![
            Cell::from(kind.title()),
            Cell::from(if enabled { "● On" } else { "○ Off" })
                .style(Style::default().fg(if enabled { Color::Green } else { Color::DarkGray })),
            Cell::from(kind.description()),
        ]));
    }

    let table = Table::new(
        rows,
        [Constraint::Length(20), Constraint::Length(28), Constraint::Min(30)],
    )
    .block(bordered(" Settings ", Color::White).title(format!(" {} ", settings.profile_name)))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.settings_state);
}

fn render_coach(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Transcript
            Constraint::Length(6), // Suggestions
            Constraint::Length(3), // Input
        ])
        .split(area);

    let coach = app.ws.coach();
    let mut lines = vec![];
    for message in coach.messages() {
        let (who, color) = match message.role {
            Role::User => ("You", Color::Cyan),
            Role::Assistant => ("Coach", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", who),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for text in message.content.replace("**", "").lines() {
            lines.push(Line::from(format!("  {}", text)));
        }
        lines.push(Line::from(""));
    }
    if coach.is_typing() {
        lines.push(Line::from(Span::styled(
            "Coach is typing...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the newest messages in view
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;
    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(bordered(" Financial Coach ", Color::White));
    f.render_widget(transcript, chunks[0]);

    let suggestions: Vec<Line> = SUGGESTED_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, q)| {
            Line::from(vec![
                Span::styled(format!(" {}", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(format!(". {}", q)),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(suggestions).block(bordered(" Suggested Questions ", Color::White)),
        chunks[1],
    );

    let chatting = app.input_mode == InputMode::Chat;
    let input = Paragraph::new(if chatting {
        format!("{}▏", app.chat_input)
    } else {
        "press i to type, x to clear the chat".to_string()
    })
    .style(Style::default().fg(if chatting { Color::White } else { Color::DarkGray }))
    .block(bordered(" Message ", if chatting { Color::Yellow } else { Color::White }));
    f.render_widget(input, chunks[2]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" | "));
    }

    let keys: &[(&str, &str)] = match (app.input_mode, app.current_page) {
        (InputMode::Search, _) => &[("Enter/Esc", " Done")],
        (InputMode::Chat, _) => &[("Enter", " Send | "), ("Esc", " Done")],
        (_, Page::Transactions) => &[("/", " Search | "), ("f", " Category | "), ("c", " Clear | "), ("Enter", " Details | ")],
        (_, Page::Goals) => &[("1/2", " Add money | ")],
        (_, Page::Alerts) => &[("a/w/i/s", " Filter | "), ("d", " Dismiss | ")],
        (_, Page::Settings) => &[("Space", " Toggle | ")],
        (_, Page::Coach) => &[("1-4", " Ask | "), ("i", " Type | "), ("x", " Clear | ")],
        _ => &[],
    };
    for (key, label) in keys {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(*label));
    }

    if app.input_mode == InputMode::Normal {
        status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Page | "));
        status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Nav | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use zenspend::FixtureStore;

    fn app() -> App {
        let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let ws = Workspace::new(FixtureStore::builtin(), Duration::ZERO, today);
        App::new(ws, Handle::current())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Dashboard;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::Dashboard);
        assert_eq!(Page::Dashboard.previous(), Page::Coach);
    }

    #[tokio::test]
    async fn test_search_mode_updates_filter() {
        let mut app = app();
        app.current_page = Page::Transactions;

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Search);
        for c in "gas".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        // 'q' is text while searching, not quit
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.ws.filter().query, "gas");
        assert_eq!(app.selected_transaction().map(|t| t.id.as_str()), Some("5"));
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[tokio::test]
    async fn test_goal_preset_reaches_target() {
        let mut app = app();
        app.current_page = Page::Goals;
        app.goal_state.select(Some(3));

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.status.as_deref(), Some("🎉 Goal reached!"));
        assert!(app.ws.goals()[3].is_complete());
    }

    #[tokio::test]
    async fn test_dismiss_alert_keeps_selection_in_range() {
        let mut app = app();
        app.current_page = Page::Alerts;

        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.ws.alerts().count(AlertType::Warning), 0);
        assert_eq!(app.alert_state.selected(), None);
    }

    #[tokio::test]
    async fn test_settings_toggle() {
        let mut app = app();
        app.current_page = Page::Settings;

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.ws.settings().currency, Currency::EUR);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.ws.settings().notifications.budget_alerts);
    }

    #[tokio::test]
    async fn test_chat_reply_arrives_over_channel() {
        let mut app = app();
        app.current_page = Page::Coach;

        press(&mut app, KeyCode::Char('3'));
        assert!(app.ws.coach().is_typing());

        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.drain_replies();
            if !app.ws.coach().is_typing() {
                break;
            }
        }

        let messages = app.ws.coach().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, SUGGESTED_QUESTIONS[2]);
        assert_eq!(messages[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_rejected_chat_keeps_typed_text() {
        let mut app = app();
        app.current_page = Page::Coach;

        press(&mut app, KeyCode::Char('3'));
        assert!(app.ws.coach().is_typing());

        app.chat_input = "Can I afford a Birr 1,000 vacation?".to_string();
        app.submit_chat_input();
        assert_eq!(app.chat_input, "Can I afford a Birr 1,000 vacation?");
        assert_eq!(app.status.as_deref(), Some("coach is still typing a reply"));

        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.drain_replies();
            if !app.ws.coach().is_typing() {
                break;
            }
        }

        app.submit_chat_input();
        assert!(app.chat_input.is_empty());
        assert!(app.ws.coach().is_typing());
        assert_eq!(app.ws.coach().messages()[3].content, "Can I afford a Birr 1,000 vacation?");
    }
}
