use std::env;
use std::fs;
use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

use match_board::config::{BoardConfig, DEFAULT_EXPORT_FILE};
use match_board::controller::{Controller, Deferred, KeyPress, PageEvent, Task};
use match_board::export;
use match_board::page::ToolButton;
use match_board::state::{GridLayout, MatchCard, Score};
use match_board::terminal::{TerminalPage, is_loading};

const DEFAULT_COLUMNS_BREAKPOINT: u32 = 100;
const CARD_HEIGHT: u16 = 7;

struct App {
    page: TerminalPage,
    controller: Controller,
    timers: Vec<(Instant, Task)>,
    should_quit: bool,
}

impl App {
    fn new(cards: Vec<MatchCard>, config: BoardConfig, width: u16) -> Self {
        let mut page = TerminalPage::new(cards, width);
        let (controller, deferred) = Controller::init(&mut page, config);
        let mut app = Self {
            page,
            controller,
            timers: Vec::new(),
            should_quit: false,
        };
        app.schedule(deferred);
        app
    }

    fn dispatch(&mut self, event: PageEvent) {
        let outcome = self.controller.handle(&mut self.page, event);
        self.schedule(outcome.deferred);
    }

    fn schedule(&mut self, deferred: Vec<Deferred>) {
        let now = Instant::now();
        for Deferred { delay, task } in deferred {
            self.timers.push((now + delay, task));
        }
    }

    fn run_due_timers(&mut self) {
        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|(at, _)| *at <= now);
        self.timers = pending;
        for (_, task) in due {
            self.dispatch(PageEvent::Timer(task));
        }
    }

    fn next_timer_in(&self) -> Option<Duration> {
        let now = Instant::now();
        self.timers
            .iter()
            .map(|(at, _)| at.saturating_duration_since(now))
            .min()
    }

    fn click(&mut self, tool: ToolButton) {
        match self.controller.tool_button(tool) {
            Some(button) => self.dispatch(PageEvent::ButtonClick(button)),
            None => self
                .controller
                .push_log(format!("[INFO] No {} button", tool.label())),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char(c) = key.code {
                if c == 'c' {
                    self.should_quit = true;
                    return;
                }
                self.dispatch(PageEvent::KeyDown(KeyPress::ctrl(c.to_string())));
            }
            return;
        }

        if key.code == KeyCode::Esc {
            if self.page.search_focused && self.page.search_value.is_empty() {
                self.page.search_focused = false;
            }
            self.dispatch(PageEvent::KeyDown(KeyPress::plain("Escape")));
            return;
        }

        if self.page.search_focused {
            match key.code {
                KeyCode::Char(c) => {
                    self.page.search_value.push(c);
                    let value = self.page.search_value.clone();
                    self.dispatch(PageEvent::SearchInput(value));
                }
                KeyCode::Backspace => {
                    if self.page.search_value.pop().is_some() {
                        let value = self.page.search_value.clone();
                        self.dispatch(PageEvent::SearchInput(value));
                    }
                }
                KeyCode::Enter | KeyCode::Tab => self.page.search_focused = false,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('s') => {
                let next = self.controller.toolbar().sort.next();
                self.dispatch(PageEvent::SortChanged(next.as_str().to_string()));
            }
            KeyCode::Char('f') => {
                let next = self.controller.toolbar().tier.next();
                self.dispatch(PageEvent::TierChanged(next.as_str().to_string()));
            }
            KeyCode::Char('p') => self.click(ToolButton::Print),
            KeyCode::Char('e') => self.click(ToolButton::Export),
            KeyCode::Char('/') => self.dispatch(PageEvent::KeyDown(KeyPress::ctrl("k"))),
            _ => {}
        }
    }
}

pub fn run() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("MATCH_BOARD_FILE").ok())
        .unwrap_or_else(|| DEFAULT_EXPORT_FILE.to_string());
    let raw = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
    let cards = export::load_matches(&raw).with_context(|| format!("load {path}"))?;

    let breakpoint = env::var("MATCH_BOARD_COLUMNS_BREAKPOINT")
        .ok()
        .and_then(|val| val.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_COLUMNS_BREAKPOINT);
    let config = BoardConfig::from_env().with_breakpoint(breakpoint);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let width = terminal.size()?.width;
    let mut app = App::new(cards, config, width);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        app.run_due_timers();
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .next_timer_in()
            .map(|next| next.min(tick_rate))
            .unwrap_or(tick_rate);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Resize(width, _) => {
                    app.page.width = width;
                    app.dispatch(PageEvent::Resize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_line(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    frame.render_widget(Paragraph::new(toolbar_line(app)), chunks[1]);
    render_cards(frame, chunks[2], app);

    let logs: Vec<Line> = app
        .controller
        .logs()
        .iter()
        .rev()
        .take(4)
        .rev()
        .map(|line| Line::from(line.as_str()))
        .collect();
    let log_pane = Paragraph::new(logs)
        .block(Block::default().borders(Borders::TOP).title("Log"))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(log_pane, chunks[3]);

    let footer = "Ctrl+K or / Search | Esc Clear | s Sort | f Filter | p Print | e Export | q Quit";
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::Gray)),
        chunks[4],
    );
}

fn header_line(app: &App) -> Line<'static> {
    let mut spans = vec![Span::styled(
        "MATCHES",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for button in &app.page.buttons {
        let style = if is_loading(button) {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("[{}]", button.label()), style));
    }
    Line::from(spans)
}

fn toolbar_line(app: &App) -> Line<'static> {
    if !app.page.toolbar {
        return Line::from("");
    }
    let toolbar = app.controller.toolbar();
    let search_style = if app.page.search_focused {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        Style::default()
    };
    let placeholder = if app.page.search_value.is_empty() && !app.page.search_focused {
        "Search matches...".to_string()
    } else {
        app.page.search_value.clone()
    };
    Line::from(vec![
        Span::raw("Search: "),
        Span::styled(format!(" {placeholder} "), search_style),
        Span::raw(format!("  Sort: {}", toolbar.sort.as_str())),
        Span::raw(format!("  Filter: {}", toolbar.tier.as_str())),
    ])
}

fn render_cards(frame: &mut Frame, area: Rect, app: &App) {
    let visible = app.page.visible_cards();
    if visible.is_empty() {
        let empty = Paragraph::new("No matches").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let columns = match app.controller.layout() {
        Some(GridLayout::SingleColumn) => 1,
        _ => 3,
    };
    let rows_fit = (area.height / CARD_HEIGHT).max(1) as usize;
    for (row_idx, row) in visible.chunks(columns).take(rows_fit).enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + row_idx as u16 * CARD_HEIGHT,
            width: area.width,
            height: CARD_HEIGHT.min(area.height.saturating_sub(row_idx as u16 * CARD_HEIGHT)),
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(row_area);
        for ((card, pct), cell) in row.iter().zip(cells.iter()) {
            render_card(frame, *cell, card, *pct);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &MatchCard, pct: u16) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(card.title.clone());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let color = match card.score {
        Score::Value(v) if v >= 80 => Color::Green,
        Score::Value(v) if v >= 60 => Color::Cyan,
        _ => Color::Yellow,
    };
    let label = card.score_raw.clone().unwrap_or_else(|| "-".to_string());
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .percent(pct.min(100))
        .label(label);
    frame.render_widget(gauge, parts[0]);

    let reasons: Vec<Line> = card
        .reasons
        .iter()
        .map(|reason| Line::from(format!("• {}", reason.trim())))
        .collect();
    frame.render_widget(Paragraph::new(reasons).wrap(Wrap { trim: true }), parts[1]);
}
