//! TUI for proxy checker with progress display

use crate::proxy::{ProbeResult, ProxyChecker, ProxyLists};
use crate::report::CheckSummary;
use crate::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::Duration;

/// Maximum number of recent proxies to keep for display
const MAX_RECENT_PROXIES: usize = 100;

/// Proxy checker TUI application state
pub struct ProxyCheckerApp {
    checker: ProxyChecker,
    /// Lists still to be handed to the checker
    lists: Option<ProxyLists>,
    total: usize,
    summary: CheckSummary,
    /// Every result received so far
    results: Vec<ProbeResult>,
    recent_working: VecDeque<ProbeResult>,
    recent_failed: VecDeque<ProbeResult>,
    /// Selected list (0 = working, 1 = not working)
    selected_list: usize,
    list_state: ListState,
    status_message: String,
    is_complete: bool,
    should_quit: bool,
}

impl ProxyCheckerApp {
    pub fn new(checker: ProxyChecker, lists: ProxyLists) -> Self {
        let total = lists.values().map(Vec::len).sum();
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            checker,
            lists: Some(lists),
            total,
            summary: CheckSummary::default(),
            results: Vec::with_capacity(total),
            recent_working: VecDeque::new(),
            recent_failed: VecDeque::new(),
            selected_list: 0,
            list_state,
            status_message: "Starting proxy check... Press 'q' to quit.".to_string(),
            is_complete: false,
            should_quit: false,
        }
    }

    /// Run the TUI and return the results collected before it closed
    pub async fn run(mut self) -> Result<Vec<ProbeResult>> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result?;
        if !self.is_complete {
            tracing::warn!(
                received = self.results.len(),
                total = self.total,
                "Check interrupted, report will be partial"
            );
        }
        Ok(self.results)
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let lists = self.lists.take().unwrap_or_default();
        let mut rx = self.checker.run_stream(lists);

        loop {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_input(key.code);
                        if self.should_quit {
                            break;
                        }
                    }
                }
            }

            // Drain whatever finished since the last frame
            loop {
                match rx.try_recv() {
                    Ok(result) => self.record(result),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if !self.is_complete {
                            self.is_complete = true;
                            self.status_message = format!(
                                "Complete! Checked: {} | Working: {} | Not working: {} | Press 'q' to quit",
                                self.total, self.summary.working, self.summary.not_working
                            );
                        }
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    fn record(&mut self, result: ProbeResult) {
        self.summary.record(&result);

        let recent = if result.is_working() {
            &mut self.recent_working
        } else {
            &mut self.recent_failed
        };
        recent.push_back(result.clone());
        if recent.len() > MAX_RECENT_PROXIES {
            recent.pop_front();
        }
        self.results.push(result);

        let percentage = self.progress();
        self.status_message = format!(
            "Checking... {}% ({}/{}) | Working: {} (elite {}, anonymous {}, transparent {}) | Not working: {}",
            percentage,
            self.summary.total,
            self.total,
            self.summary.working,
            self.summary.elite,
            self.summary.anonymous,
            self.summary.transparent,
            self.summary.not_working
        );
    }

    fn progress(&self) -> u16 {
        if self.total > 0 {
            (self.summary.total as f64 / self.total as f64 * 100.0) as u16
        } else {
            100
        }
    }

    fn handle_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.selected_list = (self.selected_list + 1) % 2;
                self.list_state.select(Some(0));
            }
            KeyCode::Down => {
                let len = self.selected_len();
                let i = match self.list_state.selected() {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                };
                self.list_state.select(Some(i));
            }
            KeyCode::Up => {
                let len = self.selected_len();
                let i = match self.list_state.selected() {
                    Some(0) | None => len.saturating_sub(1),
                    Some(i) => i - 1,
                };
                self.list_state.select(Some(i));
            }
            _ => {}
        }
    }

    fn selected_len(&self) -> usize {
        if self.selected_list == 0 {
            self.recent_working.len()
        } else {
            self.recent_failed.len()
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Progress bar
                Constraint::Min(0),    // Proxy lists
                Constraint::Length(3), // Status bar
            ])
            .split(f.size());

        let title = Paragraph::new("Proxy Sweep")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        let progress = self.progress();
        let progress_label = format!("{}/{} ({}%)", self.summary.total, self.total, progress);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .percent(progress.min(100))
            .label(progress_label);
        f.render_widget(gauge, chunks[1]);

        let proxy_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        Self::render_result_list(
            f,
            proxy_chunks[0],
            "Working",
            &self.recent_working,
            self.summary.working,
            self.selected_list == 0,
            Color::Green,
            if self.selected_list == 0 { Some(&mut self.list_state) } else { None },
        );

        Self::render_result_list(
            f,
            proxy_chunks[1],
            "Not working",
            &self.recent_failed,
            self.summary.not_working,
            self.selected_list == 1,
            Color::Red,
            if self.selected_list == 1 { Some(&mut self.list_state) } else { None },
        );

        let status = Paragraph::new(self.status_message.clone())
            .style(if self.is_complete {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            })
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(status, chunks[3]);
    }

    /// One-line summary of a result for the lists
    fn describe(result: &ProbeResult) -> String {
        if result.is_working() {
            let mut line = format!("[{}] {}", result.protocol, result.endpoint_raw);
            if let Some(anonymity) = result.anonymity {
                line.push_str(&format!(" {}", anonymity));
            }
            if let Some(server) = result.server_software {
                line.push_str(&format!(" {}", server));
            }
            if let Some(time) = result.response_time_ms {
                line.push_str(&format!(" ({}ms)", time));
            }
            line
        } else {
            match &result.failure {
                Some(cause) => format!("[{}] {} - {}", result.protocol, result.endpoint_raw, cause),
                None => format!("[{}] {}", result.protocol, result.endpoint_raw),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_result_list(
        f: &mut Frame,
        area: Rect,
        title: &str,
        results: &VecDeque<ProbeResult>,
        total_count: usize,
        is_selected: bool,
        color: Color,
        list_state: Option<&mut ListState>,
    ) {
        let items: Vec<ListItem> = results
            .iter()
            .rev() // Show newest first
            .map(|result| ListItem::new(Self::describe(result)).style(Style::default().fg(color)))
            .collect();

        let block_title = format!("{} ({})", title, total_count);
        let border_style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(block_title)
                    .border_style(border_style),
            )
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol(">> ");

        if let Some(state) = list_state {
            f.render_stateful_widget(list, area, state);
        } else {
            f.render_widget(list, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{
        Anonymity, CheckerConfig, Endpoint, FailureCause, Protocol, ServerSoftware,
    };

    fn app() -> ProxyCheckerApp {
        let checker = ProxyChecker::new(CheckerConfig::new()).unwrap();
        let mut lists = ProxyLists::new();
        lists.insert(Protocol::Http, vec!["a:1:US".into(), "b:2:DE".into()]);
        ProxyCheckerApp::new(checker, lists)
    }

    fn endpoint() -> Endpoint {
        Endpoint::new("a".into(), "1".into(), "US".into(), Protocol::Http)
    }

    #[test]
    fn test_record_updates_summary_and_lists() {
        let mut app = app();
        assert_eq!(app.total, 2);

        app.record(ProbeResult::working(
            &endpoint(),
            "a:1:US".into(),
            None,
            Anonymity::Elite,
            None,
            10,
        ));
        app.record(ProbeResult::malformed(Protocol::Http, "b".into()));

        assert_eq!(app.summary.working, 1);
        assert_eq!(app.summary.not_working, 1);
        assert_eq!(app.recent_working.len(), 1);
        assert_eq!(app.recent_failed.len(), 1);
        assert_eq!(app.results.len(), 2);
        assert_eq!(app.progress(), 100);
    }

    #[test]
    fn test_describe_result() {
        let working = ProbeResult::working(
            &endpoint(),
            "a:1:US".into(),
            None,
            Anonymity::Anonymous,
            Some(ServerSoftware::Squid),
            25,
        );
        assert_eq!(
            ProxyCheckerApp::describe(&working),
            "[http] a:1:US anonymous squid (25ms)"
        );

        let failed =
            ProbeResult::not_working(&endpoint(), "a:1:US".into(), "127.0.0.1".into(), FailureCause::Timeout);
        assert_eq!(
            ProxyCheckerApp::describe(&failed),
            "[http] a:1:US - probe timed out"
        );
    }

    #[test]
    fn test_list_navigation_wraps() {
        let mut app = app();
        for _ in 0..3 {
            app.record(ProbeResult::malformed(Protocol::Http, "x".into()));
        }
        app.handle_input(KeyCode::Tab);
        assert_eq!(app.selected_list, 1);

        app.handle_input(KeyCode::Up);
        assert_eq!(app.list_state.selected(), Some(2));
        app.handle_input(KeyCode::Down);
        assert_eq!(app.list_state.selected(), Some(0));

        app.handle_input(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
