//! Live health dashboard.
//!
//! Full-screen terminal view that redraws on every published snapshot.
//! Owns the terminal for the duration of the run; the monitor loop only
//! sees it as a [`SnapshotSink`].

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    widgets::{Cell, Paragraph, Row, Table},
    Frame, Terminal,
};

use crate::health::{
    CancelSignal, HealthSnapshot, LiveMonitor, NodeStatus, Sampler, SnapshotSink, StalenessTier,
};

/// Terminal-backed snapshot sink.
pub struct LiveView {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl SnapshotSink for LiveView {
    fn publish(&mut self, snapshot: &HealthSnapshot) -> Result<()> {
        self.terminal.draw(|frame| draw(frame, snapshot))?;
        Ok(())
    }
}

/// Run the monitor loop against a full-screen dashboard until the user
/// quits with `q`, `Esc` or `Ctrl-C`.
pub async fn run_live<S: Sampler>(monitor: &mut LiveMonitor<S>, url: &str) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let cancel = CancelSignal::new();
    let key_cancel = cancel.clone();
    let keys = tokio::task::spawn_blocking(move || listen_for_quit(key_cancel));

    let mut view = LiveView { terminal };
    let result = monitor.run(url, &mut view, &cancel).await;

    // Stop the key listener even when the loop failed on its own.
    cancel.cancel();
    let _ = keys.await;

    disable_raw_mode()?;
    execute!(view.terminal.backend_mut(), LeaveAlternateScreen)?;
    view.terminal.show_cursor()?;

    result
}

/// Blocking key poll loop; sets the cancel flag on a quit key.
fn listen_for_quit(cancel: CancelSignal) {
    while !cancel.is_cancelled() {
        if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
            continue;
        }
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let quit = matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                || (key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL));
            if quit {
                cancel.cancel();
            }
        }
    }
}

fn draw(frame: &mut Frame, snapshot: &HealthSnapshot) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title
        Constraint::Min(3),    // Health table
        Constraint::Length(1), // Footer
    ])
    .split(frame.area());

    let title = Paragraph::new(snapshot.label.clone())
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    let header = Row::new(vec!["Provider", "Node", "Status", "Height", "Latency"])
        .style(Style::default().fg(Color::Green));

    let rows: Vec<Row> = snapshot.rows.iter().map(health_row).collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Min(8),
        Constraint::Fill(2),
        Constraint::Fill(2),
    ];
    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, chunks[1]);

    let footer = Paragraph::new(format!("{}  |  q to quit", snapshot.source_url))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

fn health_row(row: &crate::health::GroupedHealthRow) -> Row<'static> {
    let node = format!("{} #{}", row.region, row.node_index);

    match row.status {
        NodeStatus::Failure => {
            let red = Style::default().fg(Color::Red);
            Row::new(vec![
                Cell::from(row.provider.clone()),
                Cell::from(node),
                Cell::from("FAILURE").style(red),
                Cell::from("NA").style(red),
                Cell::from("NA").style(red),
            ])
        }
        NodeStatus::Success => Row::new(vec![
            Cell::from(row.provider.clone()),
            Cell::from(node),
            Cell::from("SUCCESS").style(Style::default().fg(Color::Green)),
            Cell::from(row.height.to_string()).style(Style::default().fg(tier_color(row.tier))),
            Cell::from(format!("{:.3} ms", row.latency_ms)),
        ]),
    }
}

fn tier_color(tier: Option<StalenessTier>) -> Color {
    match tier {
        Some(StalenessTier::Current) => Color::Green,
        Some(StalenessTier::Lagging) => Color::Yellow,
        Some(StalenessTier::Stale) | None => Color::Red,
    }
}
