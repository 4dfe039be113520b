//! Application state and the terminal event loop
//!
//! One cooperative loop owns all mutation: drain decoded ticks, expire
//! flashes, redraw, then poll the keyboard. Each tick is applied to
//! completion before the next task runs, so the renderer only ever sees rows
//! between whole updates. The feed task is the sole producer of ticks and is
//! shut down when the loop exits, however it exits.

use std::io;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::engine::Reconciler;
use crate::feed::{self, ConnectionStatus, FeedConfig, Tick};
use crate::flash::FlashScheduler;
use crate::snapshot::{self, MarketSnapshot};
use crate::store::EntityStore;
use crate::symbol::SymbolResolver;
use crate::table::{Column, TableView, market_columns, render_market_table};

/// Keyboard poll interval; also bounds how late a flash expiry can land.
const LOOP_POLL: Duration = Duration::from_millis(50);

/// Everything the view reads, mutated only from the event loop.
pub struct MarketState {
    pub store: EntityStore,
    pub resolver: SymbolResolver,
    pub connection: ConnectionStatus,
    pub last_update: DateTime<Utc>,
    engine: Reconciler,
    flash: FlashScheduler,
}

impl MarketState {
    pub fn new(config: &AppConfig, snapshot: Vec<MarketSnapshot>) -> Self {
        Self {
            store: EntityStore::from_snapshot(snapshot),
            resolver: SymbolResolver::new(),
            connection: ConnectionStatus::Disconnected,
            last_update: Utc::now(),
            engine: Reconciler::new(config.reconcile.clone()),
            flash: FlashScheduler::new(config.flash_ttl),
        }
    }

    /// Merge one decoded tick. Unresolvable symbols and rows missing from the
    /// snapshot are silent no-ops; an accepted tick updates the row and
    /// (re)lights its flash in the same pass.
    pub fn apply_tick(&mut self, tick: &Tick, now: Instant) {
        let Some(id) = self.resolver.resolve(&tick.symbol) else {
            return;
        };

        let engine = &self.engine;
        let direction = self
            .store
            .mutate(id, |row| engine.apply(row, tick.price))
            .flatten();

        if let Some(direction) = direction {
            self.flash.trigger(id, direction, now);
            self.store.mutate(id, |row| row.flash = Some(direction));
            self.last_update = Utc::now();
        }
    }

    /// Clear flashes whose expiry window has passed.
    pub fn sweep_flashes(&mut self, now: Instant) {
        for id in self.flash.sweep(now) {
            self.store.mutate(&id, |row| row.flash = None);
        }
    }

    /// Drop all pending flash expiries; the store is about to go away.
    pub fn teardown(&mut self) {
        self.flash.cancel_all();
    }
}

/// Fetch the snapshot, start the feed, and drive the terminal until quit.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, config: AppConfig) -> io::Result<()> {
    let snapshot = match snapshot::fetch_markets(&config).await {
        Ok(coins) => {
            info!("snapshot loaded with {} coins", coins.len());
            coins
        }
        Err(e) => {
            warn!("snapshot fetch failed, rendering empty state: {}", e);
            Vec::new()
        }
    };

    let mut state = MarketState::new(&config, snapshot);
    let columns = market_columns();
    let mut view = TableView::new(config.overscan);

    let feed_config = FeedConfig::new(feed::stream_url(
        &config.ws_base,
        state.resolver.feed_symbols(),
    ));
    let (feed_handle, mut tick_rx, status_rx) = feed::spawn_feed(feed_config);

    loop {
        // Run every queued tick to completion before anything reads the rows
        while let Ok(tick) = tick_rx.try_recv() {
            state.apply_tick(&tick, Instant::now());
        }
        state.connection = *status_rx.borrow();
        state.sweep_flashes(Instant::now());

        terminal.draw(|f| ui(f, &state, &mut view, &columns))?;

        if event::poll(LOOP_POLL)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Up | KeyCode::Char('k') => view.scroll_up(1),
                    KeyCode::Down | KeyCode::Char('j') => view.scroll_down(1, state.store.len()),
                    KeyCode::PageUp => view.page_up(),
                    KeyCode::PageDown => view.page_down(state.store.len()),
                    KeyCode::Home => view.home(),
                    KeyCode::End => view.end(state.store.len()),
                    KeyCode::Left => view.scroll_left(4),
                    KeyCode::Right => view.scroll_right(4, &columns),
                    _ => {}
                }
            }
        }
    }

    feed_handle.shutdown();
    state.teardown();
    Ok(())
}

fn ui(f: &mut Frame, state: &MarketState, view: &mut TableView, columns: &[Column]) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(f.area());
    render_status_bar(f, chunks[0], state);
    render_market_table(f, chunks[1], &state.store, view, columns);
}

fn render_status_bar(f: &mut Frame, area: Rect, state: &MarketState) {
    let (status_symbol, status_text, status_color) = match state.connection {
        ConnectionStatus::Connected => ("●", "CONNECTED", Color::Rgb(0, 255, 127)),
        ConnectionStatus::Reconnecting => ("◌", "RECONNECTING", Color::Rgb(255, 215, 0)),
        ConnectionStatus::Disconnected => ("○", "DISCONNECTED", Color::Rgb(255, 69, 58)),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {} ", status_symbol, status_text),
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " ◆ COINVIEW ◆ ",
            Style::default()
                .fg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" updated {} ", state.last_update.format("%H:%M:%S%.3f")),
            Style::default().fg(Color::Rgb(100, 149, 237)),
        ),
        Span::styled(
            " [↑↓] Scroll  [←→] Columns  [Q] Quit ",
            Style::default().fg(Color::Rgb(128, 128, 150)),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(138, 43, 226)));

    f.render_widget(
        Paragraph::new(line).block(block).alignment(Alignment::Center),
        area,
    );
}
