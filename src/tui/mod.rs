mod charts;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::engine::RiskApiClient;
use crate::input::InputController;
use crate::model::AppEvent;
use crate::orchestrator::{self, UiCommand};
use crate::view::{self, Dashboard, RenderMode};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// Below this body height the charts are replaced by a text dashboard.
const MIN_CHART_BODY_HEIGHT: u16 = 14;

pub async fn run(args: Cli) -> Result<()> {
    let client = RiskApiClient::new(&build_config(&args))?;

    // Unbounded channels: the UI thread must never block on the orchestrator.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, event_rx, cmd_tx));

    let res = orchestrator::run_controller(client, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    args: Cli,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::new(InputController::new(args.city.clone()), build_config(&args));
    state.export_json = args.export_json.clone();
    if args.submit_on_launch {
        if let Some(cmd) = state.submit() {
            let _ = cmd_tx.send(cmd);
        }
    }
    info!(city = %args.city, submit_on_launch = args.submit_on_launch, "tui started");

    let res = event_loop(&mut terminal, &mut state, &mut event_rx, &cmd_tx);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut UiState,
    event_rx: &mut UnboundedReceiver<AppEvent>,
    cmd_tx: &UnboundedSender<UiCommand>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
            dirty = true;
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            if last_tick.elapsed() >= tick_rate {
                state.spinner_tick = state.spinner_tick.wrapping_add(1);
                last_tick = Instant::now();
            }
            terminal.draw(|f| draw(f.area(), f, state)).ok();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if !event::poll(Duration::from_millis(10)).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            dirty = true;
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        dirty = true;
        let Some(cmd) = state.handle_key(k) else {
            continue;
        };
        let quit = matches!(cmd, UiCommand::Quit);
        if cmd_tx.send(cmd).is_err() && !quit {
            warn!("request controller stopped; leaving ui");
            return Err(anyhow::anyhow!("request controller stopped"));
        }
        if quit {
            return Ok(());
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    draw_header(chunks[0], f, state);
    match view::project(state.machine.state()) {
        RenderMode::Welcome => draw_welcome(chunks[1], f),
        // The busy indicator lives in the input box; the body stays empty.
        RenderMode::Loading => {}
        RenderMode::ErrorBanner => draw_error_banner(chunks[1], f),
        RenderMode::Dashboard(d) => draw_dashboard(chunks[1], f, &d),
    }
    draw_footer(chunks[2], f, state);

    if state.show_help {
        help::draw_help(area, f);
    }
}

fn draw_header(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(24), Constraint::Percentage(60)].as_ref())
        .split(area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let title = Paragraph::new(Line::from(vec![
        Span::styled("Climate", bold),
        Span::styled("Migration", bold.fg(Color::Cyan)),
        Span::styled("AI", bold),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, cols[0]);

    let indicator = if state.machine.is_loading() {
        Span::styled(
            format!(" {} ", state.spinner()),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::styled(" ⏎ search ", Style::default().fg(Color::Gray))
    };
    let query = state.input.query();
    let text = if query.is_empty() {
        Span::styled("Enter city...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(query)
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled("⌖ ", Style::default().fg(Color::Gray)),
        text,
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" City ")
            .title(Line::from(indicator).right_aligned()),
    );
    f.render_widget(input, cols[1]);

    if !state.show_help {
        let box_area = cols[1];
        let typed = query.chars().count() as u16;
        let max_x = box_area.x + box_area.width.saturating_sub(2);
        let x = (box_area.x + 3).saturating_add(typed).min(max_x);
        f.set_cursor_position((x, box_area.y + 1));
    }
}

fn draw_welcome(area: Rect, f: &mut ratatui::Frame) {
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            view::WELCOME_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            view::WELCOME_BODY,
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Type a city and press "),
            Span::styled("Enter", Style::default().fg(Color::Magenta)),
            Span::raw("."),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_error_banner(area: Rect, f: &mut ratatui::Frame) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);
    let red = Style::default().fg(Color::LightRed);
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("⚠ ", red),
        Span::styled(view::ERROR_BANNER, red.add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(red));
    f.render_widget(banner, rows[0]);
}

fn draw_dashboard(area: Rect, f: &mut ratatui::Frame, d: &Dashboard) {
    if area.height < MIN_CHART_BODY_HEIGHT {
        return draw_dashboard_compact(area, f, d);
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)].as_ref())
        .split(area);
    charts::draw_kpi_cards(f, rows[0], d);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)].as_ref())
        .split(rows[1]);
    let forecast_title = match d.city.as_deref() {
        Some(city) => format!("{} · {city}", view::FORECAST_TITLE),
        None => view::FORECAST_TITLE.to_string(),
    };
    charts::draw_forecast(f, cols[0], &d.forecast, &forecast_title);
    charts::draw_radar(f, cols[1], &d.radar, view::RADAR_TITLE);
}

fn draw_dashboard_compact(area: Rect, f: &mut ratatui::Frame, d: &Dashboard) {
    let lines: Vec<Line> = crate::text_summary::dashboard_lines(d)
        .into_iter()
        .map(Line::from)
        .collect();
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Dashboard (enlarge the terminal for charts)"),
    );
    f.render_widget(p, area);
}

fn draw_footer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let key = Style::default().fg(Color::Magenta);
    let mut spans = vec![
        Span::styled("Enter", key),
        Span::raw(" search  "),
        Span::styled("Ctrl-S", key),
        Span::raw(" save  "),
        Span::styled("F1", key),
        Span::raw(" help  "),
        Span::styled("Esc", key),
        Span::raw(" quit"),
    ];
    if !state.info.is_empty() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled("Info: ", Style::default().fg(Color::Gray)));
        spans.push(Span::raw(state.info.clone()));
    }
    let footer =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::fixtures::{mumbai, sample};
    use crate::model::Assessment;
    use ratatui::backend::TestBackend;

    fn ui(query: &str) -> UiState {
        UiState::new(
            InputController::new(query),
            crate::model::ClientConfig {
                base_url: "http://127.0.0.1:8000".into(),
                timeout: Duration::from_secs(10),
                user_agent: "climate-risk-cli/test".into(),
            },
        )
    }

    fn settle(state: &mut UiState, outcome: Result<Assessment, FetchError>) {
        let Some(UiCommand::Fetch(s)) = state.submit() else {
            panic!("submit rejected");
        };
        state.apply_event(AppEvent::Completed {
            generation: s.generation,
            outcome,
        });
    }

    fn render(state: &UiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f.area(), f, state)).unwrap();
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn idle_shows_welcome_only() {
        let screen = render(&ui("Mumbai"), 120, 40);
        assert!(screen.contains(view::WELCOME_TITLE));
        assert!(screen.contains("Mumbai"));
        assert!(screen.contains("⏎ search"));
        assert!(!screen.contains(view::ERROR_BANNER));
        assert!(!screen.contains("Heat Index"));
    }

    #[test]
    fn loading_shows_only_the_busy_indicator() {
        let mut state = ui("Mumbai");
        state.submit();
        let screen = render(&state, 120, 40);
        assert!(screen.contains(state.spinner()));
        assert!(!screen.contains("⏎ search"));
        assert!(!screen.contains(view::WELCOME_TITLE));
        assert!(!screen.contains(view::ERROR_BANNER));
        assert!(!screen.contains("Heat Index"));
    }

    #[test]
    fn mumbai_dashboard_renders_every_card_and_chart() {
        let mut state = ui("Mumbai");
        settle(&mut state, Ok(mumbai()));
        let screen = render(&state, 120, 40);
        for needle in [
            "Heat Index",
            "39°C",
            "71%",
            "14 km/h",
            "Humid",
            "82/100",
            "CRITICAL",
            view::FORECAST_TITLE,
            view::RADAR_TITLE,
            "2025",
            "2026",
        ] {
            assert!(screen.contains(needle), "missing {needle:?}\n{screen}");
        }
        assert!(!screen.contains(view::ERROR_BANNER));
        assert!(!screen.contains(view::WELCOME_TITLE));
    }

    #[test]
    fn not_found_shows_banner_only() {
        let mut state = ui("Nowhereland");
        settle(&mut state, Ok(mumbai()));
        settle(&mut state, Err(FetchError::NotFound("true".into())));
        let screen = render(&state, 120, 40);
        assert!(screen.contains(view::ERROR_BANNER));
        assert!(!screen.contains("Heat Index"));
        assert!(!screen.contains(view::WELCOME_TITLE));
    }

    #[test]
    fn empty_series_render_without_failing() {
        let mut state = ui("Reykjavik");
        settle(&mut state, Ok(sample(70.0)));
        let screen = render(&state, 100, 30);
        assert!(screen.contains("70/100"));
        assert!(screen.contains("MODERATE"));
        assert!(screen.contains(view::FORECAST_TITLE));
        assert!(screen.contains("No risk factors reported."));
    }

    #[test]
    fn small_terminal_falls_back_to_text_dashboard() {
        let mut state = ui("Mumbai");
        settle(&mut state, Ok(mumbai()));
        let screen = render(&state, 80, 18);
        assert!(screen.contains("Total Migration Risk: 82/100 CRITICAL"));
    }

    #[test]
    fn same_response_renders_identically() {
        let mut state = ui("Mumbai");
        settle(&mut state, Ok(mumbai()));
        let first = render(&state, 120, 40);
        settle(&mut state, Ok(mumbai()));
        assert_eq!(render(&state, 120, 40), first);
    }

    #[test]
    fn help_overlay() {
        let mut state = ui("Mumbai");
        state.show_help = true;
        let screen = render(&state, 120, 40);
        assert!(screen.contains("Keybinds:"));
    }
}
