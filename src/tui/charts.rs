use crate::view::{Dashboard, ForecastView, RadarView, RiskClass, FORECAST_Y_BOUNDS, RADAR_MAX};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::canvas::{Canvas, Line as CanvasLine, Points},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

/// Padding around the radar's outer ring, in data units, to leave room for axis labels.
const RADAR_LABEL_MARGIN: f64 = 40.0;
const RADAR_RINGS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

/// Helper function to draw a line on a canvas
pub fn draw_line(
    ctx: &mut ratatui::widgets::canvas::Context,
    from: (f64, f64),
    to: (f64, f64),
    color: Color,
) {
    ctx.draw(&CanvasLine {
        x1: from.0,
        y1: from.1,
        x2: to.0,
        y2: to.1,
        color,
    });
}

pub fn risk_color(class: RiskClass) -> Color {
    match class {
        RiskClass::Critical => Color::LightRed,
        RiskClass::Moderate => Color::Green,
    }
}

/// Three metric cards plus the risk card, side by side.
pub fn draw_kpi_cards(f: &mut Frame, area: Rect, d: &Dashboard) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4].as_ref())
        .split(area);

    let accents = [Color::LightRed, Color::Cyan, Color::LightBlue];
    for ((card, accent), col) in d.cards.iter().zip(accents).zip(cols.iter()) {
        let p = Paragraph::new(vec![
            Line::from(Span::styled(
                card.value.clone(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                card.caption.clone(),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(card.label));
        f.render_widget(p, *col);
    }

    let color = risk_color(d.risk.class);
    let risk = Paragraph::new(vec![
        Line::from(Span::styled(
            d.risk.text.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            d.risk.class.label(),
            Style::default().fg(color),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title("Total Migration Risk"),
    );
    f.render_widget(risk, cols[3]);
}

/// Forecast line with a marker on every point. An empty series still draws the axes.
pub fn draw_forecast(f: &mut Frame, area: Rect, view: &ForecastView, title: &str) {
    let curve = Dataset::default()
        .graph_type(GraphType::Line)
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(Color::Cyan))
        .data(&view.points);
    let dots = Dataset::default()
        .graph_type(GraphType::Scatter)
        .marker(symbols::Marker::Dot)
        .style(Style::default().fg(Color::White))
        .data(&view.points);

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds(view.x_bounds)
        .labels(
            view.x_labels
                .iter()
                .map(|l| Span::raw(l.clone()))
                .collect::<Vec<_>>(),
        );
    let y_axis = Axis::default()
        .title("risk")
        .style(Style::default().fg(Color::Gray))
        .bounds(FORECAST_Y_BOUNDS)
        .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]);

    let chart = Chart::new(vec![curve, dots])
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(x_axis)
        .y_axis(y_axis);
    f.render_widget(chart, area);
}

/// Radar with a fixed [0, 100] radius: grid rings, one spoke per axis, the data polygon, and
/// axis labels just outside the outer ring.
pub fn draw_radar(f: &mut Frame, area: Rect, view: &RadarView, title: &str) {
    let block = Block::default().borders(Borders::ALL).title(title);
    if view.axes.is_empty() {
        let empty = Paragraph::new("No risk factors reported.").block(block);
        f.render_widget(empty, area);
        return;
    }

    let extent = RADAR_MAX + RADAR_LABEL_MARGIN;
    let inner_width = area.width.saturating_sub(2).max(1) as f64;
    // data units per terminal cell, used to right-align labels on the left half
    let cell_w = 2.0 * extent / inner_width;
    let n = view.axes.len();

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([-extent, extent])
        .y_bounds([-extent, extent])
        .paint(move |ctx| {
            for ring in RADAR_RINGS {
                for i in 0..n {
                    let a = view.axes[i].tip;
                    let b = view.axes[(i + 1) % n].tip;
                    draw_line(
                        ctx,
                        (a.0 * ring, a.1 * ring),
                        (b.0 * ring, b.1 * ring),
                        Color::DarkGray,
                    );
                }
            }
            for axis in &view.axes {
                draw_line(ctx, (0.0, 0.0), axis.tip, Color::DarkGray);
            }
            ctx.layer();

            for i in 0..n {
                draw_line(
                    ctx,
                    view.axes[i].vertex,
                    view.axes[(i + 1) % n].vertex,
                    Color::LightRed,
                );
            }
            let vertices: Vec<(f64, f64)> = view.axes.iter().map(|a| a.vertex).collect();
            ctx.draw(&Points {
                coords: &vertices,
                color: Color::Red,
            });
            ctx.layer();

            for axis in &view.axes {
                let (tx, ty) = axis.tip;
                let mut x = tx * 1.08;
                let y = ty * 1.12;
                if tx < -1e-6 {
                    x -= axis.label.chars().count() as f64 * cell_w;
                } else if tx.abs() <= 1e-6 {
                    x -= axis.label.chars().count() as f64 * cell_w / 2.0;
                }
                ctx.print(
                    x,
                    y,
                    Line::from(Span::styled(
                        axis.label.clone(),
                        Style::default().fg(Color::Gray),
                    )),
                );
            }
        });
    f.render_widget(canvas, area);
}
