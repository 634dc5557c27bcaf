use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

/// Centered overlay listing the keybinds.
pub fn draw_help(area: Rect, f: &mut Frame) {
    let width = area.width.min(54);
    let height = area.height.min(14);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("Enter", 8, "Search the typed city"),
        key_line("Backspace", 4, "Delete last character"),
        key_line("Ctrl-U", 7, "Clear the city"),
        key_line("Ctrl-S", 7, "Save the current assessment as JSON"),
        key_line("F1", 11, "Toggle this help"),
        key_line("Esc", 10, "Close help / Quit"),
        key_line("Ctrl-C", 7, "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Risk above 70 is ", Style::default().fg(Color::Gray)),
            Span::styled("CRITICAL", Style::default().fg(Color::LightRed)),
            Span::styled(", otherwise ", Style::default().fg(Color::Gray)),
            Span::styled("MODERATE", Style::default().fg(Color::Green)),
            Span::styled(".", Style::default().fg(Color::Gray)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, popup);
    f.render_widget(p, popup);
}
