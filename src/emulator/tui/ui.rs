use ratatui::{prelude::*, widgets::*};

use crate::{
    emulator::memory::{MEMORY_SIZE, REGISTER_COUNT},
    hexdump::format_output,
};

use super::app::{clamp_u16, App, AppWidget, StateValue};

const MEMORY_STRIDE: usize = 16;

fn style_state_text<T: PartialEq>(state: &StateValue<T>) -> Style {
    if state.has_changed() {
        Style::default().light_yellow().bold()
    } else {
        Style::default()
    }
}

fn panel<'a>(title: impl Into<Line<'a>>, selected: bool) -> Block<'a> {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Yellow));
    if selected {
        block.border_style(Style::default().bold())
    } else {
        block.border_style(Style::default().dim())
    }
}

/// Keeps `cursor` within a window of `height` rows starting at `scroll`.
///
/// Rows past `u16::MAX` can't be scrolled to and pin the window at the end.
fn follow(scroll: u16, cursor: usize, height: u16) -> u16 {
    let cursor = clamp_u16(cursor);
    let height = height.max(1);
    if cursor < scroll {
        cursor
    } else if u32::from(cursor) >= u32::from(scroll) + u32::from(height) {
        cursor - (height - 1)
    } else {
        scroll
    }
}

fn source_view(app: &mut App, area: Rect) -> Paragraph<'_> {
    // Borders take two rows
    app.source_scroll = follow(app.source_scroll, app.cursor, area.height.saturating_sub(2));

    let session = app.session();
    let current = session.current_line();
    let error_line = app.compile_error().map(|err| err.line());
    let selected = app.selected_widget == AppWidget::Source;

    let mut lines: Vec<Line<'_>> = vec![];
    for (index, text) in app.source().iter().enumerate() {
        let marker = if current == Some(index) { ">" } else { " " };
        let breakpoint = if session.breakpoints().contains(index) { "●" } else { " " };
        let misprint = if app.misprints().contains(&index) { "!" } else { " " };

        let mut style = Style::default();
        if error_line == Some(index) {
            style = style.light_red();
        } else if current == Some(index) {
            style = style.light_yellow().bold();
        }
        if selected && app.cursor == index {
            style = style.reversed();
        }

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(breakpoint, Style::default().light_red()),
            Span::styled(misprint, Style::default().light_magenta()),
            Span::styled(format!("{:>4} ", index + 1), Style::default().dim()),
            Span::styled(text.as_str(), style),
        ]));
    }

    Paragraph::new(lines)
        .scroll((app.source_scroll, 0))
        .block(panel("Source", selected))
}

fn registers(app: &mut App) -> Paragraph<'_> {
    let state = app.state();
    let mut text: Vec<Line<'_>> = (0..REGISTER_COUNT)
        .map(|index| {
            let value = &state.registers[index];
            Line::from(vec![
                Span::raw(format!("r{}:  0x", index)),
                Span::styled(format!("{:02x}", value.get()), style_state_text(value)),
                Span::styled(format!(" {:>3}", value.get()), style_state_text(value)),
            ])
        })
        .collect();

    let line = match app.session().current_line() {
        Some(line) => (line + 1).to_string(),
        None => "-".to_string(),
    };
    text.push(Line::raw(""));
    text.push(
        vec![
            Span::raw("IP:    "),
            Span::styled(state.ip.get().to_string(), style_state_text(&state.ip)),
        ]
        .into(),
    );
    text.push(Line::raw(format!("Line:  {}", line)));
    text.push(Line::raw(format!("State: {:?}", app.session().state())));

    Paragraph::new(text)
        .block(panel("Registers", false))
        .alignment(Alignment::Left)
}

fn clocks(app: &mut App) -> Paragraph<'_> {
    let state = app.state();
    Paragraph::new(Line::styled(
        state.execution_time.get().to_string(),
        style_state_text(&state.execution_time),
    ))
    .block(panel("Clocks", false))
}

fn memory_view(app: &App) -> Paragraph<'_> {
    let memory = app.session().engine().memory();
    let written = app.written_memory();

    let mut lines: Vec<Line<'_>> = vec![];
    for row in (0..MEMORY_SIZE).step_by(MEMORY_STRIDE) {
        let mut spans = vec![Span::styled(format!("{:02x}:", row), Style::default().dim())];
        for (offset, value) in memory[row..row + MEMORY_STRIDE].iter().enumerate() {
            let style = if written.contains(&(row + offset)) {
                Style::default().light_yellow().bold()
            } else {
                Style::default()
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("{:02x}", value), style));
        }
        lines.push(spans.into());
    }

    Paragraph::new(lines)
        .scroll((app.memory_scroll, 0))
        .block(panel("Memory", app.selected_widget == AppWidget::Memory))
}

fn output_view(app: &App) -> Paragraph<'_> {
    let lines: Vec<Line<'_>> = app
        .output()
        .iter()
        .map(|value| Line::raw(format_output(*value)))
        .collect();

    Paragraph::new(lines)
        .scroll((app.output_scroll, 0))
        .block(panel(
            format!("Output ({})", app.output_count()),
            app.selected_widget == AppWidget::Output,
        ))
}

fn top_bar() -> Paragraph<'static> {
    Paragraph::new(vec!["RISC-8 Emulator".into()])
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center)
}

fn bottom_bar(app: &App) -> Paragraph<'_> {
    let status = if app.is_running() {
        format!("{} ...", app.status())
    } else {
        app.status().to_string()
    };
    Paragraph::new(vec![
        Line::styled(status, Style::default().bold()),
        "`s` step, `c` run/stop, `r` reset, `b` breakpoint at cursor".into(),
        "Arrows and PageUp/PageDown scroll, Left/Right change panel, `q` quits".into(),
    ])
    .style(Style::default().fg(Color::Yellow).dim())
    .alignment(Alignment::Left)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Max(1), // Top bar
            Constraint::Min(1), // App layout
            Constraint::Max(3), // Bottom bar
        ])
        .split(frame.size());

    // Address column plus sixteen cells and borders
    const MEMORY_LAYOUT_W: u16 = 3 + 3 * MEMORY_STRIDE as u16 + 2;
    const REGISTER_LAYOUT_W: u16 = 18;
    let app_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(20),                // Source
            Constraint::Max(REGISTER_LAYOUT_W), // Registers and clocks
            Constraint::Max(MEMORY_LAYOUT_W),   // Memory and output
        ])
        .split(main_layout[1]);

    let machine_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(14), Constraint::Max(3)])
        .split(app_layout[1]);

    let memory_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Max(MEMORY_SIZE as u16 / MEMORY_STRIDE as u16 + 2),
            Constraint::Min(3),
        ])
        .split(app_layout[2]);

    frame.render_widget(top_bar(), main_layout[0]);
    frame.render_widget(source_view(app, app_layout[0]), app_layout[0]);
    frame.render_widget(registers(app), machine_layout[0]);
    frame.render_widget(clocks(app), machine_layout[1]);
    frame.render_widget(memory_view(app), memory_layout[0]);
    frame.render_widget(output_view(app), memory_layout[1]);
    frame.render_widget(bottom_bar(app), main_layout[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_cursor() {
        assert_eq!(follow(0, 3, 10), 0);
        assert_eq!(follow(0, 12, 10), 3);
        assert_eq!(follow(5, 2, 10), 2);
        assert_eq!(follow(0, 0, 0), 0);
        assert_eq!(follow(u16::MAX - 2, usize::from(u16::MAX), 10), u16::MAX - 2);
        assert_eq!(follow(0, 100_000, 10), u16::MAX - 9);
        assert_eq!(follow(u16::MAX, 100_000, 1), u16::MAX);
    }
}
