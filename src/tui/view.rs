use crate::color_utils;
use crate::grid::{self, Cell, MonthGrid};
use crate::model::{Event, Recurrence};
use crate::tui::state::{AppState, InputMode};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, state: &AppState, events: &[Event]) {
    let month = grid::generate(state.cursor, events, state.today, state.week_start);

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(v_chunks[0]);

    draw_month(f, h_chunks[0], state, &month);
    draw_details(f, h_chunks[1], state, &month);
    draw_footer(f, v_chunks[1], state);
}

fn draw_month(f: &mut Frame, area: Rect, state: &AppState, month: &MonthGrid) {
    let title = format!(" < {} > ", month.title());
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let mut rows = vec![Constraint::Length(1)];
    rows.extend(month.weeks.iter().map(|_| Constraint::Min(3)));
    let row_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows)
        .split(inner);

    let columns = [Constraint::Ratio(1, 7); 7];

    // --- Weekday header ---
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns)
        .split(row_chunks[0]);
    for (label, chunk) in grid::weekday_labels(month.week_start())
        .iter()
        .zip(header_chunks.iter())
    {
        let short: String = label.chars().take(3).collect();
        let header = Paragraph::new(short)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(header, *chunk);
    }

    // --- Week rows ---
    for (week, row_area) in month.weeks.iter().zip(row_chunks.iter().skip(1)) {
        let cell_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(columns)
            .split(*row_area);
        for (cell, chunk) in week.days.iter().zip(cell_chunks.iter()) {
            draw_cell(f, *chunk, state, cell);
        }
    }
}

fn draw_cell(f: &mut Frame, area: Rect, state: &AppState, cell: &Cell) {
    let is_cursor = cell.date == state.cursor;
    let border_style = if is_cursor && state.mode == InputMode::Moving {
        Style::default().fg(Color::Magenta)
    } else if is_cursor {
        Style::default().fg(Color::Yellow)
    } else if cell.is_today {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let number_style = if !cell.in_month {
        Style::default().fg(Color::DarkGray)
    } else if cell.is_today {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(cell.date.format("%e").to_string(), number_style));

    let lines: Vec<Line> = cell
        .events
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let selected = is_cursor && i == state.selected_event.min(cell.events.len() - 1);
            event_chip(e, selected, state.moving_id.as_deref() == Some(e.id.as_str()))
        })
        .collect();

    let body = Paragraph::new(lines).block(block);
    f.render_widget(body, area);
}

fn event_chip<'a>(event: &'a Event, selected: bool, moving: bool) -> Line<'a> {
    let mut style = match color_utils::parse_hex(&event.color) {
        Some((r, g, b)) => {
            let fg = if color_utils::is_dark(r, g, b) {
                Color::White
            } else {
                Color::Black
            };
            Style::default().bg(Color::Rgb(r, g, b)).fg(fg)
        }
        None => Style::default(),
    };
    if selected {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if moving {
        style = style.add_modifier(Modifier::DIM);
    }
    let marker = if event.recurrence != Recurrence::None {
        " ↻"
    } else {
        ""
    };
    Line::from(Span::styled(
        format!("{} {}{}", event.time().format("%H:%M"), event.title, marker),
        style,
    ))
}

fn draw_details(f: &mut Frame, area: Rect, state: &AppState, month: &MonthGrid) {
    let day_events: Vec<&Event> = month
        .cell(state.cursor)
        .map(|c| c.events.clone())
        .unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled(
            state.cursor.format("%A %-d %B %Y").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    match state.selected(&day_events) {
        Some(event) => {
            lines.push(Line::from(event.title.as_str()));
            lines.push(Line::from(format!("Time: {}", event.time().format("%H:%M"))));
            lines.push(Line::from(format!("Repeats: {}", event.recurrence)));
            lines.push(Line::from(vec![
                Span::raw("Color: "),
                Span::styled(event.color.as_str(), chip_fg(&event.color)),
            ]));
            lines.push(Line::from(""));
            if event.description.is_empty() {
                lines.push(Line::from("No description."));
            } else {
                lines.push(Line::from(event.description.as_str()));
            }
            if day_events.len() > 1 {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Tab: next of {}", day_events.len()),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        None => lines.push(Line::from("No events.")),
    }

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    f.render_widget(details, area);
}

fn chip_fg(color: &str) -> Style {
    match color_utils::parse_hex(color) {
        Some((r, g, b)) => Style::default().fg(Color::Rgb(r, g, b)),
        None => Style::default(),
    }
}

fn draw_footer(f: &mut Frame, footer_area: Rect, state: &AppState) {
    match state.mode {
        InputMode::Creating | InputMode::Editing | InputMode::EditingDescription => {
            let (title, prefix, color) = match state.mode {
                InputMode::Editing => (" Edit Event ", "> ", Color::Magenta),
                InputMode::EditingDescription => (" Edit Description ", "> ", Color::Blue),
                _ => (" Add Event ", "> ", Color::Yellow),
            };
            let title = format!("{}({}) ", title, state.cursor.format("%Y-%m-%d"));
            let input = Paragraph::new(format!("{}{}", prefix, state.input_buffer))
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(input, footer_area);
            let cursor_x =
                footer_area.x + 1 + prefix.chars().count() as u16 + state.cursor_position as u16;
            let cursor_y = footer_area.y + 1;
            f.set_cursor_position((cursor_x, cursor_y));
        }
        InputMode::Normal | InputMode::ConfirmDelete | InputMode::Moving => {
            let f_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(footer_area);
            let status_color = match state.mode {
                InputMode::ConfirmDelete => Color::Red,
                InputMode::Moving => Color::Magenta,
                _ => Color::Cyan,
            };
            let status = Paragraph::new(state.message.clone())
                .style(Style::default().fg(status_color))
                .block(
                    Block::default()
                        .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                        .title(" Status "),
                );
            let help_text = match state.mode {
                InputMode::Moving => "Arrows:Day | n/p:Month | Enter:Drop | Esc:Cancel",
                InputMode::ConfirmDelete => "y:Delete | any:Cancel",
                _ => "n/p:Month | t:Today | Tab:Event | a:Add | e/E:Edit | m:Move | d:Del | q:Quit",
            };
            let help = Paragraph::new(help_text)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Right)
                .block(
                    Block::default()
                        .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                        .title(" Actions "),
                );
            f.render_widget(status, f_chunks[0]);
            f.render_widget(help, f_chunks[1]);
        }
    }
}
