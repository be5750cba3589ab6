use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};

use crate::app::{App, FocusPane, InputMode, Sender};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, footer
    let [header_area, transcript_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Career Guide Chat ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!(" {} ", app.client.base_url()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn sender_label(sender: Sender) -> Span<'static> {
    match sender {
        Sender::User => Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Sender::Bot => Span::styled(
            "Bot:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Sender::Error => Span::styled(
            "Error:",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    }
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Transcript;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Transcript ");

    // Store pane dimensions for scroll and wrap calculations
    let inner_area = block.inner(area);
    app.transcript_height = inner_area.height;
    app.transcript_width = inner_area.width;

    let pending = app.pending_exchanges();

    let text = if app.transcript.is_empty() && pending == 0 {
        Text::from(Span::styled(
            "Ask about careers or skills...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.transcript {
            lines.push(Line::from(sender_label(msg.sender)));
            // Remote text goes through structured spans only; it is never
            // interpreted as markup
            for line in msg.text.lines() {
                lines.push(Line::from(Span::raw(line)));
            }
            if msg.text.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::default());
        }

        if pending > 0 {
            lines.push(Line::from(sender_label(Sender::Bot)));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            let waiting = if pending > 1 {
                format!("Thinking{} ({} pending)", dots, pending)
            } else {
                format!("Thinking{}", dots)
            };
            lines.push(Line::from(Span::styled(
                waiting,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let total_lines = app.transcript_line_count();

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(paragraph, area);

    if total_lines > app.transcript_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state =
            ScrollbarState::new(total_lines as usize).position(app.transcript_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .title(" Message ");

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((area.x + app.cursor as u16 + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(" CHAT ", mode_style), Span::raw(" ")];
    match app.input_mode {
        InputMode::Editing => hints.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" transcript ", label_style),
            Span::styled(" Ctrl-C ", key_style),
            Span::styled(" quit ", label_style),
        ]),
        InputMode::Normal => hints.extend(vec![
            Span::styled(" i ", key_style),
            Span::styled(" compose ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/bottom ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]),
    }

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}
