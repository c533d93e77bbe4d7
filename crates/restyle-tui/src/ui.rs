use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{format_size, App, InputMode};
use restyle_core::present::{present, View, PLACEHOLDER_MESSAGE};
use restyle_core::{GenerationResult, StagedImage};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [left_area, right_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(55),
    ])
    .areas(body_area);

    let [staged_area, prompt_area, trigger_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(left_area);

    let presentation = present(&app.workflow);

    render_staged(presentation.staged, frame, staged_area);
    render_prompt(app, frame, prompt_area);
    render_trigger(presentation.trigger_enabled, frame, trigger_area);

    match presentation.main {
        View::Loading => render_loading(app, frame, right_area),
        View::Result(result) => render_result(app, result, frame, right_area),
        View::Placeholder => render_placeholder(frame, right_area),
    }

    render_footer(app, frame, footer_area);

    // Popups: the banner sits above everything, including the dialog
    if app.show_file_dialog {
        render_file_dialog(app, frame, area);
    }
    if let Some(message) = presentation.banner {
        render_error_banner(message, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" restyle ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_staged(staged: Option<&StagedImage>, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Image ");

    let lines = match staged {
        Some(staged) => vec![
            detail_line("File", &staged.file.name),
            detail_line("Type", &staged.file.media_type),
            detail_line("Size", &format_size(staged.size())),
            detail_line("Dimensions", &format_dimensions(staged.dimensions)),
            detail_line("Preview", staged.preview().uri()),
            Line::default(),
            Line::from(Span::styled(
                staged.file.path.display().to_string(),
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => vec![
            Line::from("No image selected."),
            Line::default(),
            Line::from(Span::styled(
                "Press o to browse, or drag an image file onto this window.",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing && !app.show_file_dialog;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Prompt ");

    let prompt = app.workflow.prompt();
    let text = if prompt.is_empty() && !editing {
        Span::styled("Describe the style, e.g. ghibli style", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(prompt.to_string())
    };

    let inner = block.inner(area);
    let offset = if editing {
        scroll_offset(app.prompt_cursor, inner.width)
    } else {
        0
    };
    let paragraph = Paragraph::new(Line::from(text))
        .block(block)
        .scroll((0, offset));
    frame.render_widget(paragraph, area);

    if editing {
        let cursor_x = (app.prompt_cursor - offset as usize) as u16;
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

fn render_trigger(enabled: bool, frame: &mut Frame, area: Rect) {
    let style = if enabled {
        Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::Gray)
    };

    let button = Paragraph::new(Line::from(Span::styled(" Generate ", style)).centered())
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, area);
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Result ");

    let dots = ".".repeat(app.animation_frame as usize + 1);
    let text = Paragraph::new(Line::from(Span::styled(
        format!("Generating{}", dots),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
    )))
    .block(block);
    frame.render_widget(text, area);
}

fn render_result(app: &App, result: &GenerationResult, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Result ");

    let mut lines = vec![
        detail_line("Image", result.uri()),
        detail_line("Type", result.image().media_type()),
        detail_line("Size", &format_size(result.size())),
        detail_line("Dimensions", &format_dimensions(result.dimensions)),
        detail_line("Prompt", &result.prompt),
        Line::default(),
    ];

    match &app.notice {
        Some(notice) => lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        ))),
        None => lines.push(Line::from(Span::styled(
            format!("Press s to save into {}", app.config.output_dir().display()),
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_placeholder(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Result ");

    let paragraph = Paragraph::new(PLACEHOLDER_MESSAGE)
        .style(Style::default().fg(Color::DarkGray))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" PROMPT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let hints: Vec<(&str, &str)> = if app.show_file_dialog {
        vec![(" Enter ", " open "), (" Esc ", " cancel ")]
    } else {
        match app.input_mode {
            InputMode::Normal => {
                let mut hints = vec![
                    (" o ", " open "),
                    (" i ", " prompt "),
                    (" g ", " generate "),
                ];
                if app.workflow.result().is_some() {
                    hints.push((" s ", " save "));
                }
                if app.workflow.error().is_some() {
                    hints.push((" Esc ", " dismiss "));
                }
                hints.push((" q ", " quit "));
                hints
            }
            InputMode::Editing if app.workflow.error().is_some() => {
                vec![(" Enter ", " generate "), (" Esc ", " dismiss ")]
            }
            InputMode::Editing => vec![(" Enter ", " generate "), (" Esc ", " done ")],
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style)];
    for (key, label) in hints {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_file_dialog(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 70, 5);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Open Image ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Path to an image file. Enter to open, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let offset = scroll_offset(app.path_cursor, input_area.width);
    let input = Paragraph::new(app.path_input.as_str())
        .style(Style::default().fg(Color::Cyan))
        .scroll((0, offset));
    frame.render_widget(input, input_area);

    let cursor_x = (app.path_cursor - offset as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

fn render_error_banner(message: &str, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 60, 5);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ");

    let text = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red).bold())),
        Line::default(),
        Line::from(Span::styled("Esc to dismiss", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn detail_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<11}", label), Style::default().fg(Color::Cyan)),
        Span::raw(value.to_string()),
    ])
}

fn format_dimensions(dimensions: Option<(u32, u32)>) -> String {
    match dimensions {
        Some((w, h)) => format!("{} × {}", w, h),
        None => "unknown".to_string(),
    }
}

/// Columns to scroll a single-line input so the cursor stays visible
fn scroll_offset(cursor: usize, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let offset = (cursor + 1).saturating_sub(width);
    offset.min(u16::MAX as usize) as u16
}

/// Centered popup of at most `width` x `height`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height);

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}
