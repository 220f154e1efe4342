use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::App;
use multidrill::{view::ViewState, FeedbackKind, Screen};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    let view = app.controller.presenter();
    match view.screen {
        Screen::Startup => render_startup(f),
        Screen::LevelSelect => render_level_select(app, f),
        Screen::Playing => {
            render_playing(app, view, f);
            if view.options_open {
                render_options(app, f);
            }
        }
    }
}

fn render_startup(f: &mut Frame) {
    let area = f.area();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "Multiplication Drill",
        bold_style.fg(Color::Cyan),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let hint = Paragraph::new(Span::styled(
        "(enter) start  (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    f.render_widget(hint, chunks[2]);
}

/// Digit keys that pick a level; only 1-9 are reachable from the keyboard.
fn level_keys(app: &App) -> String {
    match app.controller.config().level_count().min(9) {
        0 | 1 => "(1)".to_string(),
        n => format!("(1-{n})"),
    }
}

fn level_lines(app: &App) -> Vec<Line<'static>> {
    app.controller
        .config()
        .levels
        .iter()
        .enumerate()
        .map(|(idx, level)| {
            let text = format!("{}. {}", idx + 1, level.description);
            if idx == app.level_cursor {
                Line::from(Span::styled(
                    format!("> {text}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::raw(format!("  {text}")))
            }
        })
        .collect()
}

fn render_level_select(app: &App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new("Choose a level")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let levels = Paragraph::new(level_lines(app))
        .block(Block::default().borders(Borders::ALL).title("Levels"));
    f.render_widget(levels, chunks[1]);

    let instructions = Paragraph::new(format!(
        "{} or ↑/↓ + (enter) select | (esc)ape",
        level_keys(app)
    ))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

fn feedback_style(kind: FeedbackKind) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    match kind {
        FeedbackKind::Correct => bold_style.fg(Color::Green),
        FeedbackKind::Incorrect | FeedbackKind::Timeout => bold_style.fg(Color::Red),
        FeedbackKind::Info => Style::default().fg(Color::Yellow),
        FeedbackKind::None => Style::default(),
    }
}

fn render_playing(app: &App, view: &ViewState, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // scores
            Constraint::Min(1),    // spacer
            Constraint::Length(1), // problem
            Constraint::Length(3), // answer
            Constraint::Length(1), // feedback
            Constraint::Length(3), // timer
            Constraint::Min(1),    // spacer
            Constraint::Length(1), // help
        ])
        .split(area);

    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let scores = Paragraph::new(Line::from(vec![
        Span::styled(format!("Streak: {}", view.streak), Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(
            format!("Record ({}): {}", view.best_label, view.best_streak),
            Style::default().fg(Color::Magenta),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(scores, chunks[0]);

    if let Some((a, b)) = view.problem {
        let problem = Paragraph::new(Span::styled(
            format!("{a} x {b} = ?"),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        f.render_widget(problem, chunks[2]);
    }

    let answer_style = match (view.input_enabled, view.feedback) {
        (false, FeedbackKind::Correct) => Style::default().fg(Color::Green),
        (false, FeedbackKind::Incorrect | FeedbackKind::Timeout) => Style::default().fg(Color::Red),
        (false, _) => dim_style,
        (true, _) => Style::default(),
    };
    let cursor = if view.input_enabled { "_" } else { "" };
    let answer = Paragraph::new(format!("{}{}", view.answer.as_str(), cursor))
        .block(Block::default().borders(Borders::ALL).title("Answer"))
        .style(answer_style)
        .alignment(Alignment::Center);
    f.render_widget(answer, centered_columns(24, chunks[3]));

    let feedback = Paragraph::new(Span::styled(
        view.feedback_text.clone(),
        feedback_style(view.feedback),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(feedback, chunks[4]);

    let timer_color = if view.timer_progress > 0.5 {
        Color::Green
    } else if view.timer_progress > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    };
    let remaining = app.controller.timer().seconds_remaining();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Time"))
        .gauge_style(Style::default().fg(timer_color))
        .ratio(view.timer_progress.clamp(0.0, 1.0))
        .label(format!("{remaining}s"));
    f.render_widget(gauge, chunks[5]);

    let help = Paragraph::new(Span::styled(
        "(0-9) answer (enter) submit (tab) level (esc)ape",
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[7]);
}

fn render_options(app: &App, f: &mut Frame) {
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Paused",
            Style::default().add_modifier(Modifier::BOLD | Modifier::DIM),
        )),
        Line::from(""),
    ];
    lines.extend(level_lines(app));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("{} change level (esc) resume", level_keys(app)),
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    )));

    let dialog = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Level"))
        .wrap(Wrap { trim: false });
    f.render_widget(dialog, area);
}

fn centered_columns(width: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
