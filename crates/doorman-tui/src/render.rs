//! Rendering for the login form.
//!
//! Pure function of `AppState`: nothing here mutates state.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::common::{mask_secret, truncate_start_with_ellipsis, truncate_with_ellipsis};
use crate::state::{AppState, Focus};

const CARD_WIDTH: u16 = 52;
const CARD_HEIGHT: u16 = 16;
const ACCENT: Color = Color::Cyan;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Keyboard hint shown in the card footer.
struct InputHint<'a> {
    key: &'a str,
    action: &'a str,
}

impl<'a> InputHint<'a> {
    fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

pub fn render(state: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let card = centered_area(area, CARD_WIDTH, CARD_HEIGHT);
    render_container(frame, card, "Login", ACCENT);

    let inner = Rect::new(
        card.x + 2,
        card.y + 1,
        card.width.saturating_sub(4),
        card.height.saturating_sub(2),
    );
    let row = |offset: u16| {
        Rect::new(inner.x, inner.y.saturating_add(offset), inner.width, 1).intersection(inner)
    };

    render_label(frame, row(1), "Username", state.focus == Focus::Username);
    render_input(
        frame,
        row(2),
        &state.form.username,
        "Enter your username",
        state.focus == Focus::Username,
    );

    render_password_label(frame, row(4), state);
    let shown_password = if state.form.is_password_visible() {
        state.form.password.clone()
    } else {
        mask_secret(&state.form.password)
    };
    render_input(
        frame,
        row(5),
        &shown_password,
        "Enter your password",
        state.focus == Focus::Password,
    );

    if let Some(error) = state.form.error() {
        let error = truncate_with_ellipsis(error, inner.width as usize);
        frame.render_widget(
            Paragraph::new(Span::styled(error, Style::default().fg(Color::Red))),
            row(7),
        );
    }

    render_submit(frame, row(9), state);
    render_register_link(frame, row(11), state.focus == Focus::Register);

    render_hints(
        frame,
        row(inner.height.saturating_sub(1)),
        &[
            InputHint::new("Tab", "next"),
            InputHint::new("Enter", "submit"),
            InputHint::new("Ctrl+V", "show"),
            InputHint::new("Esc", "quit"),
        ],
        ACCENT,
    );

    render_endpoint(frame, area, card, &state.endpoint);
}

/// Centers a `width` x `height` box inside `area`, shrinking it to fit.
fn centered_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Clears the background and draws the bordered, titled card.
fn render_container(frame: &mut Frame, area: Rect, title: &str, border_color: Color) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);
}

fn label_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn render_label(frame: &mut Frame, area: Rect, label: &str, focused: bool) {
    frame.render_widget(
        Paragraph::new(Span::styled(label, label_style(focused))),
        area,
    );
}

fn render_password_label(frame: &mut Frame, area: Rect, state: &AppState) {
    render_label(frame, area, "Password", state.focus == Focus::Password);

    let toggle = if state.form.is_password_visible() {
        "Hide"
    } else {
        "Show"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(toggle, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Right),
        area,
    );
}

/// Prompt-style input line: "> <text>█". The cursor only shows when focused.
fn render_input(frame: &mut Frame, area: Rect, value: &str, placeholder: &str, focused: bool) {
    let prompt = "> ";
    let max_text_width = (area.width as usize).saturating_sub(prompt.len() + 1);
    let prompt_color = if focused { ACCENT } else { Color::DarkGray };

    let mut spans = vec![Span::styled(prompt, Style::default().fg(prompt_color))];
    if value.is_empty() {
        if focused {
            spans.push(Span::styled("█", Style::default().fg(ACCENT)));
        }
        spans.push(Span::styled(
            truncate_with_ellipsis(placeholder, max_text_width),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(truncate_start_with_ellipsis(value, max_text_width)));
        if focused {
            spans.push(Span::styled("█", Style::default().fg(ACCENT)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_submit(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = if state.form.is_loading() {
        let spinner = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
        Line::from(vec![
            Span::styled(spinner, Style::default().fg(ACCENT)),
            Span::styled(" Logging in...", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        let style = if state.focus == Focus::Submit {
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        };
        Line::from(Span::styled("[ Login ]", style))
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_register_link(frame: &mut Frame, area: Rect, focused: bool) {
    let mut link_style = Style::default().fg(ACCENT).add_modifier(Modifier::UNDERLINED);
    if focused {
        link_style = link_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    let line = Line::from(vec![
        Span::styled("Don't have an account? ", Style::default().fg(Color::DarkGray)),
        Span::styled("Create an account", link_style),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint<'_>], highlight_color: Color) {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(highlight_color)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// Endpoint line just below the card, when there is room for it.
fn render_endpoint(frame: &mut Frame, area: Rect, card: Rect, endpoint: &str) {
    let y = card.y + card.height;
    if endpoint.is_empty() || y >= area.y + area.height {
        return;
    }
    let text = truncate_with_ellipsis(endpoint, card.width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        Rect::new(card.x, y, card.width, 1),
    );
}
