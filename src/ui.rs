pub mod screen;
pub mod sign_in;
pub mod typing;
pub mod wrapping;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::runtime::{Clock, TickSource};

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 1;
const HORIZONTAL_MARGIN: u16 = 2;

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub(crate) fn hint() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

/// Draw the whole frame: header, the screen for the current state, footer
pub fn draw<T: TickSource, C: Clock>(app: &App<T, C>, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(f.area());

    render_header(app, f, chunks[0]);

    let screen = screen::current_screen(app);
    screen.render(chunks[1], f.buffer_mut());

    let footer = Paragraph::new(Span::styled(
        "Test your typing skills and improve your speed",
        dim(),
    ))
    .alignment(Alignment::Center);
    f.render_widget(footer, chunks[2]);
}

fn render_header<T: TickSource, C: Clock>(app: &App<T, C>, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::BOTTOM);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("⚡ TypeSpeed", bold().fg(Color::Cyan)),
        Span::styled("  Pro Typing Test", dim()),
    ]));
    f.render_widget(title, inner);

    if let Some(identity) = app.auth.identity() {
        let account = Paragraph::new(Line::from(vec![
            Span::raw(identity.label().to_string()),
            Span::styled("  (F2) sign out", hint()),
        ]))
        .alignment(Alignment::Right);
        f.render_widget(account, inner);
    }
}

/// A rectangle of at most `width` x `height` centered in `area`
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
