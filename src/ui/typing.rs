use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::engine::{RenderState, TestState, TEST_DURATION_SECS};
use crate::metrics::{accuracy_badge, verdict, wpm_badge, CharClass};
use crate::ui::{
    bold, centered_rect, dim, hint,
    screen::Screen,
    wrapping::{char_rows, scroll_for_row, time_ratio, wrapped_row},
};

const WELCOME_WIDTH: u16 = 66;
const WELCOME_HEIGHT: u16 = 15;
const STATS_HEIGHT: u16 = 5;
const INPUT_HEIGHT: u16 = 5;
const RESULTS_HEIGHT: u16 = 7;

pub struct WelcomeScreen;

impl Screen for WelcomeScreen {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let area = centered_rect(WELCOME_WIDTH, WELCOME_HEIGHT, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Span::styled("⚡ TypeSpeed", bold().fg(Color::Cyan)))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Span::styled(
            "Experience the ultimate typing test with real-time feedback on your speed and accuracy.",
            Style::default().fg(Color::Gray),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

        let tiles = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(chunks[2]);
        let labels = [
            ("Real-time WPM", Color::Green),
            ("Live Accuracy", Color::Blue),
            ("60s Timer", Color::Magenta),
        ];
        for (tile, (label, color)) in tiles.iter().zip(labels) {
            Paragraph::new(Span::styled(label, Style::default().fg(color)))
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(dim()),
                )
                .render(*tile, buf);
        }

        Paragraph::new(Span::styled(
            "(enter) Start Typing Test →",
            bold().fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        Paragraph::new(Span::styled("(F2) sign out   (q) quit", hint()))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

/// Stats, highlighted text, input area, controls and results for a run
pub struct TestScreen<'a> {
    pub view: RenderState<'a>,
}

impl TestScreen<'_> {
    fn render_stats(&self, area: Rect, buf: &mut Buffer) {
        let view = &self.view;
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        let time_block = card_block("Time Left");
        let time_inner = time_block.inner(cards[0]);
        time_block.render(cards[0], buf);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(time_inner);
        Paragraph::new(Span::styled(format!("{}s", view.remaining_seconds), bold()))
            .alignment(Alignment::Center)
            .render(rows[0], buf);
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue).bg(Color::DarkGray))
            .ratio(time_ratio(view.remaining_seconds, TEST_DURATION_SECS))
            .label("")
            .render(rows[1], buf);

        render_metric_card(
            "Words/Min",
            view.words_per_minute.to_string(),
            wpm_badge(view.words_per_minute),
            Color::Blue,
            cards[1],
            buf,
        );
        render_metric_card(
            "Accuracy",
            format!("{}%", view.accuracy_percent),
            accuracy_badge(view.accuracy_percent),
            Color::Green,
            cards[2],
            buf,
        );
    }

    fn render_text(&self, area: Rect, buf: &mut Buffer) {
        let view = &self.view;
        let block = card_block("Text");
        let inner = block.inner(area);

        let spans = view
            .reference_text
            .chars()
            .zip(&view.classification)
            .map(|(expected, class)| {
                let style = match class {
                    CharClass::Correct => bold().fg(Color::Green),
                    CharClass::Incorrect => bold().fg(Color::White).bg(Color::Red),
                    CharClass::Cursor => bold().fg(Color::White).bg(Color::Blue),
                    CharClass::Pending => dim(),
                };
                Span::styled(expected.to_string(), style)
            });
        let rows = char_rows(view.reference_text, inner.width);
        let lines = into_lines(rows.into_iter().zip(spans));

        let cursor_row = wrapped_row(
            view.reference_text,
            view.typed_text.chars().count(),
            inner.width,
        );
        let scroll = scroll_for_row(cursor_row, inner.height);

        Paragraph::new(lines)
            .block(block)
            .scroll((scroll, 0))
            .render(area, buf);
    }

    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let view = &self.view;
        let block = card_block("Your input");
        let inner = block.inner(area);
        let end_row = wrapped_row(view.typed_text, usize::MAX, inner.width);

        let lines = if view.typed_text.is_empty() {
            let placeholder = if view.state == TestState::Active {
                "Start typing the text above..."
            } else {
                "Test paused"
            };
            vec![Line::from(Span::styled(
                placeholder,
                dim().add_modifier(Modifier::ITALIC),
            ))]
        } else {
            let rows = char_rows(view.typed_text, inner.width);
            let spans = view.typed_text.chars().map(|c| Span::raw(c.to_string()));
            let mut cells: Vec<(usize, Span)> = rows.into_iter().zip(spans).collect();
            if view.state == TestState::Active {
                cells.push((
                    end_row,
                    Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
                ));
            }
            into_lines(cells)
        };

        let scroll = scroll_for_row(end_row, inner.height);
        Paragraph::new(lines)
            .block(block)
            .scroll((scroll, 0))
            .render(area, buf);
    }

    fn render_controls(&self, area: Rect, buf: &mut Buffer) {
        let controls = match self.view.state {
            TestState::Active => "(esc) Pause",
            TestState::Paused => "(enter) Resume   (r) Reset   (F2) sign out   (q) quit",
            TestState::Finished => "(t) Try Again   (r) Reset   (F2) sign out   (q) quit",
            TestState::Welcome => "",
        };
        Paragraph::new(Span::styled(controls, hint()))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let view = &self.view;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(" Test Complete! ", bold()))
            .title_alignment(Alignment::Center);

        let lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("{} WPM", view.words_per_minute),
                    bold().fg(Color::Blue),
                ),
                Span::raw("      "),
                Span::styled(
                    format!("{}%", view.accuracy_percent),
                    bold().fg(Color::Green),
                ),
            ]),
            Line::from(Span::styled("Final Speed     Accuracy", dim())),
            Line::default(),
            Line::from(Span::styled(
                verdict(view.words_per_minute),
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

impl Screen for TestScreen<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let results_height = if self.view.state == TestState::Finished {
            RESULTS_HEIGHT
        } else {
            0
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(STATS_HEIGHT),
                Constraint::Min(4),
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(results_height),
            ])
            .split(area);

        self.render_stats(chunks[0], buf);
        self.render_text(chunks[1], buf);
        self.render_input(chunks[2], buf);
        self.render_controls(chunks[3], buf);
        if results_height > 0 {
            self.render_results(chunks[4], buf);
        }
    }
}

/// Group pre-wrapped cells into one `Line` per row
fn into_lines<'a>(cells: impl IntoIterator<Item = (usize, Span<'a>)>) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::new();
    for (row, span) in cells {
        if lines.len() <= row {
            lines.resize_with(row + 1, Line::default);
        }
        lines[row].spans.push(span);
    }
    lines
}

fn card_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(format!(" {title} "), Style::default().fg(Color::Gray)))
}

fn render_metric_card(
    title: &'static str,
    value: String,
    badge: &'static str,
    color: Color,
    area: Rect,
    buf: &mut Buffer,
) {
    let lines = vec![
        Line::from(Span::styled(value, bold().fg(color))),
        Line::from(Span::styled(badge, Style::default().fg(color))),
    ];
    Paragraph::new(lines)
        .block(card_block(title))
        .alignment(Alignment::Center)
        .render(area, buf);
}
