use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::auth::{CredentialForm, Field};
use crate::ui::{bold, centered_rect, dim, hint, screen::Screen};

const FORM_WIDTH: u16 = 60;
const FORM_HEIGHT: u16 = 14;

pub struct SignInScreen<'a> {
    pub form: &'a CredentialForm,
}

impl SignInScreen<'_> {
    fn field_line(&self, label: &'static str, value: String, field: Field) -> Line<'static> {
        let focused = self.form.focus == field;
        let label_style = if focused {
            bold().fg(Color::Cyan)
        } else {
            dim()
        };

        let mut spans = vec![
            Span::styled(format!("{label:>9}: "), label_style),
            Span::raw(value),
        ];
        if focused {
            spans.push(Span::styled(
                "_",
                Style::default().add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        Line::from(spans)
    }
}

impl Screen for SignInScreen<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let form = self.form;
        let area = centered_rect(FORM_WIDTH, FORM_HEIGHT, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(" TypeSpeed ", bold()))
            .title_alignment(Alignment::Center);

        let other_flow = form.flow.toggled().to_string().to_lowercase();
        let mut lines = vec![
            Line::from(Span::styled(
                "Sign in to start testing your typing speed",
                Style::default().fg(Color::Gray),
            ))
            .alignment(Alignment::Center),
            Line::default(),
            self.field_line("Email", form.email.clone(), Field::Email),
            self.field_line("Password", form.masked_password(), Field::Password),
            Line::default(),
        ];

        if let Some(error) = &form.error {
            lines.push(
                Line::from(Span::styled(error.clone(), bold().fg(Color::Red)))
                    .alignment(Alignment::Center),
            );
        }
        lines.push(Line::default());
        lines.push(
            Line::from(Span::styled(format!("(enter) {}", form.flow), bold()))
                .alignment(Alignment::Center),
        );
        lines.push(
            Line::from(Span::styled(
                format!("(tab) switch field  (F4) {other_flow} instead  (F3) continue as guest  (esc) quit"),
                hint(),
            ))
            .alignment(Alignment::Center),
        );

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_form(form: &CredentialForm) -> String {
        let area = Rect::new(0, 0, 70, 16);
        let mut buf = Buffer::empty(area);
        SignInScreen { form }.render(area, &mut buf);
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_password_is_masked() {
        let form = CredentialForm {
            email: "me@example.com".into(),
            password: "hunter22".into(),
            ..CredentialForm::default()
        };
        let content = render_form(&form);

        assert!(content.contains("me@example.com"));
        assert!(!content.contains("hunter22"));
        assert!(content.contains("••••••••"));
    }

    #[test]
    fn test_error_and_flow_are_shown() {
        let mut form = CredentialForm::default();
        form.toggle_flow();
        form.error = Some("invalid email or password".into());
        let content = render_form(&form);

        assert!(content.contains("invalid email or password"));
        assert!(content.contains("(enter) Sign up"));
        assert!(content.contains("sign in instead"));
    }
}
