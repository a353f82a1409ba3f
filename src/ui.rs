use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{app::App, clock::Clock, feedback::Signal, session::CharState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = &self.engine;
        let session = engine.session();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = bold_style.fg(Color::Green);
        let red_bold_style = bold_style.fg(Color::Red);
        let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
        let cursor_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let prompt_width = session.target_text().width();
        let prompt_lines = if prompt_width <= max_chars_per_line as usize {
            1
        } else {
            (prompt_width as f64 / max_chars_per_line as f64).ceil() as u16 + 1
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),            // header
                Constraint::Min(0),               // padding
                Constraint::Length(prompt_lines), // phrase
                Constraint::Length(1),            // padding
                Constraint::Length(1),            // stats
                Constraint::Length(3),            // input box
                Constraint::Length(1),            // message
                Constraint::Min(0),               // padding
                Constraint::Length(1),            // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            format!(
                "typequote · {} · {} done",
                engine.pool().name(),
                self.completed_sessions()
            ),
            dim_bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let cursor = (!session.completed()).then(|| session.typed_index());
        let spans = session
            .char_states()
            .enumerate()
            .map(|(idx, (c, state))| {
                let style = match state {
                    CharState::Correct => green_bold_style,
                    CharState::Incorrect => red_bold_style,
                    CharState::Pending if Some(idx) == cursor => cursor_style,
                    CharState::Pending => dim_bold_style,
                };
                let shown = match (state, c) {
                    (CharState::Incorrect, ' ') => '·',
                    _ => c,
                };
                Span::styled(shown.to_string(), style)
            })
            .collect::<Vec<Span>>();

        Paragraph::new(Line::from(spans))
            .alignment(if prompt_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            format!("{}   {}s", engine.score(), engine.elapsed_secs()),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        let input = engine.input();
        let border_style = match self.flash() {
            Some(Signal::Success) => Style::default().fg(Color::Green),
            Some(Signal::Error) => Style::default().fg(Color::Red),
            None => Style::default(),
        };
        let (title, text_style) = match (input.is_enabled(), self.restart_countdown()) {
            (true, _) => (" type here ".to_string(), Style::default()),
            (false, Some(secs)) => (format!(" next phrase in {secs}s "), dim_bold_style),
            (false, None) => (" (tab) for the next phrase ".to_string(), dim_bold_style),
        };
        let inner_width = chunks[5].width.saturating_sub(2) as usize;
        Paragraph::new(Span::styled(
            fit_tail(input.value(), inner_width).to_string(),
            text_style,
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .render(chunks[5], buf);

        if let Some(message) = self.message.text() {
            Paragraph::new(Span::styled(
                message.to_string(),
                italic_style.fg(Color::Cyan),
            ))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
        }

        Paragraph::new(Span::styled(
            "(tab) restart / (esc) quit",
            italic_style,
        ))
        .render(chunks[8], buf);
    }
}

/// Longest suffix of `text` that fits in `max_width` terminal columns, so the
/// input box always shows what was typed last.
pub fn fit_tail(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (idx, c) in text.char_indices().rev() {
        width += c.width().unwrap_or(0);
        if width > max_width {
            return &text[idx + c.len_utf8()..];
        }
    }
    text
}
