use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::{scorelog::ScoreEntry, App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Playing => render_playing(self, area, buf),
            AppState::Summary => render_summary(self, area, buf),
        }
    }
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let word = app.session.current_word();
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let word_occupied_lines = if word.width() <= max_chars_per_line as usize {
        1
    } else {
        (word.width() as f64 / max_chars_per_line as f64).ceil() as u16
    };

    let top_pad = area.height.saturating_sub(word_occupied_lines + 5) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_pad),
                Constraint::Length(2),
                Constraint::Length(word_occupied_lines),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let timer = Paragraph::new(Span::styled(
        app.session.remaining_ticks().to_string(),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    timer.render(chunks[1], buf);

    let word_widget = Paragraph::new(Span::styled(word.to_string(), bold_style.fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    word_widget.render(chunks[2], buf);

    let score = Paragraph::new(Span::styled(
        format!("score {}", app.session.score()),
        bold_style,
    ))
    .alignment(Alignment::Center);
    score.render(chunks[3], buf);

    let legend = Paragraph::new(Span::styled(
        "(→/y) got it / (←/n) skip / (esc)ape",
        italic_style,
    ));
    legend.render(chunks[5], buf);
}

fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let final_score = app
        .handoff
        .as_ref()
        .map(|h| h.final_score())
        .unwrap_or_else(|| app.session.score());

    let top_pad = area.height.saturating_sub(8) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_pad),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(Span::styled("round over", dim_bold_style))
        .alignment(Alignment::Center);
    header.render(chunks[1], buf);

    let score = Paragraph::new(Span::styled(
        format!("{final_score} points"),
        bold_style.fg(Color::Magenta),
    ))
    .alignment(Alignment::Center);
    score.render(chunks[2], buf);

    let best_line = match &app.previous_best {
        Some(best) if final_score > best.score => Span::styled(
            format!("new personal best! previous {}", best.score),
            bold_style.fg(Color::Green),
        ),
        Some(best) => {
            let age = humanized_age(best)
                .map(|a| format!(" · set {a}"))
                .unwrap_or_default();
            Span::styled(
                format!("personal best {}{}", best.score, age),
                Style::default().fg(Color::Cyan).patch(italic_style),
            )
        }
        None => Span::styled(
            "first round on record".to_string(),
            Style::default().fg(Color::Gray).patch(italic_style),
        ),
    };
    Paragraph::new(best_line)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if !app.recent_form.is_empty() {
        let recent = Paragraph::new(Span::styled(
            format!("recent {}", app.recent_form),
            Style::default().fg(Color::Gray).patch(italic_style),
        ))
        .alignment(Alignment::Center);
        recent.render(chunks[4], buf);
    }

    let pool = app.runtime_settings.word_pool.to_string().to_lowercase();
    let legend_text = if Browser::is_available() {
        format!("(r)estart / (p)ool: {pool} / (t)weet / (esc)ape")
    } else {
        format!("(r)estart / (p)ool: {pool} / (esc)ape")
    };
    let legend = Paragraph::new(Span::styled(legend_text, italic_style));
    legend.render(chunks[6], buf);
}

fn humanized_age(entry: &ScoreEntry) -> Option<String> {
    let ts = entry.recorded_at()?;
    let elapsed = Local::now().signed_duration_since(ts);
    let secs = elapsed.num_seconds().max(0) as u64;
    Some(
        HumanTime::from(std::time::Duration::from_secs(secs))
            .to_text_en(Accuracy::Rough, Tense::Past),
    )
}
