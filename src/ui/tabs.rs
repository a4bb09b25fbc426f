use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};
use crate::games::Phase;

const ACTIVE: Color = Color::Rgb(255, 220, 80);
const IDLE: Color = Color::Rgb(120, 120, 140);

/// Small marker telling whether a game tab has a run in progress.
fn phase_marker(phase: Phase) -> Span<'static> {
    match phase {
        Phase::Ready => Span::raw(""),
        Phase::Playing => Span::styled("●", Style::default().fg(Color::Rgb(80, 220, 80))),
        Phase::Paused => Span::styled("⏸", Style::default().fg(Color::Rgb(255, 200, 80))),
        Phase::GameOver => Span::styled("✖", Style::default().fg(Color::Rgb(220, 80, 80))),
    }
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| {
            let color = if *t == app.current_tab { ACTIVE } else { IDLE };
            let mut spans = vec![Span::styled(t.title(), Style::default().fg(color))];
            if let Some(id) = t.game() {
                spans.push(phase_marker(app.game(id).phase()));
            }
            Line::from(spans)
        })
        .collect();

    let title = if app.player_name().is_empty() {
        " 🕹 Retrocade ".to_string()
    } else {
        format!(" 🕹 Retrocade - {} ", app.player_name())
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
                .border_type(BorderType::Rounded)
                .title(title)
                .title_style(
                    Style::default()
                        .fg(Color::Rgb(200, 120, 255))
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(app.current_tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(ACTIVE).add_modifier(Modifier::BOLD))
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));

    frame.render_widget(tabs, area);
}
