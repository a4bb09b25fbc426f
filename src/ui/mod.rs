pub mod home;
pub mod leaderboard;
pub mod tabs;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, NameEntry, Tab};
use crate::config::NAME_MAX_CHARS;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(if app.status.is_some() { 1 } else { 0 }),
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);

    match app.current_tab {
        Tab::Home => home::render_home(
            frame,
            chunks[1],
            app.selected_game,
            app.session_bests(),
            app.show_high_scores,
            &app.store,
        ),
        Tab::Leaderboard => leaderboard::render_leaderboard(
            frame,
            chunks[1],
            &app.store,
            app.leaderboard_filter,
            app.leaderboard_scroll,
        ),
        tab => {
            if let Some(id) = tab.game() {
                app.game_mut(id).render(frame, chunks[1]);
            }
        }
    }

    if let Some(status) = &app.status {
        let line = Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), chunks[2]);
    }

    // Name entry overlay (renders on top of everything)
    if let Some(entry) = &app.name_entry {
        render_name_entry(frame, frame.area(), entry);
    }
}

fn render_name_entry(frame: &mut Frame, area: Rect, entry: &NameEntry) {
    let overlay_w = 48u16.min(area.width.saturating_sub(4));
    let overlay_h = 14u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 220, 80)))
        .title(" 🏆 SAVE YOUR SCORE ")
        .title_style(Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    // Typed chars followed by underscores for the remaining room
    let typed_len = entry.buffer.chars().count();
    let remaining = NAME_MAX_CHARS.saturating_sub(typed_len);
    let display_name = format!("{}{}", entry.buffer, "_".repeat(remaining));

    let error_line = match &entry.error {
        Some(msg) => Line::from(Span::styled(
            format!("  ⚠ {msg}"),
            Style::default().fg(Color::Rgb(255, 90, 90)).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(""),
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  🎮 ", Style::default()),
            Span::styled(entry.game.as_str(), Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  Score: {}", entry.score), Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter your name:", Style::default().fg(Color::Rgb(180, 180, 200))),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("    [ ", Style::default().fg(Color::Rgb(100, 100, 130))),
            Span::styled(display_name, Style::default().fg(Color::Rgb(255, 255, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" ]", Style::default().fg(Color::Rgb(100, 100, 130))),
        ]),
        error_line,
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" save  ", Style::default().fg(Color::Rgb(100, 100, 130))),
            Span::styled("Esc", Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" skip", Style::default().fg(Color::Rgb(100, 100, 130))),
        ]),
    ];

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::scores::{ScoreSink, ScoreStore};
    use crate::games::fruit_ninja::ItemKind;
    use crate::games::{Game, GameId};
    use crossterm::event::{KeyCode, KeyEvent};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn every_tab_renders() {
        let mut store = ScoreStore::in_memory();
        store.save_score("ann", GameId::Tetris, 400).unwrap();
        let mut app = App::new(&Settings::default(), store);
        let mut terminal = Terminal::new(TestBackend::new(120, 48)).unwrap();
        for _ in Tab::all() {
            terminal.draw(|f| render(f, &mut app)).unwrap();
            app.on_key(KeyEvent::from(KeyCode::Tab));
        }
        assert_eq!(app.current_tab, Tab::Home);
    }

    #[test]
    fn leaderboard_lists_saved_scores() {
        let mut store = ScoreStore::in_memory();
        store.save_score("zelda", GameId::Snake, 90).unwrap();
        let mut app = App::new(&Settings::default(), store);
        app.on_key(KeyEvent::from(KeyCode::Char('l')));
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("zelda"));
        assert!(text.contains("90"));
    }

    #[test]
    fn home_tiles_show_session_best() {
        let mut app = App::new(&Settings::default(), ScoreStore::in_memory());
        app.fruit_ninja.start();
        for _ in 0..3 {
            app.fruit_ninja.launch(ItemKind::Fruit, 100.0, 100.0, 0.0, 0.0, 30.0);
            app.fruit_ninja.slice(100.0, 100.0);
        }
        let mut terminal = Terminal::new(TestBackend::new(120, 48)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(screen_text(&terminal).contains("30"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = App::new(&Settings::default(), ScoreStore::in_memory());
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        for _ in Tab::all() {
            terminal.draw(|f| render(f, &mut app)).unwrap();
            app.on_key(KeyEvent::from(KeyCode::Tab));
        }
    }
}
