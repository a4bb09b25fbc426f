use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::GameId;
use crate::scores::{ScoreStore, HOME_TOP};

const BANNER: &str = r#"
 ╔═══════════════════════════════════════════════════════════════════╗
 ║   ████   █████  █████  ████    ███    ████   ███   ████   █████   ║
 ║   █   █  █        █    █   █  █   █  █      █   █  █   █  █       ║
 ║   ████   ████     █    ████   █   █  █      █████  █   █  ████    ║
 ║   █  █   █        █    █  █   █   █  █      █   █  █   █  █       ║
 ║   █   █  █████    █    █   █   ███    ████  █   █  ████   █████   ║
 ╚═══════════════════════════════════════════════════════════════════╝"#;

pub struct GameTile {
    pub icon: &'static str,
    pub desc: &'static str,
    pub color: Color,
    border_color: Color,
    controls: &'static [(&'static str, &'static str)],
}

pub const GAME_TILES: [GameTile; 4] = [
    GameTile {
        icon: "🐍",
        desc: "Eat, grow and\nnever bite yourself!",
        color: Color::Rgb(80, 220, 80),
        border_color: Color::Rgb(40, 120, 40),
        controls: &[("↑ ↓ ← →", "Steer the snake")],
    },
    GameTile {
        icon: "🏓",
        desc: "First to 10 points\nagainst the CPU!",
        color: Color::Rgb(100, 180, 255),
        border_color: Color::Rgb(50, 90, 140),
        controls: &[
            ("↑ / ↓", "Move paddle (hold)"),
            ("W / S", "Nudge paddle"),
            ("Mouse drag", "Place paddle"),
        ],
    },
    GameTile {
        icon: "🧱",
        desc: "Stack pieces and\nclear the lines!",
        color: Color::Rgb(200, 120, 255),
        border_color: Color::Rgb(100, 60, 140),
        controls: &[
            ("← / →", "Move piece"),
            ("↑ / Space", "Rotate"),
            ("↓", "Soft drop (hold)"),
        ],
    },
    GameTile {
        icon: "🍉",
        desc: "Slice the fruit,\nnever the bombs!",
        color: Color::Rgb(255, 150, 40),
        border_color: Color::Rgb(140, 80, 30),
        controls: &[
            ("Mouse drag", "Slice"),
            ("↑ ↓ ← →", "Swing the blade"),
            ("Space", "Cut in place"),
        ],
    },
];

fn render_game_tile(frame: &mut Frame, area: Rect, id: GameId, selected: bool, best: u32) {
    let tile = &GAME_TILES[id.index()];
    let border_color = if selected { Color::Rgb(255, 220, 80) } else { tile.border_color };
    let border_type = if selected { BorderType::Double } else { BorderType::Rounded };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 { return; }

    let mut lines: Vec<Line> = Vec::new();

    let name_color = if selected { Color::Rgb(255, 255, 255) } else { tile.color };
    let mut title = vec![
        Span::styled(format!("[{}] ", id.index() + 1), Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{} ", tile.icon), Style::default()),
        Span::styled(id.as_str(), Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
    ];
    // Best run since launch, saved or not
    if best > 0 {
        title.push(Span::styled(format!("  🏆 {best}"), Style::default().fg(Color::Cyan)));
    }
    lines.push(Line::from(title));

    for desc_line in tile.desc.split('\n') {
        lines.push(Line::from(vec![
            Span::styled(desc_line, Style::default().fg(if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(120, 120, 140) })),
        ]));
    }

    if selected {
        lines.push(Line::from(vec![
            Span::styled("▶ Enter to play", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        ]));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, inner);
}

fn control_line(key: &str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<17}", key), Style::default().fg(Color::Rgb(80, 200, 255))),
        Span::styled(action, Style::default().fg(Color::Rgb(140, 140, 140))),
    ])
}

fn game_controls(id: GameId) -> Vec<Line<'static>> {
    let tile = &GAME_TILES[id.index()];
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("  {} {}", tile.icon, id),
            Style::default().fg(tile.color).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];
    lines.extend(tile.controls.iter().map(|&(key, action)| control_line(key, action)));
    lines.push(control_line("Enter / Space", "Start / play again"));
    lines.push(control_line("R", "Restart"));
    lines.push(control_line("P", "Pause"));
    lines
}

pub fn render_home(
    frame: &mut Frame,
    area: Rect,
    selected_game: usize,
    session_best: [u32; 4],
    show_high_scores: bool,
    store: &ScoreStore,
) {
    let selected = GameId::ALL[selected_game % GameId::ALL.len()];
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Banner
            Constraint::Length(2),  // Subtitle
            Constraint::Length(12), // Game tiles (2 rows)
            Constraint::Min(10),    // Controls area
            Constraint::Length(2),  // Footer
        ])
        .split(area);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(80, 200, 255)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let subtitle = Paragraph::new(Line::from(vec![
        Span::styled(
            "  ⚡ Four classics, one terminal ⚡  ",
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(subtitle, chunks[1]);

    let games_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(" 🎮 Games - ↑↓←→ Select, Enter to Play ")
        .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD));
    let games_inner = games_block.inner(chunks[2]);
    frame.render_widget(games_block, chunks[2]);

    let tile_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(games_inner);

    for (row, row_area) in tile_rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(*row_area);
        for (col, col_area) in cols.iter().enumerate() {
            let idx = row * 2 + col;
            render_game_tile(frame, *col_area, GameId::ALL[idx], selected_game == idx, session_best[idx]);
        }
    }

    let ctrl_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[3]);

    let controls = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  🔧 Navigation", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        ]),
        control_line("Tab / Shift+Tab", "Switch tabs"),
        control_line("1-4", "Launch game"),
        control_line("↑ ↓ ← →", "Select game"),
        control_line("Enter", "Play selected"),
        control_line("L", "Leaderboard"),
        control_line("H", "Top scores"),
        control_line("Esc", "Return to Home"),
        control_line("q / Ctrl+C", "Quit"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .title(" ⌨ Navigation Control ")
            .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(controls, ctrl_cols[0]);

    let tile = &GAME_TILES[selected.index()];
    let game_ctrl = Paragraph::new(game_controls(selected)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(tile.border_color))
            .title(format!(" 🎮 {} Control ", selected))
            .title_style(Style::default().fg(tile.color).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(game_ctrl, ctrl_cols[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("  🦀 ", Style::default().fg(Color::Rgb(255, 100, 50))),
        Span::styled(concat!("v", env!("CARGO_PKG_VERSION")), Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("H", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" Top Scores", Style::default().fg(Color::Rgb(100, 100, 130))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("L", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" Leaderboard", Style::default().fg(Color::Rgb(100, 100, 130))),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[4]);

    if show_high_scores {
        render_high_scores_overlay(frame, area, store);
    }
}

fn render_high_scores_overlay(frame: &mut Frame, area: Rect, store: &ScoreStore) {
    let overlay_w = 50u16.min(area.width.saturating_sub(4));
    let overlay_h = 24u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 200, 80)))
        .title(" 🏆 High Scores ")
        .title_style(Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let medals = [
        ("🥇", Color::Rgb(255, 215, 0)),
        ("🥈", Color::Rgb(192, 192, 192)),
        ("🥉", Color::Rgb(205, 127, 50)),
    ];

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    for id in GameId::ALL {
        let tile = &GAME_TILES[id.index()];
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", tile.icon), Style::default()),
            Span::styled(id.as_str(), Style::default().fg(tile.color).add_modifier(Modifier::BOLD)),
        ]));

        let rows = store.top_scores_for(id, HOME_TOP);
        if rows.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("    No scores yet", Style::default().fg(Color::Rgb(60, 60, 80))),
            ]));
        }
        for (row, (medal, color)) in rows.iter().zip(medals) {
            lines.push(Line::from(vec![
                Span::styled(format!("    {} ", medal), Style::default()),
                Span::styled(
                    format!("{:<16} ", row.user_name),
                    Style::default().fg(Color::Rgb(200, 200, 220)),
                ),
                Span::styled(row.score.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Press ", Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("H", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" to close", Style::default().fg(Color::Rgb(80, 80, 100))),
    ]));

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}
