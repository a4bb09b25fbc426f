use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::GameId;
use crate::scores::{GameFilter, ScoreStore, LEADERBOARD_LIMIT};
use crate::ui::home::GAME_TILES;

const DIM: Color = Color::Rgb(100, 100, 130);
const ACCENT: Color = Color::Rgb(255, 220, 80);

fn game_color(game_name: &str) -> Color {
    GameId::from_name(game_name)
        .map(|id| GAME_TILES[id.index()].color)
        .unwrap_or(Color::Gray)
}

pub fn render_leaderboard(frame: &mut Frame, area: Rect, store: &ScoreStore, filter: GameFilter, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter tabs
            Constraint::Min(8),    // Tables
            Constraint::Length(1), // Help
        ])
        .split(area);

    let titles: Vec<Line> = GameFilter::TABS
        .iter()
        .map(|f| Line::from(format!(" {} ", f.label())))
        .collect();
    let selected = GameFilter::TABS.iter().position(|f| *f == filter).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
                .title(" 🏆 Leaderboard ")
                .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .style(Style::default().fg(Color::Rgb(120, 120, 140)))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));
    frame.render_widget(tabs, chunks[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_scores(frame, cols[0], store, filter, scroll);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(cols[1]);
    render_stats(frame, side[0], store);
    render_comments(frame, side[1], store, filter);

    let help = crate::games::key_hints(&[
        ("← →", "Filter"),
        ("1-5", "Jump to filter"),
        ("↑ ↓", "Scroll"),
        ("Esc", "Home"),
        ("q", "Quit"),
    ]);
    frame.render_widget(Paragraph::new(help), chunks[2]);
}

fn render_scores(frame: &mut Frame, area: Rect, store: &ScoreStore, filter: GameFilter, scroll: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(format!(" Top {} - {} ", LEADERBOARD_LIMIT, filter.label()))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));

    let scores = store.top_scores(filter, LEADERBOARD_LIMIT);
    if scores.is_empty() {
        let p = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No scores yet. Go set one!", Style::default().fg(DIM))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(p, area);
        return;
    }

    let rows: Vec<Row> = scores
        .iter()
        .enumerate()
        .skip(scroll)
        .map(|(rank, row)| {
            let rank_style = match rank {
                0 => Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
                1 => Style::default().fg(Color::Rgb(192, 192, 192)).add_modifier(Modifier::BOLD),
                2 => Style::default().fg(Color::Rgb(205, 127, 50)).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(DIM),
            };
            Row::new(vec![
                Cell::from(format!("#{}", rank + 1)).style(rank_style),
                Cell::from(row.user_name.clone()).style(Style::default().fg(Color::Rgb(200, 200, 220))),
                Cell::from(row.game_name.clone()).style(Style::default().fg(game_color(&row.game_name))),
                Cell::from(row.score.to_string()).style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                Cell::from(row.created_at.format("%Y-%m-%d").to_string()).style(Style::default().fg(DIM)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Rank", "Player", "Game", "Score", "Date"])
            .style(Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
    )
    .block(block);
    frame.render_widget(table, area);
}

fn render_stats(frame: &mut Frame, area: Rect, store: &ScoreStore) {
    let stats = store.stats();
    let rating = stats
        .average_rating
        .map(|r| format!("{:.1} ★", r))
        .unwrap_or_else(|| "-".to_string());
    let stat = |label: &'static str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("  {:<14}", label), Style::default().fg(DIM)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };
    let lines = vec![
        stat("Entries", stats.entries.to_string(), Color::Rgb(80, 220, 80)),
        stat("Total points", stats.total_points.to_string(), Color::Rgb(100, 180, 255)),
        stat("Avg rating", rating, Color::Rgb(200, 120, 255)),
        stat("Comments", stats.comments.to_string(), Color::Rgb(255, 150, 40)),
    ];
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(40, 120, 40)))
            .title(" 📊 Stats ")
            .title_style(Style::default().fg(Color::Rgb(80, 220, 80)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(p, area);
}

fn render_comments(frame: &mut Frame, area: Rect, store: &ScoreStore, filter: GameFilter) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(50, 90, 140)))
        .title(" 💬 Comments ")
        .title_style(Style::default().fg(Color::Rgb(100, 180, 255)).add_modifier(Modifier::BOLD));

    let comments = store.comments(filter);
    if comments.is_empty() {
        let p = Paragraph::new(Line::from(Span::styled("  No comments yet", Style::default().fg(DIM)))).block(block);
        frame.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = comments
        .iter()
        .map(|c| {
            let stars = "★".repeat(c.rating.min(5) as usize) + &"☆".repeat(5 - c.rating.min(5) as usize);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{} ", c.user_name), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                    Span::styled(format!("{} ", c.game_name), Style::default().fg(game_color(&c.game_name))),
                    Span::styled(stars, Style::default().fg(ACCENT)),
                ]),
                Line::from(Span::styled(format!("  {}", c.comment_text), Style::default().fg(Color::Rgb(180, 180, 200)))),
                Line::from(Span::styled(
                    format!("  ♥ {}  {}", c.likes, c.created_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(DIM),
                )),
            ])
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}
