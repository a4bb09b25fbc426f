pub mod fruit_ninja;
pub mod geometry;
pub mod pong;
pub mod snake;
pub mod tetris;

use std::fmt;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent};
use ratatui::prelude::*;

/// Canonical identifier of each game, used for score rows and leaderboard filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameId {
    Snake,
    Pong,
    Tetris,
    FruitNinja,
}

impl GameId {
    pub const ALL: [GameId; 4] = [GameId::Snake, GameId::Pong, GameId::Tetris, GameId::FruitNinja];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "Snake",
            GameId::Pong => "Pong",
            GameId::Tetris => "Tetris",
            GameId::FruitNinja => "Fruit Ninja",
        }
    }

    /// Parses a stored game name, accepting the older suffixed spellings
    /// such as "Pong Retro" or "Tetris Classic".
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let base = name
            .strip_suffix(" Classic")
            .or_else(|| name.strip_suffix(" Retro"))
            .unwrap_or(name);
        GameId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(base))
    }

    pub fn index(&self) -> usize {
        match self {
            GameId::Snake => 0,
            GameId::Pong => 1,
            GameId::Tetris => 2,
            GameId::FruitNinja => 3,
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// Raw input forwarded from the shell to the active game.
#[derive(Clone, Copy, Debug)]
pub enum Input {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl Input {
    /// Key event that should act like a press (presses and auto-repeats).
    pub fn pressed_key(&self) -> Option<KeyEvent> {
        match self {
            Input::Key(key) if key.kind != KeyEventKind::Release => Some(*key),
            _ => None,
        }
    }
}

pub trait Game {
    fn start(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn tick(&mut self, dt: Duration);
    fn handle_input(&mut self, input: Input);
    fn render(&mut self, frame: &mut Frame, area: Rect);
    fn reset(&mut self);
    fn score(&self) -> u32;
    fn high_score(&self) -> u32;
    fn phase(&self) -> Phase;

    /// Games that track held keys override this.
    fn set_key_hold(&mut self, _mode: KeyHold) {}

    fn is_game_over(&self) -> bool {
        self.phase() == Phase::GameOver
    }

    fn toggle_pause(&mut self) {
        match self.phase() {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Restart, pause and start/replay keys shared by every game.
    /// Returns true when the key was consumed.
    fn handle_common_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.reset();
                true
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.toggle_pause();
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') => match self.phase() {
                Phase::Ready => {
                    self.start();
                    true
                }
                Phase::GameOver => {
                    self.reset();
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// How the terminal reports held keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyHold {
    /// Only presses and auto-repeats arrive.
    #[default]
    Repeat,
    /// Release events arrive, so a hold lasts until its release.
    Release,
}

/// Ticks a single press keeps a hold alive when releases are not reported.
/// Must outlast the usual auto-repeat delay so the first repeat re-arms it.
pub const REPEAT_WINDOW_TICKS: u32 = 40;

/// A held key.
///
/// With [`KeyHold::Release`] a press latches until `release`. Otherwise each
/// press or repeat re-arms a window of [`REPEAT_WINDOW_TICKS`] that runs down
/// through `decay`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hold {
    mode: KeyHold,
    ticks: u32,
    latched: bool,
}

impl Hold {
    pub fn new(mode: KeyHold) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn press(&mut self) {
        match self.mode {
            KeyHold::Release => self.latched = true,
            KeyHold::Repeat => self.ticks = REPEAT_WINDOW_TICKS,
        }
    }

    pub fn release(&mut self) {
        self.ticks = 0;
        self.latched = false;
    }

    pub fn is_active(&self) -> bool {
        self.latched || self.ticks > 0
    }

    pub fn decay(&mut self) {
        self.ticks = self.ticks.saturating_sub(1);
    }
}

pub(crate) fn grid_lines(grid: Vec<Vec<(char, Style)>>) -> Vec<Line<'static>> {
    grid.into_iter()
        .map(|row| {
            let spans: Vec<Span<'static>> = row
                .into_iter()
                .map(|(ch, style)| Span::styled(String::from(ch), style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Help bar of `key action` pairs separated by bars.
pub(crate) fn key_hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))));
        } else {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("{} ", key),
            Style::default().fg(Color::Rgb(80, 200, 255)),
        ));
        spans.push(Span::styled(
            format!("{} ", action),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// Bottom line shared by all games for the non-playing phases.
pub(crate) fn phase_banner(phase: Phase, score: u32) -> Option<Line<'static>> {
    match phase {
        Phase::Ready => Some(Line::from(vec![
            Span::styled(" ▶ READY ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::styled("Press ENTER or SPACE to start, Esc for menu", Style::default().fg(Color::Gray)),
        ])),
        Phase::Paused => Some(Line::from(vec![
            Span::styled(" ⏸ PAUSED - Press P to resume ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ])),
        Phase::GameOver => Some(Line::from(vec![
            Span::styled(" 💀 GAME OVER! ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("Score: {} │ Press ENTER to play again, Esc for menu", score),
                Style::default().fg(Color::Gray),
            ),
        ])),
        Phase::Playing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for id in GameId::ALL {
            assert_eq!(GameId::from_name(id.as_str()), Some(id));
        }
    }

    #[test]
    fn legacy_suffixes_map_to_canonical_ids() {
        assert_eq!(GameId::from_name("Pong Retro"), Some(GameId::Pong));
        assert_eq!(GameId::from_name("Tetris Classic"), Some(GameId::Tetris));
        assert_eq!(GameId::from_name("Snake Classic"), Some(GameId::Snake));
        assert_eq!(GameId::from_name("Minesweeper"), None);
    }

    #[test]
    fn repeat_hold_expires_after_its_window() {
        let mut hold = Hold::new(KeyHold::Repeat);
        hold.press();
        for _ in 0..REPEAT_WINDOW_TICKS - 1 {
            hold.decay();
        }
        assert!(hold.is_active());
        hold.decay();
        assert!(!hold.is_active());
        hold.press();
        hold.release();
        assert!(!hold.is_active());
    }

    #[test]
    fn release_hold_lasts_until_released() {
        let mut hold = Hold::new(KeyHold::Release);
        hold.press();
        for _ in 0..REPEAT_WINDOW_TICKS * 10 {
            hold.decay();
        }
        assert!(hold.is_active());
        hold.release();
        assert!(!hold.is_active());
    }
}
