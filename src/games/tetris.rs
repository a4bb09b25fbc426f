use std::time::Duration;

use crossterm::event::{KeyCode, KeyEventKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::geometry::Cell;
use crate::games::{grid_lines, key_hints, phase_banner, Game, Hold, Input, KeyHold, Phase};
use crate::scheduler::Scheduler;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
const SPAWN_X: i32 = BOARD_WIDTH as i32 / 2 - 1;
const LINE_POINTS: u32 = 100;
const LINES_PER_LEVEL: u32 = 10;
const SOFT_DROP_INTERVAL: Duration = Duration::from_millis(50);

const BG: Color = Color::Rgb(14, 10, 24);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tetromino {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::O,
        Tetromino::T,
        Tetromino::S,
        Tetromino::Z,
        Tetromino::J,
        Tetromino::L,
    ];

    fn base_shape(self) -> &'static [&'static [u8]] {
        match self {
            Tetromino::I => &[&[1, 1, 1, 1]],
            Tetromino::O => &[&[1, 1], &[1, 1]],
            Tetromino::T => &[&[0, 1, 0], &[1, 1, 1]],
            Tetromino::S => &[&[0, 1, 1], &[1, 1, 0]],
            Tetromino::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Tetromino::J => &[&[1, 0, 0], &[1, 1, 1]],
            Tetromino::L => &[&[0, 0, 1], &[1, 1, 1]],
        }
    }

    pub fn color(self) -> Color {
        match self {
            Tetromino::I => Color::Rgb(0, 240, 240),
            Tetromino::O => Color::Rgb(240, 240, 0),
            Tetromino::T => Color::Rgb(160, 0, 240),
            Tetromino::S => Color::Rgb(0, 240, 0),
            Tetromino::Z => Color::Rgb(240, 0, 0),
            Tetromino::J => Color::Rgb(0, 0, 240),
            Tetromino::L => Color::Rgb(240, 160, 0),
        }
    }

    /// Shape matrix after `rotation` clockwise quarter turns.
    pub fn shape(self, rotation: u8) -> Vec<Vec<bool>> {
        let mut shape: Vec<Vec<bool>> = self
            .base_shape()
            .iter()
            .map(|row| row.iter().map(|&c| c == 1).collect())
            .collect();
        for _ in 0..rotation % 4 {
            shape = rotate_cw(&shape);
        }
        shape
    }
}

/// Transpose then reverse each row: a clockwise quarter turn.
pub fn rotate_cw(shape: &[Vec<bool>]) -> Vec<Vec<bool>> {
    let rows = shape.len();
    let cols = shape.first().map_or(0, |r| r.len());
    (0..cols)
        .map(|i| (0..rows).map(|j| shape[rows - 1 - j][i]).collect())
        .collect()
}

pub type Row = [Option<Tetromino>; BOARD_WIDTH];
pub type Board = Vec<Row>;

pub fn empty_board() -> Board {
    vec![[None; BOARD_WIDTH]; BOARD_HEIGHT]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: Tetromino,
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
}

impl Piece {
    pub fn spawn(kind: Tetromino) -> Self {
        Self {
            kind,
            x: SPAWN_X,
            y: 0,
            rotation: 0,
        }
    }

    /// Board cells covered by the piece.
    pub fn cells(&self) -> Vec<Cell> {
        let mut out = Vec::with_capacity(4);
        for (py, row) in self.kind.shape(self.rotation).iter().enumerate() {
            for (px, &filled) in row.iter().enumerate() {
                if filled {
                    out.push(Cell::new(self.x + px as i32, self.y + py as i32));
                }
            }
        }
        out
    }

    fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Cells must sit inside the side walls and above the floor. Cells above the
/// top edge are allowed; cells on the board must not overlap filled cells.
pub fn is_valid_position(piece: &Piece, board: &Board) -> bool {
    piece.cells().into_iter().all(|c| {
        if c.x < 0 || c.x >= BOARD_WIDTH as i32 || c.y >= BOARD_HEIGHT as i32 {
            return false;
        }
        c.y < 0 || board[c.y as usize][c.x as usize].is_none()
    })
}

/// Removes every full row and pads the top with empty rows.
/// Returns how many rows were removed.
pub fn clear_lines(board: &mut Board) -> u32 {
    let before = board.len();
    board.retain(|row| row.iter().any(|c| c.is_none()));
    let cleared = before - board.len();
    for _ in 0..cleared {
        board.insert(0, [None; BOARD_WIDTH]);
    }
    cleared as u32
}

pub fn drop_interval(level: u32) -> Duration {
    let ms = 1000u64.saturating_sub(level.saturating_sub(1) as u64 * 100).max(50);
    Duration::from_millis(ms)
}

pub struct Tetris {
    board: Board,
    current: Option<Piece>,
    next: Tetromino,
    score: u32,
    high_score: u32,
    level: u32,
    lines: u32,
    phase: Phase,
    key_hold: KeyHold,
    soft_drop: Hold,
    timer: Scheduler,
    rng: StdRng,
}

impl Tetris {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let next = random_kind(&mut rng);
        Self {
            board: empty_board(),
            current: None,
            next,
            score: 0,
            high_score: 0,
            level: 1,
            lines: 0,
            phase: Phase::Ready,
            key_hold: KeyHold::default(),
            soft_drop: Hold::default(),
            timer: Scheduler::new(drop_interval(1)),
            rng,
        }
    }

    #[cfg(test)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<Piece> {
        self.current
    }

    #[cfg(test)]
    pub fn upcoming(&self) -> Tetromino {
        self.next
    }

    #[cfg(test)]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[cfg(test)]
    pub fn lines(&self) -> u32 {
        self.lines
    }

    #[cfg(test)]
    pub fn key_hold(&self) -> KeyHold {
        self.key_hold
    }

    /// Tries to translate the active piece. A blocked downward move locks it.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        let Some(piece) = self.current else { return false };
        let moved = piece.shifted(dx, dy);
        if is_valid_position(&moved, &self.board) {
            self.current = Some(moved);
            return true;
        }
        if dy > 0 {
            self.lock(piece);
        }
        false
    }

    /// Clockwise rotation, accepted only when the result fits. No wall kicks.
    pub fn rotate(&mut self) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        let Some(piece) = self.current else { return false };
        let rotated = Piece {
            rotation: (piece.rotation + 1) % 4,
            ..piece
        };
        if is_valid_position(&rotated, &self.board) {
            self.current = Some(rotated);
            true
        } else {
            false
        }
    }

    fn lock(&mut self, piece: Piece) {
        for c in piece.cells() {
            if c.in_bounds(BOARD_WIDTH as i32, BOARD_HEIGHT as i32) {
                self.board[c.y as usize][c.x as usize] = Some(piece.kind);
            }
        }

        let cleared = clear_lines(&mut self.board);
        if cleared > 0 {
            self.score += cleared * LINE_POINTS * self.level;
            self.high_score = self.high_score.max(self.score);
            self.lines += cleared;
            self.level = self.lines / LINES_PER_LEVEL + 1;
            log::debug!("cleared {} lines, level {}", cleared, self.level);
        }

        let spawned = self.spawn();
        if is_valid_position(&spawned, &self.board) {
            self.current = Some(spawned);
        } else {
            log::debug!("tetris topped out with score {}", self.score);
            self.current = None;
            self.phase = Phase::GameOver;
            self.timer.cancel();
        }
    }

    fn spawn(&mut self) -> Piece {
        let kind = self.next;
        self.next = random_kind(&mut self.rng);
        Piece::spawn(kind)
    }

    fn render_board(&self) -> Vec<Line<'static>> {
        let mut grid: Vec<Vec<(char, Style)>> = Vec::with_capacity(BOARD_HEIGHT);
        for row in &self.board {
            let mut line = Vec::with_capacity(BOARD_WIDTH * 2);
            for cell in row {
                let item = match cell {
                    Some(kind) => ('█', Style::default().fg(kind.color()).bg(BG)),
                    None => ('·', Style::default().fg(Color::Rgb(40, 34, 60)).bg(BG)),
                };
                line.push(item);
                line.push(item);
            }
            grid.push(line);
        }
        if let Some(piece) = self.current {
            for c in piece.cells() {
                if c.in_bounds(BOARD_WIDTH as i32, BOARD_HEIGHT as i32) {
                    let style = Style::default().fg(piece.kind.color()).bg(BG).add_modifier(Modifier::BOLD);
                    let x = c.x as usize * 2;
                    grid[c.y as usize][x] = ('▓', style);
                    grid[c.y as usize][x + 1] = ('▓', style);
                }
            }
        }
        grid_lines(grid)
    }

    fn render_next(&self) -> Vec<Line<'static>> {
        let style = Style::default().fg(self.next.color()).add_modifier(Modifier::BOLD);
        self.next
            .shape(0)
            .iter()
            .map(|row| {
                let text: String = row.iter().map(|&f| if f { "██" } else { "  " }).collect();
                Line::from(Span::styled(format!("  {}", text), style))
            })
            .collect()
    }
}

fn random_kind(rng: &mut StdRng) -> Tetromino {
    Tetromino::ALL[rng.gen_range(0..Tetromino::ALL.len())]
}

impl Default for Tetris {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Tetris {
    fn start(&mut self) {
        if self.phase == Phase::Ready {
            self.phase = Phase::Playing;
            let piece = self.spawn();
            self.current = Some(piece);
            self.timer.start();
        }
    }

    fn pause(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            self.timer.pause();
            self.soft_drop.release();
        }
    }

    fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
            self.timer.resume();
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase != Phase::Playing {
            return;
        }
        let interval = if self.soft_drop.is_active() {
            SOFT_DROP_INTERVAL
        } else {
            drop_interval(self.level)
        };
        self.timer.set_interval(interval);
        self.soft_drop.decay();
        if self.timer.advance(dt) {
            self.move_piece(0, 1);
        }
    }

    fn handle_input(&mut self, input: Input) {
        let Input::Key(key) = input else { return };
        if key.kind == KeyEventKind::Release {
            if key.code == KeyCode::Down {
                self.soft_drop.release();
            }
            return;
        }
        if self.handle_common_key(key) || self.phase != Phase::Playing {
            return;
        }
        match key.code {
            KeyCode::Left => {
                self.move_piece(-1, 0);
            }
            KeyCode::Right => {
                self.move_piece(1, 0);
            }
            KeyCode::Down => {
                self.soft_drop.press();
                self.move_piece(0, 1);
            }
            KeyCode::Up | KeyCode::Char(' ') => {
                self.rotate();
            }
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(160, 90, 240)))
            .title(" 🧩 Tetris ")
            .title_style(Style::default().fg(Color::Rgb(200, 140, 255)).add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(BOARD_HEIGHT as u16 + 2), Constraint::Length(1)])
            .split(inner);

        let board_w = BOARD_WIDTH as u16 * 2 + 2;
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(board_w),
                Constraint::Length(24),
                Constraint::Min(0),
            ])
            .split(rows[0]);

        let well = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(Color::Rgb(90, 70, 140)));
        let well_inner = well.inner(cols[1]);
        frame.render_widget(well, cols[1]);
        frame.render_widget(Paragraph::new(self.render_board()), well_inner);

        let mut side = vec![
            Line::from(""),
            Line::from(Span::styled("  NEXT", Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))),
            Line::from(""),
        ];
        side.extend(self.render_next());
        side.extend([
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Score: {}", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("  Level: {}", self.level), Style::default().fg(Color::Green))),
            Line::from(Span::styled(format!("  Lines: {}", self.lines), Style::default().fg(Color::Magenta))),
            Line::from(""),
            Line::from(Span::styled(format!("  🏆 High: {}", self.high_score), Style::default().fg(Color::Cyan))),
        ]);
        frame.render_widget(Paragraph::new(side), cols[2]);

        let bottom = phase_banner(self.phase, self.score).unwrap_or_else(|| {
            key_hints(&[
                ("←→", "Move"),
                ("↓", "Soft drop"),
                ("↑/Space", "Rotate"),
                ("P", "Pause"),
                ("R", "Restart"),
                ("Esc", "Menu"),
            ])
        });
        frame.render_widget(Paragraph::new(bottom), rows[1]);
    }

    fn reset(&mut self) {
        let hs = self.high_score;
        let key_hold = self.key_hold;
        *self = Tetris::with_rng(self.rng.clone());
        self.high_score = hs;
        self.set_key_hold(key_hold);
    }

    fn set_key_hold(&mut self, mode: KeyHold) {
        self.key_hold = mode;
        self.soft_drop = Hold::new(mode);
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn high_score(&self) -> u32 {
        self.high_score
    }

    fn phase(&self) -> Phase {
        self.phase
    }
}
