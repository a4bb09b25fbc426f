use std::time::Duration;

use crossterm::event::{KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::geometry::{cell_to_board, spans_overlap};
use crate::games::{grid_lines, key_hints, phase_banner, Game, Hold, Input, KeyHold, Phase};
use crate::scheduler::Scheduler;

pub const BOARD_WIDTH: f32 = 800.0;
pub const BOARD_HEIGHT: f32 = 400.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 80.0;
pub const BALL_SIZE: f32 = 10.0;
pub const WIN_SCORE: u32 = 10;

const STEP_INTERVAL: Duration = Duration::from_millis(16);
const PLAYER_SPEED: f32 = 8.0;
const BUTTON_STEP: f32 = 15.0;
const AI_SPEED: f32 = 4.0;
const AI_DEADBAND: f32 = 10.0;
const SERVE_SPEED: f32 = 5.0;
const SERVE_SPREAD: f32 = 6.0;
const DEFLECT_SPREAD: f32 = 10.0;

const BG: Color = Color::Rgb(5, 5, 10);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scores {
    pub player: u32,
    pub ai: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Player,
    Ai,
}

pub struct Pong {
    ball: Ball,
    player_y: f32,
    ai_y: f32,
    scores: Scores,
    winner: Option<Side>,
    phase: Phase,
    high_score: u32,
    key_hold: KeyHold,
    up: Hold,
    down: Hold,
    timer: Scheduler,
    rng: StdRng,
    viewport: Rect,
}

fn centered_paddle() -> f32 {
    BOARD_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0
}

fn clamp_paddle(y: f32) -> f32 {
    y.clamp(0.0, BOARD_HEIGHT - PADDLE_HEIGHT)
}

impl Pong {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let vx = if rng.gen_bool(0.5) { SERVE_SPEED } else { -SERVE_SPEED };
        let vy = (rng.gen::<f32>() - 0.5) * SERVE_SPREAD;
        Self {
            ball: Ball {
                x: BOARD_WIDTH / 2.0,
                y: BOARD_HEIGHT / 2.0,
                vx,
                vy,
            },
            player_y: centered_paddle(),
            ai_y: centered_paddle(),
            scores: Scores::default(),
            winner: None,
            phase: Phase::Ready,
            high_score: 0,
            key_hold: KeyHold::default(),
            up: Hold::default(),
            down: Hold::default(),
            timer: Scheduler::new(STEP_INTERVAL),
            rng,
            viewport: Rect::default(),
        }
    }

    #[cfg(test)]
    pub fn ball(&self) -> Ball {
        self.ball
    }

    #[cfg(test)]
    pub fn set_ball(&mut self, ball: Ball) {
        self.ball = ball;
    }

    #[cfg(test)]
    pub fn scores(&self) -> Scores {
        self.scores
    }

    #[cfg(test)]
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    #[cfg(test)]
    pub fn player_y(&self) -> f32 {
        self.player_y
    }

    #[cfg(test)]
    pub fn ai_y(&self) -> f32 {
        self.ai_y
    }

    #[cfg(test)]
    pub fn key_hold(&self) -> KeyHold {
        self.key_hold
    }

    /// Moves the player paddle by a signed amount, clamped to the board.
    pub fn nudge_player(&mut self, dy: f32) {
        if self.phase == Phase::Playing {
            self.player_y = clamp_paddle(self.player_y + dy);
        }
    }

    /// Centres the player paddle on a board y coordinate (touch/drag control).
    pub fn place_player(&mut self, y: f32) {
        if self.phase == Phase::Playing {
            self.player_y = clamp_paddle(y - PADDLE_HEIGHT / 2.0);
        }
    }

    /// One simulation step. Returns the side that scored, if any.
    pub fn advance(&mut self) -> Option<Side> {
        if self.phase != Phase::Playing {
            return None;
        }

        if self.up.is_active() {
            self.player_y = clamp_paddle(self.player_y - PLAYER_SPEED);
        }
        if self.down.is_active() {
            self.player_y = clamp_paddle(self.player_y + PLAYER_SPEED);
        }
        self.up.decay();
        self.down.decay();

        self.move_ai();

        let ball = &mut self.ball;
        ball.x += ball.vx;
        ball.y += ball.vy;

        if ball.y <= 0.0 {
            ball.y = 0.0;
            ball.vy = -ball.vy;
        } else if ball.y >= BOARD_HEIGHT - BALL_SIZE {
            ball.y = BOARD_HEIGHT - BALL_SIZE;
            ball.vy = -ball.vy;
        }

        if ball.vx < 0.0
            && ball.x <= PADDLE_WIDTH
            && spans_overlap(ball.y, BALL_SIZE, self.player_y, PADDLE_HEIGHT)
        {
            deflect(ball, self.player_y);
        } else if ball.vx > 0.0
            && ball.x + BALL_SIZE >= BOARD_WIDTH - PADDLE_WIDTH
            && spans_overlap(ball.y, BALL_SIZE, self.ai_y, PADDLE_HEIGHT)
        {
            deflect(ball, self.ai_y);
        }

        let scored = if self.ball.x < 0.0 {
            self.scores.ai += 1;
            self.serve(SERVE_SPEED);
            Some(Side::Ai)
        } else if self.ball.x > BOARD_WIDTH {
            self.scores.player += 1;
            self.high_score = self.high_score.max(self.scores.player);
            self.serve(-SERVE_SPEED);
            Some(Side::Player)
        } else {
            None
        };

        if self.scores.player >= WIN_SCORE || self.scores.ai >= WIN_SCORE {
            let winner = if self.scores.player >= WIN_SCORE { Side::Player } else { Side::Ai };
            log::debug!("pong match over {:?} won {}-{}", winner, self.scores.player, self.scores.ai);
            self.winner = Some(winner);
            self.phase = Phase::GameOver;
            self.timer.cancel();
        }
        scored
    }

    /// Proportional follower: chases the ball's y once it leaves the deadband.
    fn move_ai(&mut self) {
        let center = self.ai_y + PADDLE_HEIGHT / 2.0;
        if self.ball.y < center - AI_DEADBAND {
            self.ai_y = clamp_paddle(self.ai_y - AI_SPEED);
        } else if self.ball.y > center + AI_DEADBAND {
            self.ai_y = clamp_paddle(self.ai_y + AI_SPEED);
        }
    }

    fn serve(&mut self, vx: f32) {
        self.ball = Ball {
            x: BOARD_WIDTH / 2.0,
            y: BOARD_HEIGHT / 2.0,
            vx,
            vy: (self.rng.gen::<f32>() - 0.5) * SERVE_SPREAD,
        };
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let bg = Style::default().bg(BG);
        let mut grid: Vec<Vec<(char, Style)>> = vec![vec![(' ', bg); width]; height];
        if width == 0 || height == 0 {
            return grid_lines(grid);
        }
        let sx = width as f32 / BOARD_WIDTH;
        let sy = height as f32 / BOARD_HEIGHT;

        // Dashed centre line
        let mid = width / 2;
        for (y, row) in grid.iter_mut().enumerate() {
            if y % 2 == 0 {
                row[mid] = ('┆', Style::default().fg(Color::Rgb(70, 70, 90)).bg(BG));
            }
        }

        let paddle_style = Style::default().fg(Color::White).bg(BG).add_modifier(Modifier::BOLD);
        let paddle_rows = |top: f32| {
            let start = (top * sy) as usize;
            let end = (((top + PADDLE_HEIGHT) * sy).ceil() as usize).min(height);
            start..end.max(start + 1).min(height)
        };
        for y in paddle_rows(self.player_y) {
            grid[y][0] = ('█', paddle_style);
        }
        for y in paddle_rows(self.ai_y) {
            grid[y][width - 1] = ('█', paddle_style);
        }

        let bx = ((self.ball.x + BALL_SIZE / 2.0) * sx) as usize;
        let by = ((self.ball.y + BALL_SIZE / 2.0) * sy) as usize;
        if bx < width && by < height {
            grid[by][bx] = ('●', Style::default().fg(Color::Rgb(255, 255, 120)).bg(BG).add_modifier(Modifier::BOLD));
        }

        grid_lines(grid)
    }
}

fn deflect(ball: &mut Ball, paddle_y: f32) {
    ball.vx = -ball.vx;
    let hit = (ball.y - paddle_y) / PADDLE_HEIGHT;
    ball.vy = (hit - 0.5) * DEFLECT_SPREAD;
}

impl Default for Pong {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Pong {
    fn start(&mut self) {
        if self.phase == Phase::Ready {
            self.phase = Phase::Playing;
            self.timer.start();
        }
    }

    fn pause(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            self.timer.pause();
            self.up.release();
            self.down.release();
        }
    }

    fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
            self.timer.resume();
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase == Phase::Playing && self.timer.advance(dt) {
            self.advance();
        }
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Key(key) if key.kind == KeyEventKind::Release => match key.code {
                KeyCode::Up => self.up.release(),
                KeyCode::Down => self.down.release(),
                _ => {}
            },
            Input::Key(key) => {
                if self.handle_common_key(key) || self.phase != Phase::Playing {
                    return;
                }
                match key.code {
                    KeyCode::Up => {
                        self.down.release();
                        self.up.press();
                    }
                    KeyCode::Down => {
                        self.up.release();
                        self.down.press();
                    }
                    KeyCode::Char('w') | KeyCode::Char('W') => self.nudge_player(-BUTTON_STEP),
                    KeyCode::Char('s') | KeyCode::Char('S') => self.nudge_player(BUTTON_STEP),
                    _ => {}
                }
            }
            Input::Mouse(mouse) => {
                if !matches!(
                    mouse.kind,
                    MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
                ) {
                    return;
                }
                if let Some((_, y)) = cell_to_board(self.viewport, mouse.column, mouse.row, BOARD_WIDTH, BOARD_HEIGHT) {
                    self.place_player(y);
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(180, 180, 200)))
            .title(" 🏓 Pong ")
            .title_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(inner);
        self.viewport = chunks[1];

        let status = Line::from(vec![
            Span::styled(" 🏓 ", Style::default()),
            Span::styled(
                format!("You: {} ", self.scores.player),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("CPU: {} ", self.scores.ai),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("First to {} ", WIN_SCORE), Style::default().fg(Color::Gray)),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("🏆 High: {} ", self.high_score),
                Style::default().fg(Color::Cyan),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let lines = self.render_field(chunks[1].width as usize, chunks[1].height as usize);
        frame.render_widget(Paragraph::new(lines), chunks[1]);

        let bottom = match (self.phase, self.winner) {
            (Phase::GameOver, Some(Side::Player)) => Line::from(vec![
                Span::styled(" 🎉 YOU WIN! ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("{}-{} │ Press ENTER to play again", self.scores.player, self.scores.ai),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            _ => phase_banner(self.phase, self.scores.player).unwrap_or_else(|| {
                key_hints(&[
                    ("↑↓", "Move"),
                    ("W/S", "Step"),
                    ("Mouse", "Drag paddle"),
                    ("P", "Pause"),
                    ("R", "Restart"),
                    ("Esc", "Menu"),
                ])
            }),
        };
        frame.render_widget(Paragraph::new(bottom), chunks[2]);
    }

    fn reset(&mut self) {
        let hs = self.high_score;
        let viewport = self.viewport;
        let key_hold = self.key_hold;
        *self = Pong::with_rng(self.rng.clone());
        self.high_score = hs;
        self.viewport = viewport;
        self.set_key_hold(key_hold);
    }

    fn set_key_hold(&mut self, mode: KeyHold) {
        self.key_hold = mode;
        self.up = Hold::new(mode);
        self.down = Hold::new(mode);
    }

    fn score(&self) -> u32 {
        self.scores.player
    }

    fn high_score(&self) -> u32 {
        self.high_score
    }

    fn phase(&self) -> Phase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::REPEAT_WINDOW_TICKS;
    use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent};

    fn playing() -> Pong {
        let mut p = Pong::with_seed(3);
        p.start();
        p
    }

    fn key(code: KeyCode) -> Input {
        Input::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn release(code: KeyCode) -> Input {
        Input::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release))
    }

    /// Holds Up from y = 300 for `steps` steps with the ball parked mid-field.
    fn hold_up_for(p: &mut Pong, steps: usize) {
        p.player_y = 300.0;
        p.set_ball(Ball { x: 400.0, y: 200.0, vx: 0.0, vy: 0.0 });
        p.handle_input(key(KeyCode::Up));
        for _ in 0..steps {
            p.advance();
        }
    }

    #[test]
    fn ball_leaving_left_edge_scores_for_ai() {
        let mut p = playing();
        p.set_ball(Ball { x: 0.0, y: 200.0, vx: -5.0, vy: 0.0 });
        assert_eq!(p.advance(), Some(Side::Ai));
        assert_eq!(p.scores(), Scores { player: 0, ai: 1 });
        let ball = p.ball();
        assert_eq!((ball.x, ball.y), (400.0, 200.0));
        assert_eq!(ball.vx, SERVE_SPEED);
        assert!(ball.vy.abs() <= SERVE_SPREAD / 2.0);
    }

    #[test]
    fn ball_leaving_right_edge_scores_for_player() {
        let mut p = playing();
        p.ai_y = 0.0;
        p.set_ball(Ball { x: 798.0, y: 390.0, vx: 5.0, vy: 0.0 });
        assert_eq!(p.advance(), Some(Side::Player));
        assert_eq!(p.scores().player, 1);
        assert_eq!(p.high_score(), 1);
        assert_eq!(p.ball().vx, -SERVE_SPEED);
    }

    #[test]
    fn walls_invert_vertical_velocity() {
        let mut p = playing();
        p.set_ball(Ball { x: 400.0, y: 2.0, vx: 5.0, vy: -4.0 });
        p.advance();
        assert_eq!(p.ball().y, 0.0);
        assert_eq!(p.ball().vy, 4.0);

        p.set_ball(Ball { x: 400.0, y: 387.0, vx: 5.0, vy: 4.0 });
        p.advance();
        assert_eq!(p.ball().y, BOARD_HEIGHT - BALL_SIZE);
        assert_eq!(p.ball().vy, -4.0);
    }

    #[test]
    fn open_field_keeps_velocity() {
        let mut p = playing();
        p.set_ball(Ball { x: 400.0, y: 200.0, vx: 5.0, vy: 2.0 });
        p.advance();
        assert_eq!(p.ball(), Ball { x: 405.0, y: 202.0, vx: 5.0, vy: 2.0 });
    }

    #[test]
    fn player_paddle_deflects_by_hit_offset() {
        let mut p = playing();
        // Paddle spans 160..240; ball lands near the top edge
        p.set_ball(Ball { x: 14.0, y: 165.0, vx: -5.0, vy: 0.0 });
        p.advance();
        let ball = p.ball();
        assert_eq!(ball.vx, 5.0);
        let expected = ((165.0 - 160.0) / PADDLE_HEIGHT - 0.5) * DEFLECT_SPREAD;
        assert!((ball.vy - expected).abs() < 1e-4);
        assert!(ball.vy < 0.0);
    }

    #[test]
    fn centre_hit_returns_flat() {
        let mut p = playing();
        p.set_ball(Ball { x: 14.0, y: 200.0, vx: -5.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.ball().vx, 5.0);
        assert!(p.ball().vy.abs() < 1e-4);
    }

    #[test]
    fn ai_paddle_deflects_back_toward_player() {
        let mut p = playing();
        p.set_ball(Ball { x: 778.0, y: 200.0, vx: 5.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.ball().vx, -5.0);
    }

    #[test]
    fn ai_follows_ball_outside_deadband() {
        let mut p = playing();
        let start = p.ai_y();
        p.set_ball(Ball { x: 400.0, y: 205.0, vx: 0.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.ai_y(), start);
        p.set_ball(Ball { x: 400.0, y: 50.0, vx: 0.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.ai_y(), start - AI_SPEED);
        p.set_ball(Ball { x: 400.0, y: 350.0, vx: 0.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.ai_y(), start);
    }

    #[test]
    fn ten_points_end_the_match() {
        let mut p = playing();
        p.scores = Scores { player: 0, ai: 9 };
        p.set_ball(Ball { x: 0.0, y: 20.0, vx: -5.0, vy: 0.0 });
        p.player_y = 300.0;
        p.advance();
        assert_eq!(p.scores().ai, 10);
        assert_eq!(p.phase(), Phase::GameOver);
        assert_eq!(p.winner(), Some(Side::Ai));
        assert_eq!(p.advance(), None);
    }

    #[test]
    fn nine_points_keep_playing() {
        let mut p = playing();
        p.scores = Scores { player: 8, ai: 0 };
        p.ai_y = 0.0;
        p.set_ball(Ball { x: 799.0, y: 390.0, vx: 5.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.scores().player, 9);
        assert_eq!(p.phase(), Phase::Playing);
    }

    #[test]
    fn held_key_moves_paddle_and_clamps() {
        let mut p = playing();
        p.handle_input(key(KeyCode::Up));
        p.set_ball(Ball { x: 400.0, y: 200.0, vx: 0.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.player_y(), centered_paddle() - PLAYER_SPEED);
        for _ in 0..50 {
            p.handle_input(key(KeyCode::Up));
            p.advance();
        }
        assert_eq!(p.player_y(), 0.0);
    }

    #[test]
    fn reported_hold_moves_paddle_until_release() {
        let mut p = playing();
        p.set_key_hold(KeyHold::Release);
        hold_up_for(&mut p, 25);
        assert_eq!(p.player_y(), 300.0 - 25.0 * PLAYER_SPEED);
        p.handle_input(release(KeyCode::Up));
        p.advance();
        assert_eq!(p.player_y(), 300.0 - 25.0 * PLAYER_SPEED);
    }

    #[test]
    fn single_press_outlasts_the_repeat_delay() {
        let mut p = playing();
        hold_up_for(&mut p, 25);
        assert_eq!(p.player_y(), 300.0 - 25.0 * PLAYER_SPEED);
    }

    #[test]
    fn unreported_hold_runs_out_without_repeats() {
        let mut p = playing();
        p.handle_input(key(KeyCode::Up));
        for _ in 0..REPEAT_WINDOW_TICKS {
            assert!(p.up.is_active());
            p.advance();
        }
        assert!(!p.up.is_active());
    }

    #[test]
    fn restart_keeps_key_hold_mode() {
        let mut p = playing();
        p.set_key_hold(KeyHold::Release);
        p.reset();
        p.start();
        p.handle_input(key(KeyCode::Down));
        for _ in 0..REPEAT_WINDOW_TICKS * 2 {
            p.advance();
        }
        assert!(p.down.is_active());
    }

    #[test]
    fn release_stops_paddle() {
        let mut p = playing();
        p.handle_input(key(KeyCode::Down));
        p.handle_input(release(KeyCode::Down));
        p.set_ball(Ball { x: 400.0, y: 200.0, vx: 0.0, vy: 0.0 });
        p.advance();
        assert_eq!(p.player_y(), centered_paddle());
    }

    #[test]
    fn button_step_and_clamp() {
        let mut p = playing();
        p.handle_input(key(KeyCode::Char('s')));
        assert_eq!(p.player_y(), centered_paddle() + BUTTON_STEP);
        p.nudge_player(10_000.0);
        assert_eq!(p.player_y(), BOARD_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn drag_places_paddle_proportionally() {
        let mut p = playing();
        p.viewport = Rect::new(0, 0, 80, 40);
        p.handle_input(Input::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 10,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(p.player_y(), 0.0);
        p.handle_input(Input::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 20,
            modifiers: KeyModifiers::NONE,
        }));
        // Row 20 centre maps to y = 205
        assert!((p.player_y() - (205.0 - PADDLE_HEIGHT / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn input_before_start_is_ignored() {
        let mut p = Pong::with_seed(1);
        p.handle_input(key(KeyCode::Char('w')));
        assert_eq!(p.player_y(), centered_paddle());
        assert_eq!(p.advance(), None);
    }
}
