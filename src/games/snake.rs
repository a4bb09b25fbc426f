use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::geometry::Cell;
use crate::games::{grid_lines, key_hints, phase_banner, Game, Input, Phase};
use crate::scheduler::Scheduler;

pub const GRID_SIZE: i32 = 20;
const STEP_INTERVAL: Duration = Duration::from_millis(150);
const FOOD_POINTS: u32 = 10;
const START: Cell = Cell::new(10, 10);
const START_FOOD: Cell = Cell::new(15, 15);

const BG: Color = Color::Rgb(12, 20, 14);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
    Crashed,
    /// The game was not running.
    Idle,
}

pub struct Snake {
    /// Head first.
    body: VecDeque<Cell>,
    food: Cell,
    /// Direction of the last executed step; reversal is judged against it.
    direction: Direction,
    queued: Direction,
    score: u32,
    high_score: u32,
    phase: Phase,
    timer: Scheduler,
    rng: StdRng,
}

impl Snake {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            body: VecDeque::from([START]),
            food: START_FOOD,
            direction: Direction::Right,
            queued: Direction::Right,
            score: 0,
            high_score: 0,
            phase: Phase::Ready,
            timer: Scheduler::new(STEP_INTERVAL),
            rng,
        }
    }

    #[cfg(test)]
    pub fn body(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    #[cfg(test)]
    pub fn food(&self) -> Cell {
        self.food
    }

    #[cfg(test)]
    pub fn place_food(&mut self, cell: Cell) {
        self.food = cell;
    }

    /// Queues a turn for the next step. Turning straight back is rejected.
    pub fn change_direction(&mut self, dir: Direction) -> bool {
        if self.phase != Phase::Playing || dir == self.direction.opposite() {
            return false;
        }
        self.queued = dir;
        true
    }

    /// Moves the snake one cell along the queued direction.
    pub fn advance(&mut self) -> Step {
        if self.phase != Phase::Playing {
            return Step::Idle;
        }
        self.direction = self.queued;
        let (dx, dy) = self.direction.unit();
        let head = self.head().offset(dx, dy);

        if !head.in_bounds(GRID_SIZE, GRID_SIZE) || self.body.contains(&head) {
            log::debug!("snake crashed at ({}, {}) with score {}", head.x, head.y, self.score);
            self.game_over();
            return Step::Crashed;
        }

        self.body.push_front(head);
        if head == self.food {
            self.score += FOOD_POINTS;
            self.high_score = self.high_score.max(self.score);
            match self.free_cell() {
                Some(cell) => self.food = cell,
                None => {
                    log::debug!("snake filled the board");
                    self.game_over();
                }
            }
            Step::Ate
        } else {
            self.body.pop_back();
            Step::Moved
        }
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.timer.cancel();
    }

    fn free_cell(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.body.contains(c))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.gen_range(0..free.len())])
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let bg = Style::default().bg(BG);
        let mut grid: Vec<Vec<(char, Style)>> = vec![vec![(' ', bg); width]; height];

        // Each board cell is two terminal columns wide
        let board_w = GRID_SIZE as usize * 2;
        let board_h = GRID_SIZE as usize;
        let ox = width.saturating_sub(board_w) / 2;
        let oy = height.saturating_sub(board_h) / 2;

        let mut put = |cell: Cell, ch: char, style: Style| {
            let x = ox + cell.x as usize * 2;
            let y = oy + cell.y as usize;
            if y < height && x + 1 < width {
                grid[y][x] = (ch, style);
                grid[y][x + 1] = (ch, style);
            }
        };

        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                put(Cell::new(x, y), '·', Style::default().fg(Color::Rgb(30, 45, 32)).bg(BG));
            }
        }
        put(self.food, '█', Style::default().fg(Color::Rgb(230, 60, 60)).bg(BG));
        for (i, seg) in self.body.iter().enumerate() {
            let color = if i == 0 {
                Color::Rgb(120, 255, 120)
            } else {
                Color::Rgb(40, 170, 70)
            };
            put(*seg, '█', Style::default().fg(color).bg(BG));
        }

        grid_lines(grid)
    }
}

impl Default for Snake {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Snake {
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
        let Some(key) = input.pressed_key() else { return };
        if self.handle_common_key(key) {
            return;
        }
        let dir = match key.code {
            KeyCode::Up => Direction::Up,
            KeyCode::Down => Direction::Down,
            KeyCode::Left => Direction::Left,
            KeyCode::Right => Direction::Right,
            _ => return,
        };
        self.change_direction(dir);
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 200, 90)))
            .title(" 🐍 Snake ")
            .title_style(Style::default().fg(Color::Rgb(120, 255, 120)).add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(layout::Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(inner);

        let status = Line::from(vec![
            Span::styled(" 🐍 ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Length: {} ", self.body.len()),
                Style::default().fg(Color::Green),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("🏆 High: {} ", self.high_score),
                Style::default().fg(Color::Cyan),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let lines = self.render_field(chunks[1].width as usize, chunks[1].height as usize);
        frame.render_widget(Paragraph::new(lines), chunks[1]);

        let bottom = phase_banner(self.phase, self.score).unwrap_or_else(|| {
            key_hints(&[("↑↓←→", "Steer"), ("P", "Pause"), ("R", "Restart"), ("Esc", "Menu")])
        });
        frame.render_widget(Paragraph::new(bottom), chunks[2]);
    }

    fn reset(&mut self) {
        let hs = self.high_score;
        *self = Snake::with_rng(self.rng.clone());
        self.high_score = hs;
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

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing() -> Snake {
        let mut s = Snake::with_seed(7);
        s.start();
        s
    }

    fn with_body(cells: &[(i32, i32)], dir: Direction) -> Snake {
        let mut s = playing();
        s.body = cells.iter().map(|&(x, y)| Cell::new(x, y)).collect();
        s.direction = dir;
        s.queued = dir;
        s.food = Cell::new(0, 0);
        s
    }

    #[test]
    fn first_step_moves_head_right() {
        let mut s = playing();
        assert_eq!(s.advance(), Step::Moved);
        assert_eq!(s.body().copied().collect::<Vec<_>>(), vec![Cell::new(11, 10)]);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut s = playing();
        s.place_food(Cell::new(11, 10));
        assert_eq!(s.advance(), Step::Ate);
        assert_eq!(s.score(), 10);
        assert_eq!(s.len(), 2);
        assert_eq!(s.head(), Cell::new(11, 10));
        assert!(!s.body().any(|c| *c == s.food()));
    }

    #[test]
    fn reversing_is_rejected() {
        let mut s = playing();
        assert!(!s.change_direction(Direction::Left));
        assert!(s.change_direction(Direction::Up));
        s.advance();
        assert_eq!(s.head(), Cell::new(10, 9));
        assert!(!s.change_direction(Direction::Down));
    }

    #[test]
    fn quick_double_turn_cannot_reverse_between_steps() {
        let mut s = playing();
        assert!(s.change_direction(Direction::Up));
        // Still travelling right until the next step, so left stays illegal
        assert!(!s.change_direction(Direction::Left));
    }

    #[test]
    fn wall_ends_the_game() {
        let mut s = with_body(&[(19, 4)], Direction::Right);
        assert_eq!(s.advance(), Step::Crashed);
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.head(), Cell::new(19, 4));
        assert_eq!(s.advance(), Step::Idle);
    }

    #[test]
    fn running_into_own_body_ends_the_game() {
        // Head at (5,5) heading down into (5,6)
        let mut s = with_body(&[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)], Direction::Down);
        assert_eq!(s.advance(), Step::Crashed);
        assert!(s.is_game_over());
    }

    #[test]
    fn tail_cell_still_counts_as_body() {
        let mut s = with_body(&[(5, 5), (6, 5), (6, 6), (5, 6)], Direction::Down);
        assert_eq!(s.advance(), Step::Crashed);
    }

    #[test]
    fn tick_follows_step_interval() {
        let mut s = playing();
        s.tick(Duration::from_millis(100));
        assert_eq!(s.head(), START);
        s.tick(Duration::from_millis(60));
        assert_eq!(s.head(), Cell::new(11, 10));
    }

    #[test]
    fn paused_game_does_not_move() {
        let mut s = playing();
        s.toggle_pause();
        assert_eq!(s.phase(), Phase::Paused);
        s.tick(Duration::from_secs(1));
        assert_eq!(s.head(), START);
        assert_eq!(s.advance(), Step::Idle);
    }

    #[test]
    fn reset_keeps_high_score() {
        let mut s = playing();
        s.place_food(Cell::new(11, 10));
        s.advance();
        s.reset();
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.score(), 0);
        assert_eq!(s.high_score(), 10);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        let mut s = playing();
        let mut cells: Vec<Cell> = Vec::new();
        // Serpentine over the whole board, head at (0,0) with food next to it
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let x = if y % 2 == 0 { x } else { GRID_SIZE - 1 - x };
                cells.push(Cell::new(x, y));
            }
        }
        let food = cells.remove(0);
        s.body = cells.into_iter().collect();
        s.direction = Direction::Left;
        s.queued = Direction::Left;
        s.place_food(food);
        assert_eq!(s.head(), Cell::new(1, 0));
        assert_eq!(s.advance(), Step::Ate);
        assert!(s.is_game_over());
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn head_moves_by_unit_vector(x in 1..(GRID_SIZE - 1), y in 1..(GRID_SIZE - 1), dir in any_direction()) {
            let mut s = with_body(&[(x, y)], Direction::Up);
            s.direction = dir;
            s.queued = dir;
            let before = s.head();
            let step = s.advance();
            let (dx, dy) = dir.unit();
            prop_assert_ne!(step, Step::Crashed);
            prop_assert_eq!(s.head(), before.offset(dx, dy));
            prop_assert_eq!(s.len(), if step == Step::Ate { 2 } else { 1 });
        }
    }
}
