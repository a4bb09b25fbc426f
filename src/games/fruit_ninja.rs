use std::time::Duration;

use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::geometry::{cell_to_board, point_in_circle};
use crate::games::{grid_lines, key_hints, phase_banner, Game, Input, Phase};
use crate::scheduler::Scheduler;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
/// Items below this line are gone for good.
pub const FALL_LIMIT: f32 = FIELD_HEIGHT + 100.0;
pub const START_LIVES: u32 = 3;

const STEP_INTERVAL: Duration = Duration::from_millis(16);
const SPAWN_CHANCE: f64 = 0.02;
const BOMB_CHANCE: f64 = 0.15;
const GRAVITY: f32 = 0.5;
const FRUIT_POINTS: u32 = 10;
const BLADE_STEP: f32 = 40.0;

const BG: Color = Color::Rgb(26, 26, 46);
const FRUIT_COLORS: [Color; 8] = [
    Color::Rgb(230, 40, 40),
    Color::Rgb(255, 150, 20),
    Color::Rgb(250, 220, 60),
    Color::Rgb(140, 60, 200),
    Color::Rgb(240, 60, 110),
    Color::Rgb(120, 200, 60),
    Color::Rgb(255, 180, 140),
    Color::Rgb(190, 20, 60),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Fruit,
    Bomb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub kind: ItemKind,
    pub sliced: bool,
    pub radius: f32,
    variety: usize,
}

pub struct FruitNinja {
    items: Vec<Item>,
    next_id: u64,
    score: u32,
    high_score: u32,
    lives: u32,
    phase: Phase,
    spawn_chance: f64,
    blade: (f32, f32),
    timer: Scheduler,
    rng: StdRng,
    viewport: Rect,
}

impl FruitNinja {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            next_id: 0,
            score: 0,
            high_score: 0,
            lives: START_LIVES,
            phase: Phase::Ready,
            spawn_chance: SPAWN_CHANCE,
            blade: (FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
            timer: Scheduler::new(STEP_INTERVAL),
            rng,
            viewport: Rect::default(),
        }
    }

    #[cfg(test)]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[cfg(test)]
    pub fn item(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    #[cfg(test)]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    #[cfg(test)]
    pub fn blade(&self) -> (f32, f32) {
        self.blade
    }

    /// Throws an item into the field and returns its id.
    pub fn launch(&mut self, kind: ItemKind, x: f32, y: f32, vx: f32, vy: f32, radius: f32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let variety = self.rng.gen_range(0..FRUIT_COLORS.len());
        self.items.push(Item {
            id,
            x,
            y,
            vx,
            vy,
            kind,
            sliced: false,
            radius,
            variety,
        });
        id
    }

    /// Random throw from below the visible field.
    pub fn spawn_item(&mut self) -> u64 {
        let kind = if self.rng.gen_bool(BOMB_CHANCE) {
            ItemKind::Bomb
        } else {
            ItemKind::Fruit
        };
        let x = self.rng.gen::<f32>() * (FIELD_WIDTH - 100.0) + 50.0;
        let vx = (self.rng.gen::<f32>() - 0.5) * 8.0;
        let vy = -15.0 - self.rng.gen::<f32>() * 10.0;
        let radius = 40.0 + self.rng.gen::<f32>() * 20.0;
        self.launch(kind, x, FIELD_HEIGHT + 50.0, vx, vy, radius)
    }

    /// One simulation step: ballistic motion, culling, then a chance to spawn.
    pub fn advance(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        for item in &mut self.items {
            item.x += item.vx;
            item.y += item.vy;
            item.vy += GRAVITY;
        }

        let mut missed = 0;
        self.items.retain(|item| {
            if item.y > FALL_LIMIT {
                if item.kind == ItemKind::Fruit && !item.sliced {
                    missed += 1;
                }
                return false;
            }
            true
        });
        if missed > 0 {
            self.lives = self.lives.saturating_sub(missed);
            if self.lives == 0 {
                log::debug!("fruit ninja out of lives with score {}", self.score);
                self.game_over();
                return;
            }
        }

        if self.rng.gen_bool(self.spawn_chance) {
            self.spawn_item();
        }
    }

    /// Cuts every unsliced item under the pointer. Returns how many were cut.
    pub fn slice(&mut self, x: f32, y: f32) -> usize {
        if self.phase != Phase::Playing {
            return 0;
        }
        let mut cut = 0;
        let mut hit_bomb = false;
        for item in self.items.iter_mut().filter(|i| !i.sliced) {
            if point_in_circle(x, y, item.x, item.y, item.radius) {
                item.sliced = true;
                cut += 1;
                match item.kind {
                    ItemKind::Fruit => {
                        self.score += FRUIT_POINTS;
                        self.high_score = self.high_score.max(self.score);
                    }
                    ItemKind::Bomb => hit_bomb = true,
                }
            }
        }
        if hit_bomb {
            log::debug!("fruit ninja bomb sliced with score {}", self.score);
            self.game_over();
        }
        cut
    }

    fn move_blade(&mut self, dx: f32, dy: f32) {
        self.blade.0 = (self.blade.0 + dx).clamp(0.0, FIELD_WIDTH);
        self.blade.1 = (self.blade.1 + dy).clamp(0.0, FIELD_HEIGHT);
        self.slice(self.blade.0, self.blade.1);
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.timer.cancel();
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let bg = Style::default().bg(BG);
        let mut grid: Vec<Vec<(char, Style)>> = vec![vec![(' ', bg); width]; height];
        if width == 0 || height == 0 {
            return grid_lines(grid);
        }
        let sx = width as f32 / FIELD_WIDTH;
        let sy = height as f32 / FIELD_HEIGHT;

        for item in &self.items {
            let (ch, color) = match (item.kind, item.sliced) {
                (ItemKind::Bomb, false) => ('▓', Color::Rgb(90, 90, 100)),
                (ItemKind::Bomb, true) => ('✹', Color::Rgb(255, 80, 30)),
                (ItemKind::Fruit, false) => ('█', FRUIT_COLORS[item.variety]),
                (ItemKind::Fruit, true) => ('░', FRUIT_COLORS[item.variety]),
            };
            let style = Style::default().fg(color).bg(BG);

            // Fill every terminal cell whose centre lies inside the item
            let x0 = ((item.x - item.radius) * sx).floor().max(0.0) as usize;
            let x1 = (((item.x + item.radius) * sx).ceil().max(0.0) as usize).min(width);
            let y0 = ((item.y - item.radius) * sy).floor().max(0.0) as usize;
            let y1 = (((item.y + item.radius) * sy).ceil().max(0.0) as usize).min(height);
            let mut drawn = false;
            for cy in y0..y1 {
                for cx in x0..x1 {
                    let bx = (cx as f32 + 0.5) / sx;
                    let by = (cy as f32 + 0.5) / sy;
                    if point_in_circle(bx, by, item.x, item.y, item.radius) {
                        grid[cy][cx] = (ch, style);
                        drawn = true;
                    }
                }
            }
            if !drawn {
                let cx = (item.x * sx) as usize;
                let cy = (item.y * sy) as usize;
                if item.x >= 0.0 && item.y >= 0.0 && cx < width && cy < height {
                    grid[cy][cx] = (ch, style);
                }
            }
        }

        let bx = ((self.blade.0 * sx) as usize).min(width - 1);
        let by = ((self.blade.1 * sy) as usize).min(height - 1);
        grid[by][bx] = ('╋', Style::default().fg(Color::White).bg(BG).add_modifier(Modifier::BOLD));

        grid_lines(grid)
    }
}

impl Default for FruitNinja {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for FruitNinja {
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
        match input {
            Input::Key(_) => {
                let Some(key) = input.pressed_key() else { return };
                if self.handle_common_key(key) || self.phase != Phase::Playing {
                    return;
                }
                match key.code {
                    KeyCode::Left => self.move_blade(-BLADE_STEP, 0.0),
                    KeyCode::Right => self.move_blade(BLADE_STEP, 0.0),
                    KeyCode::Up => self.move_blade(0.0, -BLADE_STEP),
                    KeyCode::Down => self.move_blade(0.0, BLADE_STEP),
                    KeyCode::Char(' ') => self.move_blade(0.0, 0.0),
                    _ => {}
                }
            }
            Input::Mouse(mouse) => {
                let Some((x, y)) = cell_to_board(self.viewport, mouse.column, mouse.row, FIELD_WIDTH, FIELD_HEIGHT) else {
                    return;
                };
                self.blade = (x, y);
                if matches!(
                    mouse.kind,
                    MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
                ) {
                    self.slice(x, y);
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(255, 150, 40)))
            .title(" 🍉 Fruit Ninja ")
            .title_style(Style::default().fg(Color::Rgb(255, 190, 80)).add_modifier(Modifier::BOLD));
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
            Span::styled(" 🍉 ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Lives: {} ", "♥ ".repeat(self.lives as usize)),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
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
            key_hints(&[
                ("Mouse drag", "Slice"),
                ("↑↓←→", "Swing blade"),
                ("Space", "Cut"),
                ("P", "Pause"),
                ("R", "Restart"),
                ("Esc", "Menu"),
            ])
        });
        frame.render_widget(Paragraph::new(bottom), chunks[2]);
    }

    fn reset(&mut self) {
        let hs = self.high_score;
        let viewport = self.viewport;
        let spawn_chance = self.spawn_chance;
        *self = FruitNinja::with_rng(self.rng.clone());
        self.high_score = hs;
        self.viewport = viewport;
        self.spawn_chance = spawn_chance;
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
