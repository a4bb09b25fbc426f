use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};

use crate::config::{normalize_name, Settings, NAME_MAX_CHARS};
use crate::games::fruit_ninja::FruitNinja;
use crate::games::pong::Pong;
use crate::games::snake::Snake;
use crate::games::tetris::Tetris;
use crate::games::{Game, GameId, Input, KeyHold};
use crate::scores::{GameFilter, ScoreSink, ScoreStore, LEADERBOARD_LIMIT};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tab {
    Home,
    Snake,
    Pong,
    Tetris,
    FruitNinja,
    Leaderboard,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Home, Tab::Snake, Tab::Pong, Tab::Tetris, Tab::FruitNinja, Tab::Leaderboard]
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Home => " Home ",
            Tab::Snake => " Snake ",
            Tab::Pong => " Pong ",
            Tab::Tetris => " Tetris ",
            Tab::FruitNinja => " Fruit Ninja ",
            Tab::Leaderboard => " Leaderboard ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Snake => 1,
            Tab::Pong => 2,
            Tab::Tetris => 3,
            Tab::FruitNinja => 4,
            Tab::Leaderboard => 5,
        }
    }

    pub fn game(&self) -> Option<GameId> {
        match self {
            Tab::Snake => Some(GameId::Snake),
            Tab::Pong => Some(GameId::Pong),
            Tab::Tetris => Some(GameId::Tetris),
            Tab::FruitNinja => Some(GameId::FruitNinja),
            Tab::Home | Tab::Leaderboard => None,
        }
    }

    pub fn for_game(id: GameId) -> Tab {
        match id {
            GameId::Snake => Tab::Snake,
            GameId::Pong => Tab::Pong,
            GameId::Tetris => Tab::Tetris,
            GameId::FruitNinja => Tab::FruitNinja,
        }
    }
}

/// Name prompt shown after a scoring run ends.
pub struct NameEntry {
    pub game: GameId,
    pub score: u32,
    pub buffer: String,
    pub error: Option<String>,
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub selected_game: usize, // 0-3 for home screen game selection
    pub snake: Snake,
    pub pong: Pong,
    pub tetris: Tetris,
    pub fruit_ninja: FruitNinja,
    pub store: ScoreStore,
    pub show_high_scores: bool,
    pub name_entry: Option<NameEntry>,
    pub status: Option<String>,
    pub leaderboard_filter: GameFilter,
    pub leaderboard_scroll: usize,
    default_name: String,
    /// Which games already prompted for their current finished run
    submitted: [bool; 4],
    last_tick: Instant,
}

impl App {
    pub fn new(settings: &Settings, store: ScoreStore) -> Self {
        let seeded = |offset: u64| settings.seed.map(|s| s.wrapping_add(offset));
        Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            snake: seeded(0).map_or_else(Snake::new, Snake::with_seed),
            pong: seeded(1).map_or_else(Pong::new, Pong::with_seed),
            tetris: seeded(2).map_or_else(Tetris::new, Tetris::with_seed),
            fruit_ninja: seeded(3).map_or_else(FruitNinja::new, FruitNinja::with_seed),
            store,
            show_high_scores: false,
            name_entry: None,
            status: None,
            leaderboard_filter: GameFilter::All,
            leaderboard_scroll: 0,
            default_name: settings.player_name.clone(),
            submitted: [false; 4],
            last_tick: Instant::now(),
        }
    }

    /// Last name a score was saved under, or the configured default.
    pub fn player_name(&self) -> &str {
        &self.default_name
    }

    pub fn game(&self, id: GameId) -> &dyn Game {
        match id {
            GameId::Snake => &self.snake,
            GameId::Pong => &self.pong,
            GameId::Tetris => &self.tetris,
            GameId::FruitNinja => &self.fruit_ninja,
        }
    }

    pub fn game_mut(&mut self, id: GameId) -> &mut dyn Game {
        match id {
            GameId::Snake => &mut self.snake,
            GameId::Pong => &mut self.pong,
            GameId::Tetris => &mut self.tetris,
            GameId::FruitNinja => &mut self.fruit_ninja,
        }
    }

    /// Best score of each game since launch, in tile order.
    pub fn session_bests(&self) -> [u32; 4] {
        GameId::ALL.map(|id| self.game(id).high_score())
    }

    /// Tells every game whether the terminal reports key releases.
    pub fn set_key_hold(&mut self, mode: KeyHold) {
        for id in GameId::ALL {
            self.game_mut(id).set_key_hold(mode);
        }
    }

    pub fn on_tick(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_tick;
        self.last_tick = now;

        // Games stay frozen while the name prompt is open
        if self.name_entry.is_some() {
            return;
        }
        if let Some(id) = self.current_tab.game() {
            self.game_mut(id).tick(dt);
            self.check_game_over(id);
        }
    }

    fn check_game_over(&mut self, id: GameId) {
        let idx = id.index();
        let (over, score) = {
            let game = self.game(id);
            (game.is_game_over(), game.score())
        };
        if !over {
            self.submitted[idx] = false;
            return;
        }
        if self.submitted[idx] {
            return;
        }
        self.submitted[idx] = true;
        log::debug!("{id} finished with {score}");
        if score > 0 {
            self.status = None;
            self.name_entry = Some(NameEntry {
                game: id,
                score,
                buffer: self.default_name.clone(),
                error: None,
            });
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.name_entry.is_some() {
            if key.kind != KeyEventKind::Release {
                self.handle_name_input(key);
            }
            return;
        }

        // Releases only matter to games that track held keys
        if key.kind == KeyEventKind::Release {
            if let Some(id) = self.current_tab.game() {
                self.game_mut(id).handle_input(Input::Key(key));
            }
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                if matches!(self.current_tab, Tab::Home | Tab::Leaderboard) {
                    self.should_quit = true;
                    return;
                }
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_tab();
                } else {
                    self.next_tab();
                }
                return;
            }
            KeyCode::BackTab => {
                self.prev_tab();
                return;
            }
            KeyCode::Esc => {
                if self.current_tab != Tab::Home {
                    self.switch_to(Tab::Home);
                } else {
                    self.show_high_scores = false;
                }
                return;
            }
            _ => {}
        }

        match self.current_tab {
            Tab::Home => self.handle_home_key(key),
            Tab::Leaderboard => self.handle_leaderboard_key(key),
            tab => {
                if let Some(id) = tab.game() {
                    self.game_mut(id).handle_input(Input::Key(key));
                    self.check_game_over(id);
                }
            }
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.name_entry.is_some() {
            return;
        }
        if let Some(id) = self.current_tab.game() {
            self.game_mut(id).handle_input(Input::Mouse(mouse));
            self.check_game_over(id);
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        if !key.modifiers.is_empty() && !key.modifiers.contains(KeyModifiers::SHIFT) {
            return;
        }
        match key.code {
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as u8 - b'1') as usize;
                self.selected_game = idx;
                self.switch_to(Tab::for_game(GameId::ALL[idx]));
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.show_high_scores = !self.show_high_scores;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => self.switch_to(Tab::Leaderboard),
            // Tiles form a 2x2 grid
            KeyCode::Right | KeyCode::Left => self.selected_game ^= 1,
            KeyCode::Down | KeyCode::Up => self.selected_game ^= 2,
            KeyCode::Enter => {
                let id = GameId::ALL[self.selected_game % GameId::ALL.len()];
                self.switch_to(Tab::for_game(id));
            }
            _ => {}
        }
    }

    fn handle_leaderboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right => {
                self.leaderboard_filter = self.leaderboard_filter.next();
                self.leaderboard_scroll = 0;
            }
            KeyCode::Left => {
                self.leaderboard_filter = self.leaderboard_filter.prev();
                self.leaderboard_scroll = 0;
            }
            KeyCode::Char(c @ '1'..='5') => {
                self.leaderboard_filter = GameFilter::TABS[(c as u8 - b'1') as usize];
                self.leaderboard_scroll = 0;
            }
            KeyCode::Down => {
                let rows = self.store.top_scores(self.leaderboard_filter, LEADERBOARD_LIMIT).len();
                if self.leaderboard_scroll + 1 < rows {
                    self.leaderboard_scroll += 1;
                }
            }
            KeyCode::Up => self.leaderboard_scroll = self.leaderboard_scroll.saturating_sub(1),
            _ => {}
        }
    }

    fn handle_name_input(&mut self, key: KeyEvent) {
        let Some(entry) = self.name_entry.as_mut() else { return };
        match key.code {
            KeyCode::Enter => {
                let Some(name) = normalize_name(&entry.buffer) else {
                    entry.error = Some("Name required".to_string());
                    return;
                };
                let (game, score) = (entry.game, entry.score);
                self.submit(&name, game, score);
            }
            KeyCode::Backspace => {
                entry.buffer.pop();
                entry.error = None;
            }
            KeyCode::Esc => {
                log::info!("{} score of {} not submitted", entry.game, entry.score);
                self.name_entry = None;
                self.status = Some("Score not saved".to_string());
            }
            KeyCode::Char(c) => {
                if entry.buffer.chars().count() < NAME_MAX_CHARS && !c.is_control() {
                    entry.buffer.push(c);
                    entry.error = None;
                }
            }
            _ => {}
        }
    }

    /// Saves the finished run. On failure the prompt stays open with the
    /// error so the player can retry or skip.
    fn submit(&mut self, name: &str, game: GameId, score: u32) {
        match self.store.save_score(name, game, score) {
            Ok(()) => {
                self.name_entry = None;
                self.default_name = name.to_string();
                self.status = Some(format!("Saved {score} for {name} on the {game} leaderboard"));
            }
            Err(e) => {
                log::warn!("score submission failed: {e:#}");
                if let Some(entry) = self.name_entry.as_mut() {
                    entry.error = Some(format!("Could not save score: {e}"));
                }
            }
        }
    }

    fn switch_to(&mut self, tab: Tab) {
        if tab == self.current_tab {
            return;
        }
        if let Some(id) = self.current_tab.game() {
            self.game_mut(id).pause();
        }
        self.current_tab = tab;
        self.status = None;
        if tab == Tab::Leaderboard {
            self.leaderboard_scroll = 0;
        }
    }

    fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.switch_to(tabs[(idx + 1) % tabs.len()]);
    }

    fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.switch_to(tabs[(idx + tabs.len() - 1) % tabs.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::fruit_ninja::ItemKind;
    use crate::games::Phase;

    fn app() -> App {
        let settings = Settings {
            player_name: "ACE".into(),
            seed: Some(3),
            ..Settings::default()
        };
        App::new(&settings, ScoreStore::in_memory())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    /// Plays Fruit Ninja to a bomb after `fruits` clean cuts.
    fn finish_fruit_ninja(app: &mut App, fruits: u32) {
        app.on_key(key(KeyCode::Char('4')));
        assert_eq!(app.current_tab, Tab::FruitNinja);
        app.on_key(key(KeyCode::Enter));
        for _ in 0..fruits {
            app.fruit_ninja.launch(ItemKind::Fruit, 100.0, 100.0, 0.0, 0.0, 30.0);
            app.fruit_ninja.slice(100.0, 100.0);
        }
        app.fruit_ninja.launch(ItemKind::Bomb, 500.0, 300.0, 0.0, 0.0, 30.0);
        app.fruit_ninja.slice(500.0, 300.0);
        assert_eq!(app.fruit_ninja.phase(), Phase::GameOver);
        app.on_tick();
    }

    #[test]
    fn scoring_run_prompts_with_default_name_and_saves() {
        let mut app = app();
        finish_fruit_ninja(&mut app, 3);
        let entry = app.name_entry.as_ref().unwrap();
        assert_eq!(entry.game, GameId::FruitNinja);
        assert_eq!(entry.score, 30);
        assert_eq!(entry.buffer, "ACE");

        app.on_key(key(KeyCode::Enter));
        assert!(app.name_entry.is_none());
        let rows = app.store.top_scores_for(GameId::FruitNinja, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].user_name.as_str(), rows[0].score), ("ACE", 30));

        // The same finished run is not offered twice
        app.on_tick();
        assert!(app.name_entry.is_none());
    }

    #[test]
    fn zero_score_is_never_submitted() {
        let mut app = app();
        finish_fruit_ninja(&mut app, 0);
        assert!(app.name_entry.is_none());
        assert_eq!(app.store.stats().entries, 0);
    }

    #[test]
    fn blank_name_keeps_the_prompt_open() {
        let mut app = app();
        finish_fruit_ninja(&mut app, 1);
        for _ in 0..3 {
            app.on_key(key(KeyCode::Backspace));
        }
        type_text(&mut app, "   ");
        app.on_key(key(KeyCode::Enter));
        let entry = app.name_entry.as_ref().unwrap();
        assert_eq!(entry.error.as_deref(), Some("Name required"));
        assert_eq!(app.store.stats().entries, 0);
    }

    #[test]
    fn typed_names_are_capped_and_trimmed() {
        let mut app = app();
        finish_fruit_ninja(&mut app, 2);
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Backspace));
        type_text(&mut app, " Player One Two Three");
        assert_eq!(app.name_entry.as_ref().unwrap().buffer.chars().count(), NAME_MAX_CHARS);
        app.on_key(key(KeyCode::Enter));
        let rows = app.store.top_scores(GameFilter::All, 10);
        assert_eq!(rows[0].user_name, "Player One Two");
    }

    #[test]
    fn escape_skips_submission() {
        let mut app = app();
        finish_fruit_ninja(&mut app, 2);
        app.on_key(key(KeyCode::Esc));
        assert!(app.name_entry.is_none());
        assert_eq!(app.store.stats().entries, 0);
        assert_eq!(app.current_tab, Tab::FruitNinja);
        assert_eq!(app.fruit_ninja.phase(), Phase::GameOver);
    }

    #[test]
    fn failed_save_keeps_the_prompt_for_a_retry() {
        let dir = std::env::temp_dir().join(format!("retrocade-app-missing-{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        let store = ScoreStore::open(&dir.join("scores.json")).unwrap();
        let mut app = App::new(&Settings::default(), store);
        finish_fruit_ninja(&mut app, 1);
        type_text(&mut app, "bo");
        app.on_key(key(KeyCode::Enter));
        let entry = app.name_entry.as_ref().unwrap();
        assert!(entry.error.as_deref().unwrap().starts_with("Could not save score"));
        assert_eq!(entry.buffer, "bo");
        assert_eq!(app.fruit_ninja.phase(), Phase::GameOver);
        assert_eq!(app.store.stats().entries, 0);

        // Retry once the directory exists
        std::fs::create_dir_all(&dir).unwrap();
        app.on_key(key(KeyCode::Enter));
        assert!(app.name_entry.is_none());
        assert_eq!(app.store.stats().entries, 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn restarting_allows_a_new_submission() {
        let mut app = app();
        finish_fruit_ninja(&mut app, 1);
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Char('r')));
        app.on_tick();
        app.on_key(key(KeyCode::Enter));
        app.fruit_ninja.launch(ItemKind::Fruit, 100.0, 100.0, 0.0, 0.0, 30.0);
        app.fruit_ninja.slice(100.0, 100.0);
        app.fruit_ninja.launch(ItemKind::Bomb, 500.0, 300.0, 0.0, 0.0, 30.0);
        app.fruit_ninja.slice(500.0, 300.0);
        app.on_tick();
        assert!(app.name_entry.is_some());
    }

    #[test]
    fn tabs_cycle_and_escape_goes_home() {
        let mut app = app();
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Snake);
        app.on_key(key(KeyCode::BackTab));
        app.on_key(key(KeyCode::BackTab));
        assert_eq!(app.current_tab, Tab::Leaderboard);
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.current_tab, Tab::Home);
        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn home_grid_selection() {
        let mut app = app();
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.selected_game, 1);
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.selected_game, 3);
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.current_tab, Tab::FruitNinja);
    }

    #[test]
    fn leaving_a_game_pauses_it() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('1')));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.snake.phase(), Phase::Playing);
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.snake.phase(), Phase::Paused);
    }

    #[test]
    fn key_hold_mode_reaches_the_games() {
        let mut app = app();
        assert_eq!(app.pong.key_hold(), KeyHold::Repeat);
        app.set_key_hold(KeyHold::Release);
        assert_eq!(app.pong.key_hold(), KeyHold::Release);
        assert_eq!(app.tetris.key_hold(), KeyHold::Release);
    }

    #[test]
    fn session_bests_follow_tile_order() {
        let mut app = app();
        finish_fruit_ninja(&mut app, 2);
        assert_eq!(app.session_bests(), [0, 0, 0, 20]);
    }

    #[test]
    fn leaderboard_filter_keys() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('l')));
        assert_eq!(app.current_tab, Tab::Leaderboard);
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.leaderboard_filter, GameFilter::Game(GameId::Snake));
        app.on_key(key(KeyCode::Char('3')));
        assert_eq!(app.leaderboard_filter, GameFilter::Game(GameId::FruitNinja));
        app.on_key(key(KeyCode::Left));
        app.on_key(key(KeyCode::Left));
        assert_eq!(app.leaderboard_filter, GameFilter::All);
    }
}
