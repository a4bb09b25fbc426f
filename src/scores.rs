use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::write_atomic;
use crate::games::GameId;

/// Rows shown on the leaderboard.
pub const LEADERBOARD_LIMIT: usize = 100;
/// Rows shown per game on the home screen.
pub const HOME_TOP: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub id: u64,
    pub user_name: String,
    pub game_name: String,
    pub score: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: u64,
    pub user_name: String,
    pub game_name: String,
    /// 1..=5
    pub rating: u8,
    pub comment_text: String,
    #[serde(default)]
    pub likes: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Database {
    scores: Vec<ScoreRow>,
    comments: Vec<CommentRow>,
}

/// Leaderboard filter tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameFilter {
    All,
    Game(GameId),
}

impl GameFilter {
    pub const TABS: [GameFilter; 5] = [
        GameFilter::All,
        GameFilter::Game(GameId::Snake),
        GameFilter::Game(GameId::FruitNinja),
        GameFilter::Game(GameId::Tetris),
        GameFilter::Game(GameId::Pong),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GameFilter::All => "All",
            GameFilter::Game(id) => id.as_str(),
        }
    }

    /// Stored names are matched through their canonical id, so legacy
    /// spellings land under the right tab.
    pub fn matches(&self, game_name: &str) -> bool {
        match self {
            GameFilter::All => true,
            GameFilter::Game(id) => GameId::from_name(game_name) == Some(*id),
        }
    }

    pub fn next(self) -> Self {
        let i = Self::TABS.iter().position(|f| *f == self).unwrap_or(0);
        Self::TABS[(i + 1) % Self::TABS.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::TABS.iter().position(|f| *f == self).unwrap_or(0);
        Self::TABS[(i + Self::TABS.len() - 1) % Self::TABS.len()]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    pub entries: usize,
    pub total_points: u64,
    pub comments: usize,
    /// `None` when there are no comments.
    pub average_rating: Option<f32>,
}

/// Destination for finished runs.
pub trait ScoreSink {
    fn save_score(&mut self, user_name: &str, game: GameId, score: u32) -> Result<()>;
}

/// Score and comment tables kept as one JSON document.
pub struct ScoreStore {
    db: Database,
    path: Option<PathBuf>,
}

impl ScoreStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            db: Database::default(),
            path: None,
        }
    }

    /// Opens the document at `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let db = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str::<Database>(&s)
                .with_context(|| format!("parsing score database {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Database::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading score database {}", path.display()))
            }
        };
        log::info!(
            "score database {} loaded: {} scores, {} comments",
            path.display(),
            db.scores.len(),
            db.comments.len()
        );
        Ok(Self {
            db,
            path: Some(path.to_path_buf()),
        })
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        let data = serde_json::to_vec_pretty(&self.db)?;
        write_atomic(path, &data)
    }

    fn next_score_id(&self) -> u64 {
        self.db.scores.iter().map(|r| r.id).max().map_or(1, |id| id + 1)
    }

    /// Highest scores first; ties keep the earlier submission first.
    pub fn top_scores(&self, filter: GameFilter, limit: usize) -> Vec<&ScoreRow> {
        let mut rows: Vec<&ScoreRow> = self
            .db
            .scores
            .iter()
            .filter(|r| filter.matches(&r.game_name))
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.created_at.cmp(&b.created_at)));
        rows.truncate(limit);
        rows
    }

    pub fn top_scores_for(&self, game: GameId, limit: usize) -> Vec<&ScoreRow> {
        self.top_scores(GameFilter::Game(game), limit)
    }

    /// Newest comments first.
    pub fn comments(&self, filter: GameFilter) -> Vec<&CommentRow> {
        let mut rows: Vec<&CommentRow> = self
            .db
            .comments
            .iter()
            .filter(|c| filter.matches(&c.game_name))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    /// Totals across every stored row, independent of the active tab.
    pub fn stats(&self) -> Stats {
        let comments = self.db.comments.len();
        let average_rating = if comments == 0 {
            None
        } else {
            let sum: u32 = self.db.comments.iter().map(|c| u32::from(c.rating)).sum();
            Some(sum as f32 / comments as f32)
        };
        Stats {
            entries: self.db.scores.len(),
            total_points: self.db.scores.iter().map(|r| u64::from(r.score)).sum(),
            comments,
            average_rating,
        }
    }
}

impl ScoreSink for ScoreStore {
    fn save_score(&mut self, user_name: &str, game: GameId, score: u32) -> Result<()> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            bail!("player name must not be empty");
        }
        let row = ScoreRow {
            id: self.next_score_id(),
            user_name: user_name.to_string(),
            game_name: game.as_str().to_string(),
            score,
            created_at: Utc::now(),
        };
        self.db.scores.push(row);
        if let Err(e) = self.persist() {
            self.db.scores.pop();
            return Err(e.context("saving score"));
        }
        log::info!("saved {score} for {user_name} in {game}");
        Ok(())
    }
}
