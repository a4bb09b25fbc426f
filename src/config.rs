use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const NAME_MAX_CHARS: usize = 16;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pre-filled into the name prompt at game over.
    pub player_name: String,
    pub tick_rate_ms: u64,
    /// Fixed RNG seed for reproducible sessions; entropy when absent.
    pub seed: Option<u64>,
    /// Overrides the score database location.
    pub scores_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            tick_rate_ms: 16,
            seed: None,
            scores_path: None,
        }
    }
}

impl Settings {
    /// Tick rates outside 1..=250 ms make the games unplayable.
    pub fn tick_rate_ms(&self) -> u64 {
        self.tick_rate_ms.clamp(1, 250)
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub scores_path: PathBuf,
    pub log_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "retrocade", "Retrocade")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        scores_path: dir.join("scores.json"),
        log_path: dir.join("retrocade.log"),
    })
}

pub fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(e) => log::warn!("ignoring malformed {}: {e}", path.display()),
        }
    }
    Settings::default()
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let data = serde_json::to_vec_pretty(s)?;
    write_atomic(path, &data)
}

/// Writes `data` next to `path` and renames it over the target.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    // Windows refuses to rename over an existing file
    if cfg!(windows) && path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Trims a typed player name and caps it at the display width.
/// Returns `None` for names that are blank after trimming.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name: String = raw.trim().chars().take(NAME_MAX_CHARS).collect();
    let name = name.trim_end().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("retrocade-config-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn settings_survive_a_save_and_load() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("settings.json");
        let settings = Settings {
            player_name: "ACE".into(),
            tick_rate_ms: 20,
            seed: Some(7),
            scores_path: None,
        };
        save_settings_atomic(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
        assert!(!path.with_extension("json.tmp").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_or_garbled_file_gives_defaults() {
        let dir = temp_dir("garbled");
        let path = dir.join("settings.json");
        assert_eq!(load_settings(&path), Settings::default());
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = temp_dir("partial");
        let path = dir.join("settings.json");
        fs::write(&path, r#"{"player_name":"Zed"}"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.player_name, "Zed");
        assert_eq!(s.tick_rate_ms, 16);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn names_are_trimmed_and_capped() {
        assert_eq!(normalize_name("  bob  ").as_deref(), Some("bob"));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(
            normalize_name("abcdefghijklmnopqrstuvwxyz").as_deref(),
            Some("abcdefghijklmnop")
        );
    }
}
