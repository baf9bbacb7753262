//! Recording finished sessions: the recorder seam and its implementations.

use crate::constants::SAVE_VERSION;
use crate::persistence;
use crate::stats::{Dashboard, GameRecord, PlayerProfile, SessionSummary};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt player file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid player name: {0}")]
    InvalidName(String),
    #[error("name '{requested}' is already used by player '{existing}'")]
    NameTaken { requested: String, existing: String },
}

/// Receives the summary of every finished session.
///
/// Returns the player's updated profile; callers replace their own copy with
/// it rather than mutating shared state.
pub trait StatsRecorder {
    fn record_game_session(
        &mut self,
        player: &str,
        summary: &SessionSummary,
    ) -> Result<PlayerProfile, StoreError>;
}

/// Everything kept for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub profile: PlayerProfile,
    #[serde(default)]
    pub records: Vec<GameRecord>,
}

impl PlayerData {
    pub fn new(name: &str) -> Self {
        Self {
            profile: PlayerProfile::new(name, Utc::now()),
            records: Vec::new(),
        }
    }

    /// Append a record and fold it into the profile.
    pub fn record(&mut self, summary: &SessionSummary) -> PlayerProfile {
        self.records.push(GameRecord::from_summary(summary, Utc::now()));
        self.profile = self.profile.with_session(summary);
        self.profile.clone()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::from_records(&self.records)
    }
}

/// In-process recorder.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    players: HashMap<String, PlayerData>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self, name: &str) -> Option<&PlayerData> {
        self.players.get(name)
    }
}

impl StatsRecorder for MemoryRecorder {
    fn record_game_session(
        &mut self,
        player: &str,
        summary: &SessionSummary,
    ) -> Result<PlayerProfile, StoreError> {
        Ok(self
            .players
            .entry(player.to_string())
            .or_insert_with(|| PlayerData::new(player))
            .record(summary))
    }
}

#[derive(Serialize, Deserialize)]
struct PlayerSaveData {
    version: u32,
    #[serde(flatten)]
    data: PlayerData,
}

/// Listing entry for the player select screen.
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub name: String,
    pub filename: String,
    pub current_level: u32,
    pub best_score: u32,
    pub games_played: u32,
    pub last_played: i64,
    pub is_corrupted: bool,
}

/// One JSON file per player under `<data dir>/players/`.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    players_dir: PathBuf,
}

impl ProfileStore {
    /// Store rooted at the default data directory.
    pub fn new() -> io::Result<Self> {
        Self::with_dir(persistence::data_dir()?.join("players"))
    }

    /// Store rooted at an explicit directory, created if needed.
    pub fn with_dir(players_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let players_dir = players_dir.into();
        fs::create_dir_all(&players_dir)?;
        Ok(Self { players_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.players_dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name).map_err(StoreError::InvalidName)?;
        Ok(self
            .players_dir
            .join(format!("{}.json", sanitize_name(name))))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Load a player, creating a fresh profile if none is saved yet.
    ///
    /// Names that differ only in case or in space/underscore share a file;
    /// the saved player keeps it and any other spelling is refused.
    pub fn load_or_create(&self, name: &str) -> Result<PlayerData, StoreError> {
        let path = self.path_for(name)?;
        let name = name.trim();
        if !path.exists() {
            let data = PlayerData::new(name);
            self.save(&data)?;
            tracing::info!(player = name, "created player");
            return Ok(data);
        }
        let data = self.load_file(&path)?;
        if data.profile.name != name {
            return Err(StoreError::NameTaken {
                requested: name.to_string(),
                existing: data.profile.name,
            });
        }
        Ok(data)
    }

    pub fn load(&self, name: &str) -> Result<PlayerData, StoreError> {
        self.load_file(&self.path_for(name)?)
    }

    fn load_file(&self, path: &Path) -> Result<PlayerData, StoreError> {
        let json = fs::read_to_string(path)?;
        let save: PlayerSaveData = serde_json::from_str(&json)?;
        Ok(save.data)
    }

    pub fn save(&self, data: &PlayerData) -> Result<(), StoreError> {
        let path = self.path_for(&data.profile.name)?;
        let save = PlayerSaveData {
            version: SAVE_VERSION,
            data: data.clone(),
        };
        persistence::write_json(&path, &save)?;
        Ok(())
    }

    pub fn list_players(&self) -> Result<Vec<PlayerInfo>, StoreError> {
        let mut players = Vec::new();

        for entry in fs::read_dir(&self.players_dir)? {
            let path = entry?.path();

            // Only process .json files
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let filename = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_string();

            match self.load_file(&path) {
                Ok(data) => players.push(PlayerInfo {
                    name: data.profile.name.clone(),
                    filename,
                    current_level: data.profile.current_level,
                    best_score: data.profile.best_score,
                    games_played: data.profile.games_played,
                    last_played: data
                        .records
                        .last()
                        .map_or(data.profile.created_at.timestamp(), |r| {
                            r.created_at.timestamp()
                        }),
                    is_corrupted: false,
                }),
                Err(e) => {
                    tracing::warn!(file = %filename, error = %e, "unreadable player file");
                    players.push(PlayerInfo {
                        name: "[CORRUPTED]".to_string(),
                        filename,
                        current_level: 0,
                        best_score: 0,
                        games_played: 0,
                        last_played: 0,
                        is_corrupted: true,
                    });
                }
            }
        }

        // Most recently played first
        players.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        Ok(players)
    }
}

impl StatsRecorder for ProfileStore {
    fn record_game_session(
        &mut self,
        player: &str,
        summary: &SessionSummary,
    ) -> Result<PlayerProfile, StoreError> {
        let mut data = self.load_or_create(player)?;
        let profile = data.record(summary);
        self.save(&data)?;
        Ok(profile)
    }
}

pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if trimmed.chars().count() > 16 {
        return Err("Name must be 16 characters or less".to_string());
    }

    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_');

    if !valid_chars {
        return Err(
            "Name can only contain letters, numbers, spaces, hyphens, and underscores".to_string(),
        );
    }

    Ok(())
}

pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Operation;
    use crate::stats::RunningStats;

    fn scratch_store() -> ProfileStore {
        let dir = std::env::temp_dir().join(format!("math-runner-store-{}", uuid::Uuid::new_v4()));
        ProfileStore::with_dir(dir).unwrap()
    }

    fn summary(score: u32, level: u32) -> SessionSummary {
        let mut stats = RunningStats::new();
        for _ in 0..score / 10 {
            stats.record_correct(Operation::Addition, 1500);
        }
        stats.record_incorrect(Operation::Subtraction);
        SessionSummary::from_stats(score, level, &stats)
    }

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("Test 123").is_ok());
        assert!(validate_name("Runner-2").is_ok());
        assert!(validate_name("under_score").is_ok());
    }

    #[test]
    fn test_validate_name_invalid() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("ThisNameIsWayTooLong").is_err());
        assert!(validate_name("bad/name").is_err());
        assert!(validate_name("dots.json").is_err());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Ada"), "ada");
        assert_eq!(sanitize_name("  Test Player "), "test_player");
        assert_eq!(sanitize_name("Runner-2"), "runner-2");
    }

    #[test]
    fn test_memory_recorder_accumulates() {
        let mut recorder = MemoryRecorder::new();
        let first = recorder.record_game_session("Ada", &summary(30, 1)).unwrap();
        assert_eq!(first.games_played, 1);
        assert_eq!(first.best_score, 30);

        let second = recorder.record_game_session("Ada", &summary(20, 2)).unwrap();
        assert_eq!(second.games_played, 2);
        assert_eq!(second.best_score, 30);
        assert_eq!(second.total_score, 50);
        assert_eq!(second.current_level, 2);
        assert_eq!(recorder.player("Ada").unwrap().records.len(), 2);
        assert!(recorder.player("Bob").is_none());
    }

    #[test]
    fn test_profile_store_roundtrip() {
        let mut store = scratch_store();
        assert!(!store.exists("Ada"));

        let profile = store.record_game_session("Ada", &summary(40, 2)).unwrap();
        assert_eq!(profile.name, "Ada");
        assert!(store.exists("Ada"));

        let data = store.load("Ada").unwrap();
        assert_eq!(data.profile, profile);
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].score, 40);
        assert_eq!(data.records[0].operations, vec![Operation::Addition]);

        let dashboard = data.dashboard();
        assert_eq!(dashboard.best_score, 40);
        assert_eq!(dashboard.total_questions, 5);

        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_profile_store_rejects_invalid_name() {
        let mut store = scratch_store();
        let err = store
            .record_game_session("../escape", &summary(10, 1))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_colliding_names_do_not_share_a_profile() {
        let mut store = scratch_store();
        store.record_game_session("a b", &summary(20, 1)).unwrap();
        store.record_game_session("Ada", &summary(30, 1)).unwrap();

        for (requested, existing) in [("a_b", "a b"), ("ada", "Ada"), ("ADA", "Ada")] {
            let err = store
                .record_game_session(requested, &summary(90, 3))
                .unwrap_err();
            match err {
                StoreError::NameTaken {
                    requested: r,
                    existing: e,
                } => {
                    assert_eq!(r, requested);
                    assert_eq!(e, existing);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }

        // The owners' files are untouched
        let a_b = store.load("a b").unwrap();
        assert_eq!(a_b.profile.name, "a b");
        assert_eq!(a_b.records.len(), 1);
        assert_eq!(a_b.profile.best_score, 20);
        let ada = store.load("Ada").unwrap();
        assert_eq!(ada.records.len(), 1);
        assert_eq!(ada.profile.best_score, 30);

        // Same name with surrounding spaces is still the same player
        assert_eq!(store.load_or_create("  Ada ").unwrap().profile.name, "Ada");

        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_list_players_marks_corrupted() {
        let mut store = scratch_store();
        store.record_game_session("Ada", &summary(10, 1)).unwrap();
        fs::write(store.dir().join("broken.json"), "{ nope").unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        let players = store.list_players().unwrap();
        assert_eq!(players.len(), 2);
        let ada = players.iter().find(|p| p.name == "Ada").unwrap();
        assert_eq!(ada.games_played, 1);
        assert!(!ada.is_corrupted);
        assert!(players.iter().any(|p| p.is_corrupted));

        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_load_or_create_persists_new_player() {
        let store = scratch_store();
        let data = store.load_or_create("New Player").unwrap();
        assert_eq!(data.profile.games_played, 0);
        assert!(store.dir().join("new_player.json").exists());
        fs::remove_dir_all(store.dir()).ok();
    }
}
