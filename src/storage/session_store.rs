//! Session persistence: one directory per tournament.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::config::TournamentConfig;
use crate::models::{History, Roster, Round, RoundStatus};
use crate::session::{TournamentInfo, TournamentSession};

const SESSION_FILE: &str = "session.json";
const ROUNDS_FILE: &str = "rounds.jsonl";

/// Contents of `session.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionHeader {
    info: TournamentInfo,
    roster: Roster,
    config: TournamentConfig,
}

/// Reads and writes tournament sessions under a data directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    config: StorageConfig,
}

impl SessionStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.config.tournament_dir(id).join(SESSION_FILE)
    }

    fn rounds_path(&self, id: &str) -> PathBuf {
        self.config.tournament_dir(id).join(ROUNDS_FILE)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.session_path(id).exists()
    }

    /// Write the whole session, replacing any previous copy.
    pub fn save(&self, session: &TournamentSession) -> Result<(), StorageError> {
        let id = session.info.id.as_str();
        let dir = self.config.tournament_dir(id);
        fs::create_dir_all(&dir)?;

        let header = SessionHeader {
            info: session.info.clone(),
            roster: session.roster.clone(),
            config: session.config().clone(),
        };
        fs::write(self.session_path(id), serde_json::to_string_pretty(&header)?)?;

        let mut rounds: Vec<Round> = session.history().rounds().to_vec();
        rounds.extend(session.pending().cloned());
        let written = JsonlWriter::new(self.rounds_path(id)).write_all(&rounds)?;

        debug!("Saved tournament {} ({} rounds) to {:?}", id, written, dir);
        Ok(())
    }

    /// Load a session. A trailing pending round is split off the history.
    pub fn load(&self, id: &str) -> Result<TournamentSession, StorageError> {
        let path = self.session_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        let header: SessionHeader = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let mut rounds: Vec<Round> = JsonlReader::new(self.rounds_path(id)).read_all()?;

        let pending = match rounds.last() {
            Some(last) if last.status == RoundStatus::Pending => rounds.pop(),
            _ => None,
        };
        let history = History::from_rounds(rounds).map_err(crate::session::SessionError::from)?;

        info!(
            "Loaded tournament {} with {} locked rounds",
            header.info.id,
            history.len()
        );
        let session =
            TournamentSession::restore(header.info, header.roster, header.config, history, pending)?;
        Ok(session)
    }

    /// Ids of all stored tournaments, sorted.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let dir = self.config.tournaments_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.path().join(SESSION_FILE).exists() {
                ids.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use crate::models::WinnerSide;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> SessionStore {
        SessionStore::new(StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    fn session() -> TournamentSession {
        let info = TournamentInfo::new("Sunday Social", "Club");
        TournamentSession::new(
            info,
            &["Ana", "Ben", "Cas", "Dee", "Eli", "Fay"],
            TournamentConfig::new(6, Format::WinnerStay6p1c),
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_load_with_pending_round() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut session = session();
        let mut rng = StdRng::seed_from_u64(3);

        session.draw(&mut rng).unwrap();
        session.start().unwrap();
        session.record_outcome(1, WinnerSide::A, 21, 14).unwrap();
        session.draw(&mut rng).unwrap();
        store.save(&session).unwrap();

        let loaded = store.load(session.info.id.as_str()).unwrap();
        assert_eq!(loaded.info, session.info);
        assert_eq!(loaded.roster, session.roster);
        assert_eq!(loaded.history(), session.history());
        assert_eq!(loaded.pending(), session.pending());
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            store(&temp_dir).load("nope"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(store.list().unwrap().is_empty());

        let session = session();
        store.save(&session).unwrap();

        assert!(store.exists(session.info.id.as_str()));
        assert_eq!(store.list().unwrap(), vec![session.info.id.to_string()]);
    }

    #[test]
    fn test_truncated_round_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut session = session();
        let mut rng = StdRng::seed_from_u64(8);

        for number in 1..=2 {
            session.draw(&mut rng).unwrap();
            session.start().unwrap();
            session.record_outcome(number, WinnerSide::A, 21, 11).unwrap();
        }
        store.save(&session).unwrap();

        let id = session.info.id.as_str();
        let path = store.rounds_path(id);
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        let cut = &lines[1][..lines[1].len() / 2];
        fs::write(&path, format!("{}\n{}\n", lines[0], cut)).unwrap();

        assert!(matches!(
            store.load(id),
            Err(StorageError::Malformed { line: 2, .. })
        ));
    }
}
