//! Save backends for the CLI: JSON files in a directory, or nothing at all.
use nuzlocke_core::{GameState, GameStorage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One pretty-printed `<slot>.json` file per save slot.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn slot_path(&self, save_name: &str) -> PathBuf {
        let file_name: String = save_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl GameStorage for JsonFileStorage {
    type Error = io::Error;

    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_vec_pretty(game_state)?;
        fs::write(self.slot_path(save_name), payload)
    }

    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
        match fs::read(self.slot_path(save_name)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        match fs::remove_file(self.slot_path(save_name)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Storage that never holds anything; every run starts fresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ephemeral;

impl GameStorage for Ephemeral {
    type Error = io::Error;

    fn save_game(&self, _save_name: &str, _game_state: &GameState) -> Result<(), Self::Error> {
        Ok(())
    }

    fn load_game(&self, _save_name: &str) -> Result<Option<GameState>, Self::Error> {
        Ok(None)
    }

    fn delete_save(&self, _save_name: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuzlocke_core::Action;

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "nuzlocke-saves-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn json_saves_roundtrip_and_delete() {
        let storage = JsonFileStorage::new(&temp_dir("roundtrip"));
        assert!(storage.load_game("main").unwrap().is_none());

        let mut state = GameState::default();
        state.apply(Action::UnlockRoute("Lake Verity".to_string()));
        state.apply(Action::IncreaseAceLevel(7));
        storage.save_game("main", &state).unwrap();
        assert_eq!(storage.load_game("main").unwrap(), Some(state));

        storage.delete_save("main").unwrap();
        storage.delete_save("main").unwrap();
        assert!(storage.load_game("main").unwrap().is_none());
    }

    #[test]
    fn slot_names_cannot_escape_the_directory() {
        let storage = JsonFileStorage::new(Path::new("saves"));
        assert_eq!(
            storage.slot_path("../etc/passwd"),
            Path::new("saves").join("___etc_passwd.json")
        );
    }

    #[test]
    fn ephemeral_storage_forgets_everything() {
        Ephemeral.save_game("main", &GameState::default()).unwrap();
        assert!(Ephemeral.load_game("main").unwrap().is_none());
    }
}
