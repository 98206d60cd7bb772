//! Difficulty profile loader.

use std::path::Path;

use serde::Deserialize;

use event_core::{DifficultyProfile, ProfileSet};

use crate::loaders::{LoadResult, read_file};

/// On-disk shape of the profile file: a `[[profiles]]` table array.
#[derive(Deserialize)]
struct ProfileFile {
    profiles: Vec<DifficultyProfile>,
}

/// Loader for difficulty profiles from TOML files.
pub struct ProfileLoader;

impl ProfileLoader {
    /// Load and validate the profile set from a TOML file.
    ///
    /// Returns a [`ProfileSet`] ready for random selection. Fails if the
    /// file is unreadable, malformed, empty, or contains a profile that
    /// violates a core invariant (non-positive duration, zero guard count,
    /// bad loot range).
    pub fn load(path: &Path) -> LoadResult<ProfileSet> {
        let content = read_file(path)?;
        let file: ProfileFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse profiles TOML: {}", e))?;

        ProfileSet::new(file.profiles)
            .map_err(|e| anyhow::anyhow!("Invalid profile data in {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn loads_a_complete_profile_file() {
        let file = write_temp(
            r##"
            [[profiles]]
            name = "easy"
            duration_secs = 1800.0
            guard_count = 6
            guard_health = 100.0
            guard_roam_radius = 25.0
            guard_aggro_radius = 80.0
            guard_name = "Crate Guard"

            [profiles.marker]
            color_primary = "#31D43C"
            color_secondary = "#FFFFFF"
            opacity = 0.9

            [profiles.auto_unlock]
            enabled = true
            seconds = 300.0

            [profiles.loot]
            enabled = true
            max_items = 2

            [[profiles.loot.items]]
            item_id = "ammo.rifle"
            min_amount = 60
            max_amount = 120

            [[profiles.loot.items]]
            item_id = "rifle.ak"
            min_amount = 1
            max_amount = 1

            [[profiles]]
            name = "hard"
            duration_secs = 2700.0
            guard_count = 12
            guard_health = 200.0
            guard_roam_radius = 40.0
            guard_aggro_radius = 120.0
            guard_name = "Elite Guard"
            "##,
        );

        let set = ProfileLoader::load(file.path()).expect("profile file should load");
        assert_eq!(set.len(), 2);

        let easy = set.iter().find(|p| p.name == "easy").unwrap();
        assert_eq!(easy.guard_count, 6);
        assert!(easy.auto_unlock.enabled);
        assert_eq!(easy.loot.items.len(), 2);

        // Omitted sections fall back to defaults.
        let hard = set.iter().find(|p| p.name == "hard").unwrap();
        assert!(!hard.auto_unlock.enabled);
        assert!(hard.loot.items.is_empty());
    }

    #[test]
    fn empty_profile_list_fails_at_load_time() {
        let file = write_temp("profiles = []\n");
        let err = ProfileLoader::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn invalid_profile_fails_at_load_time() {
        let file = write_temp(
            r#"
            [[profiles]]
            name = "broken"
            duration_secs = -5.0
            guard_count = 4
            guard_health = 100.0
            guard_roam_radius = 25.0
            guard_aggro_radius = 80.0
            guard_name = "Guard"
            "#,
        );
        let err = ProfileLoader::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("non-positive"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ProfileLoader::load(Path::new("/definitely/not/here.toml")).is_err());
    }
}
