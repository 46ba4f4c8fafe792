//! Profile storage and persistence.

use crate::Profile;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("Unsupported profile format: {0}")]
    UnsupportedFormat(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Get the app data directory for autocast.
pub fn get_app_data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("autocast")
}

/// Get the profiles directory.
pub fn get_profiles_dir() -> PathBuf {
    get_app_data_dir().join("profiles")
}

/// Ensure the profiles directory exists.
pub fn ensure_profiles_dir() -> StorageResult<PathBuf> {
    let dir = get_profiles_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        info!(?dir, "Created profiles directory");
    }
    Ok(dir)
}

/// Save a profile into the profiles directory.
pub fn save_profile(profile: &Profile) -> StorageResult<PathBuf> {
    let dir = ensure_profiles_dir()?;
    let path = profile_path(&dir, &profile.name);
    save_profile_file(profile, &path)?;
    Ok(path)
}

/// Load a profile from the profiles directory by name.
pub fn load_profile(name: &str) -> StorageResult<Profile> {
    let path = profile_path(&get_profiles_dir(), name);
    if !path.exists() {
        return Err(StorageError::NotFound(name.to_string()));
    }
    load_profile_file(&path)
}

/// Delete a profile from disk.
pub fn delete_profile(name: &str) -> StorageResult<()> {
    delete_profile_in(&get_profiles_dir(), name)
}

fn delete_profile_in(dir: &Path, name: &str) -> StorageResult<()> {
    let path = profile_path(dir, name);
    if !path.exists() {
        return Err(StorageError::NotFound(name.to_string()));
    }

    fs::remove_file(&path)?;
    info!(?path, "Deleted profile");
    Ok(())
}

/// List all saved profiles.
pub fn list_profiles() -> StorageResult<Vec<String>> {
    list_profiles_in(&get_profiles_dir())
}

/// Save the name of the last used profile.
pub fn save_last_used(name: &str) -> StorageResult<()> {
    let path = get_last_used_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, name)?;
    debug!(?name, "Saved last used profile");
    Ok(())
}

/// Load the name of the last used profile.
pub fn load_last_used() -> Option<String> {
    let name = fs::read_to_string(get_last_used_path()).ok()?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Load a profile from an explicit path. `.yaml`/`.yml` files are read as
/// YAML, everything else as JSON.
pub fn load_profile_file(path: &Path) -> StorageResult<Profile> {
    let text = fs::read_to_string(path)?;
    let profile = match Format::of(path)? {
        Format::Json => serde_json::from_str(&text)?,
        Format::Yaml => serde_yaml::from_str(&text)?,
    };
    debug!(?path, "Loaded profile");
    Ok(profile)
}

/// Write a profile to an explicit path, format chosen by extension.
pub fn save_profile_file(profile: &Profile, path: &Path) -> StorageResult<()> {
    let text = match Format::of(path)? {
        Format::Json => serde_json::to_string_pretty(profile)?,
        Format::Yaml => serde_yaml::to_string(profile)?,
    };
    fs::write(path, text)?;
    info!(?path, "Saved profile");
    Ok(())
}

enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> StorageResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(Self::Json),
            Some(ext) => match ext.to_ascii_lowercase().as_str() {
                "json" => Ok(Self::Json),
                "yaml" | "yml" => Ok(Self::Yaml),
                other => Err(StorageError::UnsupportedFormat(other.to_string())),
            },
        }
    }
}

fn list_profiles_in(dir: &Path) -> StorageResult<Vec<String>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut profiles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Some(name) = path.file_stem() {
                profiles.push(name.to_string_lossy().to_string());
            }
        }
    }

    profiles.sort();
    Ok(profiles)
}

fn profile_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_filename(name)))
}

fn get_last_used_path() -> PathBuf {
    get_app_data_dir().join("last_profile.txt")
}

/// Sanitize a profile name to be a valid filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, TargetWindow};

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("autocast-storage-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_profile() -> Profile {
        Profile {
            name: "Boss fight".into(),
            target: TargetWindow {
                title: Some("Game".into()),
                process: None,
            },
            points: vec![Point::new(120, 340), Point::new(400, 300)],
            key: "e".into(),
            interval_ms: 150,
            round_interval_secs: 2.5,
            anti_touch: true,
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Profile"), "My Profile");
        assert_eq!(sanitize_filename("test/profile"), "test_profile");
        assert_eq!(sanitize_filename("a:b*c?d"), "a_b_c_d");
    }

    #[test]
    fn test_profile_file_json_and_yaml() {
        let dir = scratch_dir("formats");
        let profile = sample_profile();

        let json = dir.join("boss.json");
        save_profile_file(&profile, &json).unwrap();
        assert_eq!(load_profile_file(&json).unwrap(), profile);

        let yaml = dir.join("boss.yaml");
        save_profile_file(&profile, &yaml).unwrap();
        assert!(fs::read_to_string(&yaml).unwrap().contains("name: Boss fight"));
        assert_eq!(load_profile_file(&yaml).unwrap(), profile);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = save_profile_file(&sample_profile(), Path::new("profile.toml")).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedFormat(ext) if ext == "toml"));
    }

    #[test]
    fn test_partial_profile_uses_defaults() {
        let dir = scratch_dir("partial");
        let path = dir.join("partial.json");
        fs::write(&path, r#"{"name": "minimal", "points": [{"x": 1, "y": 2}]}"#).unwrap();

        let profile = load_profile_file(&path).unwrap();
        assert_eq!(profile.key, "q");
        assert_eq!(profile.interval_ms, 100);
        assert_eq!(profile.round_interval_secs, 5.0);
        assert!(profile.anti_touch);
        assert_eq!(profile.target, TargetWindow::default());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_list_profiles_in_dir() {
        let dir = scratch_dir("list");
        fs::write(dir.join("b.json"), "{}").unwrap();
        fs::write(dir.join("a.json"), "{}").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        assert_eq!(list_profiles_in(&dir).unwrap(), vec!["a", "b"]);
        assert!(list_profiles_in(&dir.join("missing")).unwrap().is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_delete_profile_in_dir() {
        let dir = scratch_dir("delete");
        let profile = sample_profile();
        save_profile_file(&profile, &profile_path(&dir, &profile.name)).unwrap();
        assert_eq!(list_profiles_in(&dir).unwrap(), vec!["Boss fight"]);

        delete_profile_in(&dir, "Boss fight").unwrap();
        assert!(list_profiles_in(&dir).unwrap().is_empty());
        assert!(matches!(
            delete_profile_in(&dir, "Boss fight"),
            Err(StorageError::NotFound(name)) if name == "Boss fight"
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
