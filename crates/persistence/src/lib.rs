#![deny(warnings)]

//! Save files: a versioned envelope around the character record.
//!
//! Two encodings are supported. JSON is human-readable and what the CLI
//! writes by default; bincode is compact. Both round-trip every field of
//! [`Character`], and every decoded record is validated before it is
//! handed back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use ascend_core::{validate_character, Character, ValidationError};

/// Bumped whenever the record layout changes incompatibly.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error at {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("malformed json save: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed binary save: {0}")]
    Binary(#[from] bincode::Error),
    #[error("save version {found} is not supported (expected {})", SAVE_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("save holds an invalid character: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Binary,
}

impl Format {
    /// `.bin` selects bincode; anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") => Format::Binary,
            _ => Format::Json,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub character: Character,
}

impl SaveFile {
    pub fn new(character: Character) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            character,
        }
    }
}

pub fn encode(save: &SaveFile, format: Format) -> Result<Vec<u8>, PersistenceError> {
    Ok(match format {
        Format::Json => serde_json::to_vec_pretty(save)?,
        Format::Binary => bincode::serialize(save)?,
    })
}

pub fn decode(bytes: &[u8], format: Format) -> Result<SaveFile, PersistenceError> {
    let save: SaveFile = match format {
        Format::Json => serde_json::from_slice(bytes)?,
        Format::Binary => bincode::deserialize(bytes)?,
    };
    if save.version != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: save.version,
        });
    }
    validate_character(&save.character)?;
    Ok(save)
}

/// Write `character` to `path`, creating parent directories. The format
/// follows the file extension.
pub fn save_to(path: &Path, character: &Character) -> Result<SaveFile, PersistenceError> {
    let save = SaveFile::new(character.clone());
    let bytes = encode(&save, Format::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| io_error(path, e))?;
    info!(path = %path.display(), name = %character.name, "game saved");
    Ok(save)
}

pub fn load_from(path: &Path) -> Result<SaveFile, PersistenceError> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    let save = decode(&bytes, Format::from_path(path))?;
    info!(path = %path.display(), name = %save.character.name, "game loaded");
    Ok(save)
}

/// Default location for local saves.
pub fn default_save_path() -> PathBuf {
    PathBuf::from("./saves/main.json")
}

fn io_error(path: &Path, e: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
