//! File-backed repository using `MessagePack`.
//!
//! Layout under the root directory:
//!
//! ```text
//! scopes/<scope>.msgpack
//! decks/<scope>/<deck>.msgpack
//! ```
//!
//! Names are escaped so any deck name maps to a single safe file name.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind as IoErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use deckhand_engine::DeckData;
use deckhand_foundation::{DeckName, Error, ErrorKind, Result, ScopeId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::repo::Repo;
use crate::scope::ScopeData;

const EXTENSION: &str = "msgpack";

/// Stores one `MessagePack` file per scope and per deck.
#[derive(Clone, Debug)]
pub struct FileRepo {
    root: PathBuf,
}

impl FileRepo {
    /// Opens (and creates if needed) a repository rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("scopes")).map_err(|e| io_error("create", &root, &e))?;
        fs::create_dir_all(root.join("decks")).map_err(|e| io_error("create", &root, &e))?;
        Ok(Self { root })
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope_path(&self, scope: &ScopeId) -> PathBuf {
        self.root
            .join("scopes")
            .join(format!("{}.{EXTENSION}", file_stem(scope.as_str())))
    }

    fn deck_dir(&self, scope: &ScopeId) -> PathBuf {
        self.root.join("decks").join(file_stem(scope.as_str()))
    }

    fn deck_path(&self, scope: &ScopeId, deck: &DeckName) -> PathBuf {
        self.deck_dir(scope)
            .join(format!("{}.{EXTENSION}", file_stem(deck.as_str())))
    }
}

impl Repo for FileRepo {
    fn load_scope_data(&self, scope: &ScopeId) -> Result<Option<ScopeData>> {
        load(&self.scope_path(scope))
    }

    fn save_scope_data(&mut self, scope: &ScopeId, data: &ScopeData) -> Result<()> {
        save(&self.scope_path(scope), data)
    }

    fn load_deck_data(&self, scope: &ScopeId, deck: &DeckName) -> Result<Option<DeckData>> {
        load(&self.deck_path(scope, deck))
    }

    fn save_deck_data(&mut self, scope: &ScopeId, deck: &DeckName, data: &DeckData) -> Result<()> {
        let dir = self.deck_dir(scope);
        fs::create_dir_all(&dir).map_err(|e| io_error("create", &dir, &e))?;
        save(&self.deck_path(scope, deck), data)
    }

    fn delete_deck(&mut self, scope: &ScopeId, deck: &DeckName) -> Result<()> {
        let path = self.deck_path(scope, deck);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted deck file");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                warn!(path = %path.display(), "deck file to delete does not exist");
                Ok(())
            }
            Err(e) => Err(io_error("delete", &path, &e)),
        }
    }
}

/// Serializes a value to `MessagePack` with field names.
///
/// # Errors
///
/// Returns [`ErrorKind::Serialization`] if encoding fails.
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Deserializes a value from `MessagePack`.
///
/// # Errors
///
/// Returns [`ErrorKind::Serialization`] if decoding fails.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_bytes(value)?;
    let file = File::create(path).map_err(|e| io_error("create", path, &e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .map_err(|e| io_error("write to", path, &e))?;
    writer.flush().map_err(|e| io_error("flush", path, &e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "saved");
    Ok(())
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error("open", path, &e)),
    };
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read", path, &e))?;
    from_bytes(&bytes).map(Some)
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> Error {
    Error::new(ErrorKind::Storage(format!(
        "failed to {action} '{}': {err}",
        path.display()
    )))
}

/// Keeps letters, digits, `-` and `_`; every other byte becomes `%XX`.
fn file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}
