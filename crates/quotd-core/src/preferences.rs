use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable home of the last shown cursor position
///
/// Read once at cold start and written after every successful navigation.
pub trait PositionStore: Send + Sync {
    /// Last saved position, `None` if nothing was ever saved
    fn load_position(&self) -> crate::Result<Option<i64>>;
    fn save_position(&self, position: i64) -> crate::Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct UserPreferences {
    #[serde(default)]
    last_quote_position: Option<i64>,
}

/// Preferences kept as a small JSON file
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read(&self) -> crate::Result<UserPreferences> {
        if !self.path.exists() {
            return Ok(UserPreferences { last_quote_position: None });
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl PositionStore for FilePreferences {
    fn load_position(&self) -> crate::Result<Option<i64>> {
        Ok(self.read()?.last_quote_position)
    }

    fn save_position(&self, position: i64) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let prefs = UserPreferences {
            last_quote_position: Some(position),
        };
        let contents = serde_json::to_string_pretty(&prefs)?;

        // Written to a temp file, then renamed into place
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Process-local preferences, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    position: Mutex<Option<i64>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(position: i64) -> Self {
        Self {
            position: Mutex::new(Some(position)),
        }
    }
}

impl PositionStore for MemoryPreferences {
    fn load_position(&self) -> crate::Result<Option<i64>> {
        Ok(*self.position.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn save_position(&self, position: i64) -> crate::Result<()> {
        *self.position.lock().unwrap_or_else(|e| e.into_inner()) = Some(position);
        Ok(())
    }
}
