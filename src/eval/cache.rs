use std::collections::BTreeMap;
use std::path::Path;

use crate::Transcription;

use super::EvalError;

/// Transcriptions keyed by test-case filename, persisted as JSON.
///
/// Lets repeated evaluation runs skip the speech-to-text backend.
#[derive(Debug, Clone, Default)]
pub struct TranscriptCache {
    entries: BTreeMap<String, Transcription>,
    dirty: bool,
}

impl TranscriptCache {
    /// Load a cache file. A missing file yields an empty cache.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        if !path.exists() {
            log::info!("No transcript cache at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, Transcription> = serde_json::from_str(&content)?;
        log::info!(
            "Loaded {} cached transcriptions from {}",
            entries.len(),
            path.display()
        );
        Ok(Self {
            entries,
            dirty: false,
        })
    }

    /// Write the cache as pretty-printed UTF-8 JSON, creating parent directories.
    pub fn save(&mut self, path: &Path) -> Result<(), EvalError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        self.dirty = false;
        log::info!(
            "Saved {} transcriptions to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }

    pub fn get(&self, filename: &str) -> Option<&Transcription> {
        self.entries.get(filename)
    }

    pub fn insert(&mut self, filename: impl Into<String>, transcription: Transcription) {
        self.entries.insert(filename.into(), transcription);
        self.dirty = true;
    }

    /// True when entries were added since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
