use std::path::{Path, PathBuf};

use crate::config::CatalogEntry;

/// One selectable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub path: PathBuf,
}

impl Track {
    /// Build a track whose display name is the last component of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: file_name_of(&path),
            path,
        }
    }
}

/// Last path component of a source locator, or the whole locator when it has none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Ordered, read-only track list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Build a catalog from config entries, keeping their order.
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let tracks = entries
            .iter()
            .map(|e| match &e.name {
                Some(name) if !name.trim().is_empty() => Track {
                    name: name.clone(),
                    path: e.source.clone(),
                },
                _ => Track::from_path(e.source.clone()),
            })
            .collect();
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Index of the first entry whose source file name equals `name`.
    ///
    /// Matching by file name lets relative and absolute locators for the same
    /// file line up.
    pub fn position_by_file_name(&self, name: &str) -> Option<usize> {
        let wanted = file_name_of(Path::new(name));
        self.tracks
            .iter()
            .position(|t| file_name_of(&t.path) == wanted)
    }

    /// Index after `current`, wrapping to the first entry.
    pub fn next_index(&self, current: usize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        Some((current + 1) % self.tracks.len())
    }

    /// Index before `current`, wrapping to the last entry.
    pub fn prev_index(&self, current: usize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        let len = self.tracks.len();
        Some((current % len + len - 1) % len)
    }
}
