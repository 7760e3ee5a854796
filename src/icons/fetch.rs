use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Retrieves the raw markup behind an icon reference.
pub trait ResourceFetcher {
    fn fetch(&self, src: &str) -> io::Result<String>;
}

/// Reads icon files from disk, resolving relative sources against `base_dir`.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    base_dir: PathBuf,
}

impl FsFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn resolve(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl ResourceFetcher for FsFetcher {
    fn fetch(&self, src: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(src))
    }
}
