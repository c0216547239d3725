use anyhow::{bail, Context};
use mapvalcore::tool::reset_dir;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension accepted for uploaded maps.
pub const MAP_EXTENSION: &str = "osm";

/// Directory holding at most one uploaded map.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deletes every previous upload, then stores `bytes` under `file_name`.
    pub fn replace(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .with_context(|| format!("invalid upload name `{file_name}`"))?;
        let is_map = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MAP_EXTENSION));
        if !is_map {
            bail!("`{file_name}` is not a .{MAP_EXTENSION} file");
        }

        reset_dir(&self.dir).context("clearing upload directory")?;
        let path = self.dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("writing upload {}", path.display()))?;
        Ok(path)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        reset_dir(&self.dir).context("clearing upload directory")?;
        Ok(())
    }
}
