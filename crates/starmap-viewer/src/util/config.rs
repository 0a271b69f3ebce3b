use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use starmap_core::Rgba;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: f32,
    pub height: f32,
    pub node_size: f32,
    pub line_width: f32,
    pub show_arrow: bool,
    pub highlight_color: Rgba,
    pub show_stat_table: bool,
    pub show_hud: bool,
    pub rounded_image: bool,
    /// Base for relative avatar paths. Defaults to the graph file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_avatar: Option<PathBuf>,
    pub max_concurrent_fetches: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            node_size: 8.0,
            line_width: 1.0,
            show_arrow: false,
            highlight_color: [1.0, 0.55, 0.1, 1.0],
            show_stat_table: true,
            show_hud: true,
            rounded_image: true,
            avatar_dir: None,
            default_avatar: None,
            max_concurrent_fetches: 8,
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "starmap")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(
            path = %path.display(),
            error = %err,
            "invalid viewer config, using defaults"
        );
        ViewerConfig::default()
    })
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<PathBuf> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)?;
    Ok(path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("viewer.toml");
        let cfg = ViewerConfig {
            show_arrow: true,
            avatar_dir: Some(PathBuf::from("/srv/avatars")),
            max_concurrent_fetches: 3,
            ..ViewerConfig::default()
        };

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "node_size = 14.0\nrounded_image = false\n").expect("write");

        let loaded = load_or_default_from_path(&path);

        assert_eq!(loaded.node_size, 14.0);
        assert!(!loaded.rounded_image);
        assert_eq!(loaded.max_concurrent_fetches, 8);
        assert_eq!(loaded.default_avatar, None);
    }

    #[test]
    fn missing_or_invalid_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        assert_eq!(load_or_default_from_path(&missing), ViewerConfig::default());

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "node_size = \"huge\"").expect("write");
        assert_eq!(load_or_default_from_path(&bad), ViewerConfig::default());
    }
}
