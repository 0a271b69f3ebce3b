pub mod loader;
pub mod mask;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use loader::{spawn_loader, AvatarJob, AvatarLoader, AvatarRaster, AvatarResult};

pub const DEFAULT_SENTINEL: &str = "default";
pub const AVATAR_SIZE: u32 = 64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageLoadError {
    #[error("node has no avatar and no default avatar is configured")]
    NoSource,
    #[error("remote avatar {0} is not supported")]
    Remote(String),
    #[error("failed to read avatar {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    #[error("failed to decode avatar {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("avatar loader is not running")]
    LoaderStopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvatarSettings {
    pub avatar_dir: PathBuf,
    pub default_avatar: Option<PathBuf>,
    pub rounded: bool,
    pub max_concurrent: usize,
}

pub fn resolve_avatar_source(
    image: Option<&str>,
    settings: &AvatarSettings,
) -> Result<PathBuf, ImageLoadError> {
    let image = image.map(str::trim).filter(|s| !s.is_empty());
    let Some(image) = image.filter(|s| *s != DEFAULT_SENTINEL) else {
        return settings
            .default_avatar
            .as_ref()
            .map(|p| anchor(p, &settings.avatar_dir))
            .ok_or(ImageLoadError::NoSource);
    };
    if image.starts_with("http://") || image.starts_with("https://") {
        return Err(ImageLoadError::Remote(image.to_string()));
    }
    let path = Path::new(image.strip_prefix("file://").unwrap_or(image));
    Ok(anchor(path, &settings.avatar_dir))
}

fn anchor(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(default_avatar: Option<&str>) -> AvatarSettings {
        AvatarSettings {
            avatar_dir: PathBuf::from("/data/avatars"),
            default_avatar: default_avatar.map(PathBuf::from),
            rounded: true,
            max_concurrent: 8,
        }
    }

    #[test]
    fn relative_paths_resolve_against_avatar_dir() {
        let path = resolve_avatar_source(Some("alice.png"), &settings(None)).expect("path");
        assert_eq!(path, PathBuf::from("/data/avatars/alice.png"));

        let path =
            resolve_avatar_source(Some("file:///tmp/bob.png"), &settings(None)).expect("path");
        assert_eq!(path, PathBuf::from("/tmp/bob.png"));
    }

    #[test]
    fn sentinel_and_missing_use_default_avatar() {
        let with_default = settings(Some("fallback.png"));
        let expected = PathBuf::from("/data/avatars/fallback.png");
        assert_eq!(
            resolve_avatar_source(Some(DEFAULT_SENTINEL), &with_default),
            Ok(expected.clone())
        );
        assert_eq!(resolve_avatar_source(None, &with_default), Ok(expected.clone()));
        assert_eq!(resolve_avatar_source(Some("  "), &with_default), Ok(expected));

        assert_eq!(
            resolve_avatar_source(None, &settings(None)),
            Err(ImageLoadError::NoSource)
        );
    }

    #[test]
    fn remote_urls_are_rejected() {
        let err = resolve_avatar_source(Some("https://example.com/a.png"), &settings(None))
            .expect_err("remote");
        assert!(matches!(err, ImageLoadError::Remote(_)));
    }
}
