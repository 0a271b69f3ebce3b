use anyhow::{Context, Result};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::TextureFormat;
use bevy::render::texture::{CompressedImageFormats, Image, ImageSampler, ImageType};
use crossbeam_channel::{Receiver, Sender};
use starmap_core::NodeId;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, Semaphore};

use crate::avatar::mask::{mask_circle, resample_nearest};
use crate::avatar::{resolve_avatar_source, AvatarSettings, ImageLoadError, AVATAR_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarJob {
    pub id: NodeId,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarRaster {
    pub size: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug)]
pub struct AvatarResult {
    pub id: NodeId,
    pub outcome: Result<AvatarRaster, ImageLoadError>,
}

pub struct AvatarLoader {
    jobs: mpsc::UnboundedSender<AvatarJob>,
    pub results: Receiver<AvatarResult>,
    thread: Option<JoinHandle<()>>,
}

impl AvatarLoader {
    pub fn submit(&self, job: AvatarJob) -> bool {
        self.jobs.send(job).is_ok()
    }

    pub fn shutdown(self) {
        let AvatarLoader {
            jobs,
            results,
            thread,
        } = self;
        drop(jobs);
        drop(results);
        if let Some(thread) = thread {
            let _ = thread.join();
        }
    }
}

pub fn spawn_loader(settings: AvatarSettings) -> Result<AvatarLoader> {
    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let (res_tx, res_rx) = crossbeam_channel::unbounded();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("starmap-avatar-io")
        .build()
        .context("build avatar runtime")?;

    let thread = std::thread::Builder::new()
        .name("starmap-avatars".to_string())
        .spawn(move || runtime.block_on(run(job_rx, res_tx, Arc::new(settings))))
        .context("spawn avatar loader thread")?;

    Ok(AvatarLoader {
        jobs: job_tx,
        results: res_rx,
        thread: Some(thread),
    })
}

async fn run(
    mut jobs: mpsc::UnboundedReceiver<AvatarJob>,
    results: Sender<AvatarResult>,
    settings: Arc<AvatarSettings>,
) {
    let permits = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
    let mut tasks = tokio::task::JoinSet::new();

    while let Some(job) = jobs.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let results = results.clone();
        let settings = settings.clone();
        tasks.spawn(async move {
            let outcome = load(job.image.as_deref(), &settings).await;
            drop(permit);
            if let Err(err) = &outcome {
                tracing::debug!(id = %job.id, error = %err, "avatar load failed");
            }
            let _ = results.send(AvatarResult { id: job.id, outcome });
        });
        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    tracing::debug!("avatar loader stopped");
}

async fn load(
    image: Option<&str>,
    settings: &AvatarSettings,
) -> Result<AvatarRaster, ImageLoadError> {
    let path = resolve_avatar_source(image, settings)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| ImageLoadError::Read {
            path: path.clone(),
            reason: err.to_string(),
        })?;
    let rounded = settings.rounded;
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || rasterize(&task_path, &bytes, rounded))
        .await
        .unwrap_or_else(|err| {
            Err(ImageLoadError::Decode {
                path,
                reason: err.to_string(),
            })
        })
}

pub fn rasterize(
    path: &Path,
    bytes: &[u8],
    rounded: bool,
) -> Result<AvatarRaster, ImageLoadError> {
    let decode_err = |reason: String| ImageLoadError::Decode {
        path: path.to_path_buf(),
        reason,
    };
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_ascii_lowercase();

    let image = Image::from_buffer(
        bytes,
        ImageType::Extension(&extension),
        CompressedImageFormats::NONE,
        true,
        ImageSampler::Default,
        RenderAssetUsages::default(),
    )
    .map_err(|err| decode_err(err.to_string()))?;

    let image = if image.texture_descriptor.format == TextureFormat::Rgba8UnormSrgb {
        image
    } else {
        image
            .convert(TextureFormat::Rgba8UnormSrgb)
            .ok_or_else(|| decode_err("unsupported pixel format".to_string()))?
    };

    let mut pixels = resample_nearest(&image.data, image.width(), image.height(), AVATAR_SIZE);
    if rounded {
        mask_circle(&mut pixels, AVATAR_SIZE);
    }
    Ok(AvatarRaster {
        size: AVATAR_SIZE,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::tempdir;

    fn settings(dir: &Path, default_avatar: Option<&str>) -> AvatarSettings {
        AvatarSettings {
            avatar_dir: dir.to_path_buf(),
            default_avatar: default_avatar.map(PathBuf::from),
            rounded: true,
            max_concurrent: 2,
        }
    }

    fn recv(loader: &AvatarLoader) -> AvatarResult {
        loader
            .results
            .recv_timeout(Duration::from_secs(10))
            .expect("avatar result")
    }

    #[test]
    fn failures_come_back_per_job() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("junk.png"), b"not a png").expect("write");
        let loader = spawn_loader(settings(dir.path(), None)).expect("spawn");

        assert!(loader.submit(AvatarJob {
            id: NodeId::new("missing"),
            image: Some("nope.png".into()),
        }));
        let result = recv(&loader);
        assert_eq!(result.id, NodeId::new("missing"));
        assert!(matches!(result.outcome, Err(ImageLoadError::Read { .. })));

        loader.submit(AvatarJob {
            id: NodeId::new("junk"),
            image: Some("junk.png".into()),
        });
        let result = recv(&loader);
        assert!(matches!(result.outcome, Err(ImageLoadError::Decode { .. })));

        loader.submit(AvatarJob {
            id: NodeId::new("none"),
            image: None,
        });
        assert_eq!(recv(&loader).outcome, Err(ImageLoadError::NoSource));

        loader.shutdown();
    }

    #[test]
    fn every_job_gets_one_result() {
        let dir = tempdir().expect("tempdir");
        let loader = spawn_loader(settings(dir.path(), Some("fallback.png"))).expect("spawn");
        for i in 0..10 {
            loader.submit(AvatarJob {
                id: NodeId::new(format!("n{i}")),
                image: Some(crate::avatar::DEFAULT_SENTINEL.to_string()),
            });
        }
        let mut ids: Vec<String> = (0..10).map(|_| recv(&loader).id.0).collect();
        ids.sort();
        let mut expected: Vec<String> = (0..10).map(|i| format!("n{i}")).collect();
        expected.sort();
        assert_eq!(ids, expected);
        loader.shutdown();
    }

    #[test]
    fn rasterize_rejects_garbage() {
        let err = rasterize(Path::new("a.png"), &[0, 1, 2, 3], true).expect_err("garbage");
        assert!(matches!(err, ImageLoadError::Decode { .. }));
    }
}
