//! Ordered frame enumeration and decoding.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::tracker::Frame;

/// The frame files of one sequence, in playback order.
///
/// Files are ordered by file name, lexicographically. Callers must zero-pad
/// frame numbers (`0001.jpg`, `0002.jpg`, ...) so that this matches the
/// chronological order; `10.jpg` sorts before `9.jpg`.
#[derive(Debug, Clone, Default)]
pub struct FrameSource {
    paths: Vec<PathBuf>,
}

impl FrameSource {
    /// List the non-directory entries of `dir`, sorted by file name.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir)
            .map_err(|e| Error::io(format!("failed to list {}", dir.display()), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| Error::io(format!("failed to list {}", dir.display()), e))?;
            let path = entry.path();
            if path.is_dir() {
                log::debug!("skipping directory {}", path.display());
                continue;
            }
            paths.push(path);
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(Self { paths })
    }

    /// Frame files in playback order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Frame paths in playback order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

/// Decode one frame file into an RGB raster.
pub fn read_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.into_rgb8())
}
