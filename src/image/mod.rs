//! Image dimension lookup for sized embeds.
//!
//! Only the image header is read (`image::image_dimensions`). Results,
//! failures included, are memoized per path since the same attachment is
//! often embedded from many pages translated in parallel.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

/// `(width, height)` in pixels, or the reason the image could not be read.
pub type DimensionResult = Result<(u32, u32), String>;

/// Concurrent populate-once cache of natural image sizes.
#[derive(Debug, Default)]
pub struct ImageCache {
    sizes: DashMap<PathBuf, DimensionResult>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Natural size of the image at `path`.
    pub fn dimensions(&self, path: &Path) -> DimensionResult {
        if let Some(hit) = self.sizes.get(path) {
            return hit.value().clone();
        }
        self.sizes
            .entry(path.to_path_buf())
            .or_insert_with(|| read_dimensions(path))
            .value()
            .clone()
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }
}

fn read_dimensions(path: &Path) -> DimensionResult {
    match image::image_dimensions(path) {
        Ok((0, _) | (_, 0)) => Err("image has no pixels".into()),
        Ok(size) => Ok(size),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_png_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img.png");
        image::RgbImage::new(200, 100).save(&path).unwrap();

        let cache = ImageCache::new();
        assert_eq!(cache.dimensions(&path), Ok((200, 100)));
        assert_eq!(cache.len(), 1);

        // Served from the cache even after the file is gone
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cache.dimensions(&path), Ok((200, 100)));
    }

    #[test]
    fn test_unreadable_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, "not a png").unwrap();

        let cache = ImageCache::new();
        assert!(cache.dimensions(&path).is_err());
        assert!(cache.dimensions(&dir.path().join("missing.png")).is_err());
        assert_eq!(cache.len(), 2);
    }
}
