//! Vault address space - where every notebook entry lands in the vault.
//!
//! Migration runs in two phases with a hard barrier between them:
//!
//! 1. [`PathMapper`] walks the notebook once and freezes a [`VaultMap`].
//! 2. [`LinkResolver`] rewrites link and embed targets against that map.
//!
//! # Relationship with [`TargetKind`](crate::core::TargetKind)
//!
//! - [`TargetKind`](crate::core::TargetKind): **Syntactic** classification (no context needed)
//! - [`LinkResolver`]: **Semantic** resolution (needs the vault map and page scope)
//!
//! # Architecture
//!
//! ```text
//! Notebook                         Vault
//! ========                         =====
//! Home/                      ->    Home/
//! Home.txt                   ->    Home/Home.md         (folder note)
//! Home/Garden.txt            ->    Home/Garden.md
//! Home/Garden/pasted_image.png ->  attachments/pasted_image.png
//! Work/pasted_image.png      ->    attachments/pasted_image 1.png
//! ```
//!
//! # Module Structure
//!
//! - [`unique`]: collision-free names for flattened attachments
//! - [`space`]: the notebook walk and [`PathMapper`]
//! - [`resolve`]: [`LinkResolver`] and [`PageScope`]
//! - [`dump`]: JSON dumps of the three maps

mod dump;
mod resolve;
mod space;
pub mod unique;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use dump::dump_maps;
pub use resolve::{LinkResolver, PageScope};
pub use space::PathMapper;

/// Source path -> destination path, ordered by source.
pub type PathMap = BTreeMap<PathBuf, PathBuf>;

/// Frozen destination mappings for one migration.
///
/// Keys are absolute source paths (the notebook root joined with the entry's
/// relative path), values absolute destination paths. Each map is built once
/// by [`PathMapper`] and never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct VaultMap {
    source_root: PathBuf,
    destination_root: PathBuf,
    folders: PathMap,
    pages: PathMap,
    attachments: PathMap,
}

impl VaultMap {
    #[inline]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    #[inline]
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    #[inline]
    pub fn folders(&self) -> &PathMap {
        &self.folders
    }

    #[inline]
    pub fn pages(&self) -> &PathMap {
        &self.pages
    }

    #[inline]
    pub fn attachments(&self) -> &PathMap {
        &self.attachments
    }

    /// Destination of a source folder.
    pub fn folder(&self, source: &Path) -> Option<&Path> {
        self.folders.get(source).map(PathBuf::as_path)
    }

    /// Destination of a source page.
    pub fn page(&self, source: &Path) -> Option<&Path> {
        self.pages.get(source).map(PathBuf::as_path)
    }

    /// Destination of a source attachment.
    pub fn attachment(&self, source: &Path) -> Option<&Path> {
        self.attachments.get(source).map(PathBuf::as_path)
    }
}

/// Mutable half of the two-phase build; only [`VaultMapBuilder::finish`]
/// hands out a [`VaultMap`].
#[derive(Debug, Default)]
pub struct VaultMapBuilder {
    map: VaultMap,
}

impl VaultMapBuilder {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            map: VaultMap {
                source_root: source_root.into(),
                destination_root: destination_root.into(),
                ..VaultMap::default()
            },
        }
    }

    pub fn folder(&mut self, source: PathBuf, destination: PathBuf) -> &mut Self {
        self.map.folders.insert(source, destination);
        self
    }

    pub fn page(&mut self, source: PathBuf, destination: PathBuf) -> &mut Self {
        self.map.pages.insert(source, destination);
        self
    }

    pub fn attachment(&mut self, source: PathBuf, destination: PathBuf) -> &mut Self {
        self.map.attachments.insert(source, destination);
        self
    }

    /// Destination of an already recorded source folder.
    pub fn folder_destination(&self, source: &Path) -> Option<&Path> {
        self.map.folder(source)
    }

    pub fn finish(self) -> VaultMap {
        self.map
    }
}
