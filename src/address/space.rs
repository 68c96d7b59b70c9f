//! Notebook walk and destination mapping.
//!
//! [`PathMapper`] enumerates the notebook once, classifies every entry and
//! freezes the result into a [`VaultMap`]. Entries are processed in sorted
//! order, so attachment renames are the same on every run.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;
use rustc_hash::{FxHashMap, FxHashSet};

use super::unique::allocate;
use super::{VaultMap, VaultMapBuilder};
use crate::config::Policy;
use crate::core::{EntryKind, MARKDOWN_EXTENSION, PAGE_EXTENSION, file_has_page_signature};
use crate::debug;
use crate::utils::path::has_ext;

/// Entries found by the walk, relative to the notebook root.
#[derive(Debug, Default)]
pub struct ScannedTree {
    pub folders: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Computes where every notebook entry goes in the vault.
pub struct PathMapper<'a> {
    source_root: &'a Path,
    destination_root: &'a Path,
    policy: &'a Policy,
}

impl<'a> PathMapper<'a> {
    pub fn new(source_root: &'a Path, destination_root: &'a Path, policy: &'a Policy) -> Self {
        Self {
            source_root,
            destination_root,
            policy,
        }
    }

    /// Walk the notebook and build the frozen vault map.
    pub fn map(&self) -> Result<VaultMap> {
        let tree = self.scan()?;
        Ok(self.map_tree(&tree))
    }

    /// Enumerate the notebook, skipping hidden entries (`.zim/` cache).
    ///
    /// Both lists are sorted by relative path.
    pub fn scan(&self) -> Result<ScannedTree> {
        let mut tree = ScannedTree::default();

        for entry in WalkDir::new(self.source_root)
            .skip_hidden(true)
            .sort(true)
        {
            let entry = entry
                .with_context(|| format!("failed to walk `{}`", self.source_root.display()))?;
            let path = entry.path();
            let Ok(relative) = path.strip_prefix(self.source_root) else {
                continue;
            };
            // The root itself
            if relative.as_os_str().is_empty() {
                continue;
            }
            let file_type = entry.file_type();
            if file_type.is_dir() {
                tree.folders.push(relative.to_path_buf());
            } else if file_type.is_file() {
                tree.files.push(relative.to_path_buf());
            }
        }

        tree.folders.sort();
        tree.files.sort();
        Ok(tree)
    }

    /// Classify a file by extension and page signature.
    pub fn classify(&self, relative: &Path) -> EntryKind {
        if has_ext(relative, PAGE_EXTENSION)
            && file_has_page_signature(&self.source_root.join(relative))
        {
            EntryKind::Page
        } else if self.policy.is_ignored(relative) {
            EntryKind::Ignored
        } else {
            EntryKind::Attachment
        }
    }

    /// Map scanned entries: folders first, then pages, then attachments.
    ///
    /// Folder notes claim their destination before any other page, so a
    /// subpage named like its folder (`Home/Home.txt` next to `Home.txt`)
    /// is renamed instead of overwriting the note. Attachments flattened
    /// into the attachment folder avoid every page name already there.
    pub fn map_tree(&self, tree: &ScannedTree) -> VaultMap {
        let mut builder = VaultMapBuilder::new(self.source_root, self.destination_root);

        for relative in &tree.folders {
            builder.folder(
                self.source_root.join(relative),
                self.destination_root.join(relative),
            );
        }

        let mut pages = Vec::new();
        let mut attachments = Vec::new();
        for relative in &tree.files {
            match self.classify(relative) {
                EntryKind::Page => pages.push(relative),
                EntryKind::Attachment => attachments.push(relative),
                EntryKind::Ignored => {
                    debug!("map"; "ignoring {}", relative.display());
                }
            }
        }

        let mut taken = TakenNames::default();
        let destinations: Vec<_> = pages
            .iter()
            .map(|relative| self.page_destination(relative, &builder))
            .collect();
        // Folder notes first, then the rest in sorted order
        let order = destinations
            .iter()
            .enumerate()
            .filter(|(_, (_, note))| *note)
            .chain(destinations.iter().enumerate().filter(|(_, (_, note))| !*note));
        for (index, (requested, _)) in order {
            let relative = pages[index];
            let destination = taken.claim(requested);
            if destination != *requested {
                debug!("map"; "renamed {} to {}", relative.display(), destination.display());
            }
            builder.page(self.source_root.join(relative), destination);
        }

        let attachment_dir = self.destination_root.join(&self.policy.attachment_dir);
        for relative in attachments {
            let source = self.source_root.join(relative);
            if self.policy.global_attachments {
                let requested = attachment_dir.join(relative.file_name().unwrap_or_default());
                let destination = taken.claim(&requested);
                if destination != requested {
                    debug!("map"; "renamed {} to {}", relative.display(), destination.display());
                }
                builder.attachment(source, destination);
            } else {
                builder.attachment(source, self.destination_root.join(relative));
            }
        }

        builder.finish()
    }

    /// `Parent/Page.txt` -> `Parent/Page.md`, or `Parent/Page/Page.md` when
    /// folder notes are on and `Parent/Page/` exists.
    ///
    /// The flag is set for folder notes.
    fn page_destination(&self, relative: &Path, builder: &VaultMapBuilder) -> (PathBuf, bool) {
        let parent = relative.parent().unwrap_or(Path::new(""));
        let stem = relative.file_stem().unwrap_or_default();

        let mut name = OsString::from(stem);
        name.push(".");
        name.push(MARKDOWN_EXTENSION);

        if self.policy.folder_notes
            && let Some(folder) =
                builder.folder_destination(&self.source_root.join(parent).join(stem))
        {
            return (folder.join(name), true);
        }
        (self.destination_root.join(parent).join(name), false)
    }
}

/// File names already assigned, per destination folder.
#[derive(Debug, Default)]
struct TakenNames {
    by_folder: FxHashMap<PathBuf, FxHashSet<String>>,
}

impl TakenNames {
    /// Reserve `requested`, or the first free name after it in the same folder.
    fn claim(&mut self, requested: &Path) -> PathBuf {
        let folder = requested.parent().unwrap_or(Path::new("")).to_path_buf();
        let requested_name = requested
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let names = self.by_folder.entry(folder).or_default();
        let name = allocate(names, &requested_name);
        let destination = requested.with_file_name(&name);
        names.insert(name);
        destination
    }
}
