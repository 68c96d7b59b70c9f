//! `[policy]` section configuration.
//!
//! Decides where notebook entries land in the vault.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Policy {
    /// Move a page into its same-named sibling folder (folder note).
    pub folder_notes: bool,

    /// Flatten every attachment into `attachment_dir`.
    pub global_attachments: bool,

    /// Attachment directory, relative to the vault root.
    pub attachment_dir: PathBuf,

    /// Extensions that are never migrated.
    ///
    /// Compared case-insensitively; the leading dot is optional (`".ini"` and
    /// `"ini"` are the same).
    pub ignore_extensions: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            folder_notes: true,
            global_attachments: true,
            attachment_dir: PathBuf::from("attachments"),
            ignore_extensions: vec![".ini".into()],
        }
    }
}

impl Policy {
    pub const ATTACHMENT_DIR: FieldPath = FieldPath("policy.attachment_dir");
    pub const IGNORE_EXTENSIONS: FieldPath = FieldPath("policy.ignore_extensions");

    /// Check whether a file is excluded by extension.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.ignore_extensions
            .iter()
            .any(|ignored| ignored.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Directory attachment links are rendered relative to.
    ///
    /// The attachment directory in global mode, the vault root otherwise.
    pub fn attachment_root(&self, destination_root: &Path) -> PathBuf {
        if self.global_attachments {
            destination_root.join(&self.attachment_dir)
        } else {
            destination_root.to_path_buf()
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let dir = &self.attachment_dir;
        if self.global_attachments && dir.as_os_str().is_empty() {
            diag.error_with_hint(
                Self::ATTACHMENT_DIR,
                "must not be empty when global attachments are enabled",
                "set it to a folder name such as \"attachments\"",
            );
        }
        if !dir
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            diag.error(
                Self::ATTACHMENT_DIR,
                format!(
                    "`{}` must be a relative path inside the vault",
                    dir.display()
                ),
            );
        }

        for ext in &self.ignore_extensions {
            let bare = ext.trim_start_matches('.');
            if bare.is_empty() || bare.contains(['/', '\\']) {
                diag.error(
                    Self::IGNORE_EXTENSIONS,
                    format!("`{ext}` is not a file extension"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = Policy::default();
        assert!(policy.folder_notes);
        assert!(policy.global_attachments);
        assert_eq!(policy.attachment_dir, PathBuf::from("attachments"));
        assert_eq!(policy.ignore_extensions, vec![".ini".to_string()]);
    }

    #[test]
    fn test_is_ignored() {
        let policy = Policy {
            ignore_extensions: vec![".ini".into(), "BAK".into()],
            ..Policy::default()
        };
        assert!(policy.is_ignored(Path::new("notebook.zim.ini")));
        assert!(policy.is_ignored(Path::new("Home/notes.INI")));
        assert!(policy.is_ignored(Path::new("old.bak")));
        assert!(!policy.is_ignored(Path::new("image.png")));
        assert!(!policy.is_ignored(Path::new("ini")));
    }

    #[test]
    fn test_attachment_root() {
        let mut policy = Policy::default();
        assert_eq!(
            policy.attachment_root(Path::new("/vault")),
            PathBuf::from("/vault/attachments")
        );
        policy.global_attachments = false;
        assert_eq!(
            policy.attachment_root(Path::new("/vault")),
            PathBuf::from("/vault")
        );
    }

    #[test]
    fn test_validate() {
        let mut diag = ConfigDiagnostics::new();
        Policy::default().validate(&mut diag);
        assert!(!diag.has_errors());

        let policy = Policy {
            attachment_dir: PathBuf::from("../outside"),
            ignore_extensions: vec![".".into()],
            ..Policy::default()
        };
        let mut diag = ConfigDiagnostics::new();
        policy.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_parse_partial_section() {
        let policy: Policy = toml::from_str("folder_notes = false").unwrap();
        assert!(!policy.folder_notes);
        assert!(policy.global_attachments);
    }
}
