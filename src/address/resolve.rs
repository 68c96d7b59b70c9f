//! Link and embed resolution against the frozen vault map.
//!
//! # Resolution Flow
//!
//! ```text
//! [[target|label]]
//!     |
//!     +-- wp?Article        -> encyclopedia URL           (external)
//!     +-- http(s)/mailto    -> unchanged                  (external)
//!     +-- file:// or ~/     -> file URI, must be outside the notebook
//!     +-- ./name            -> attachment map             (fatal if missing)
//!     +-- +Child / :Root / Bare:Name
//!             -> namespace path -> folder map / page map  (warning if missing)
//! ```

use std::iter;
use std::path::{Component, Path, PathBuf};

use url::Url;

use super::VaultMap;
use crate::config::Policy;
use crate::core::{
    Diagnostics, EmbedToken, ErrorKind, LinkToken, MARKDOWN_EXTENSION, PAGE_EXTENSION,
    TargetKind, WIKIPEDIA_BASE, Warning, strip_relative_marker,
};
use crate::image::ImageCache;
use crate::utils::path::{relative_slash, to_slash};

// ============================================================================
// Page scope
// ============================================================================

/// Addressing context of the page whose links are being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScope {
    /// Source path relative to the notebook root
    pub relative: PathBuf,
    /// File stem, underscores as spaces
    pub title: String,
    /// Location without extension, underscores as spaces, `:` separated
    pub namespace: String,
    /// Directory holding the page's own attachments (source path minus extension)
    pub attachment_folder: PathBuf,
}

impl PageScope {
    pub fn new(source_root: &Path, source: &Path) -> Self {
        let relative = source
            .strip_prefix(source_root)
            .unwrap_or(source)
            .to_path_buf();

        let namespace = relative
            .with_extension("")
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().replace('_', " ")),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(":");

        let title = relative
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace('_', " "))
            .unwrap_or_default();

        Self {
            attachment_folder: source.with_extension(""),
            relative,
            title,
            namespace,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Rewrites link and embed tokens into vault markup.
///
/// Read-only over the vault map; safe to share across page workers.
pub struct LinkResolver<'a> {
    map: &'a VaultMap,
    policy: &'a Policy,
    images: &'a ImageCache,
    /// Directory attachment targets are rendered relative to
    attachment_root: PathBuf,
}

impl<'a> LinkResolver<'a> {
    pub fn new(map: &'a VaultMap, policy: &'a Policy, images: &'a ImageCache) -> Self {
        Self {
            map,
            policy,
            images,
            attachment_root: policy.attachment_root(map.destination_root()),
        }
    }

    /// Render a `[[...]]` token.
    ///
    /// Unresolved page references are kept verbatim with a warning; broken
    /// attachment references and absolute paths into the notebook are fatal.
    pub fn resolve_link(
        &self,
        token: &LinkToken<'_>,
        scope: &PageScope,
        diag: &Diagnostics,
    ) -> Result<String, ErrorKind> {
        let kind = TargetKind::parse(token.target);
        let reference = match kind {
            TargetKind::Wikipedia(article) => {
                let url = format!("{WIKIPEDIA_BASE}{}", article.replace(' ', "_"));
                return Ok(render_external(token.label.unwrap_or(article), &url));
            }
            TargetKind::Web(url) => {
                return Ok(render_external(token.label.unwrap_or(url), url));
            }
            TargetKind::FileUri(_) | TargetKind::Home(_) => {
                let (_, uri) = self.absolute_file(kind, token.target)?;
                return Ok(render_external(token.label.unwrap_or(token.target), &uri));
            }
            TargetKind::Relative(name) => {
                let (_, target) = self.relative_attachment(name, scope)?;
                let label = strip_relative_marker(token.label.unwrap_or(token.target));
                return Ok(render_internal(label, &target));
            }
            TargetKind::SubPage(rest) if scope.namespace.is_empty() => rest.to_string(),
            TargetKind::SubPage(rest) => format!("{}:{rest}", scope.namespace),
            TargetKind::Absolute(rest) => match rest.split_once(':') {
                Some((_, tail)) => tail.to_string(),
                None => rest.to_string(),
            },
            TargetKind::Namespace(reference) => reference.to_string(),
        };

        let reference = reference.replace([':', '\\'], "/");
        match self.resolve_page(&reference) {
            Some(target) => Ok(render_internal(
                token.label.unwrap_or(&reference),
                &target,
            )),
            None => {
                diag.warn(Warning::UnresolvedLink(token.target.to_string()));
                Ok(token.raw.to_string())
            }
        }
    }

    /// Render a `{{...}}` token.
    pub fn resolve_embed(
        &self,
        token: &EmbedToken<'_>,
        scope: &PageScope,
        diag: &Diagnostics,
    ) -> Result<String, ErrorKind> {
        let kind = TargetKind::parse(token.target);
        let (image, target, external) = match kind {
            _ if kind.is_absolute_file() => {
                let (path, uri) = self.absolute_file(kind, token.target)?;
                (Some(path), uri, true)
            }
            TargetKind::Relative(name) => {
                let (source, target) = self.relative_attachment(name, scope)?;
                (Some(source), target, false)
            }
            TargetKind::Web(url) => (None, url.to_string(), true),
            _ => (None, token.target.to_string(), false),
        };

        let size = self.embed_size(token, image.as_deref(), diag);
        Ok(match (external, size) {
            (true, Some(size)) => format!("![{size}]({target})"),
            (true, None) => format!("![]({target})"),
            (false, Some(size)) => format!("![[{target}|{size}]]"),
            (false, None) => format!("![[{target}]]"),
        })
    }

    // ------------------------------------------------------------------------
    // absolute files
    // ------------------------------------------------------------------------

    /// Local path and `file://` URI of an absolute target.
    ///
    /// `file://` targets keep their URI as written. Paths inside the notebook
    /// are rejected: they should have been written as relative links.
    fn absolute_file(
        &self,
        kind: TargetKind<'_>,
        target: &str,
    ) -> Result<(PathBuf, String), ErrorKind> {
        let (path, uri) = match kind {
            TargetKind::FileUri(uri) => {
                let path = Url::parse(uri)
                    .ok()
                    .and_then(|url| url.to_file_path().ok())
                    .unwrap_or_else(|| PathBuf::from(uri.trim_start_matches("file://")));
                (path, uri.to_string())
            }
            _ => {
                let path = PathBuf::from(shellexpand::tilde(target).into_owned());
                let uri = Url::from_file_path(&path)
                    .map(String::from)
                    .unwrap_or_else(|()| target.to_string());
                (path, uri)
            }
        };

        if self.is_inside_notebook(&path) {
            return Err(ErrorKind::MisclassifiedAbsolutePath(path));
        }
        Ok((path, uri))
    }

    fn is_inside_notebook(&self, path: &Path) -> bool {
        let root = self.map.source_root();
        path.starts_with(root)
            || path
                .canonicalize()
                .is_ok_and(|canonical| canonical.starts_with(root))
    }

    // ------------------------------------------------------------------------
    // attachments
    // ------------------------------------------------------------------------

    /// Look up `./name` in the page's attachment folder.
    ///
    /// Returns the attachment's source path and its rendered target.
    fn relative_attachment(
        &self,
        name: &str,
        scope: &PageScope,
    ) -> Result<(PathBuf, String), ErrorKind> {
        let source = lexical_join(&scope.attachment_folder, &name.replace('\\', "/"));
        let Some(destination) = self.map.attachment(&source) else {
            return Err(ErrorKind::MissingAttachment(source));
        };

        let target = relative_slash(destination, &self.attachment_root)
            .unwrap_or_else(|| to_slash(destination));
        Ok((source, target))
    }

    // ------------------------------------------------------------------------
    // pages
    // ------------------------------------------------------------------------

    /// Resolve a `/` separated namespace reference to its vault link target.
    ///
    /// Tries the reference as written, then with spaces as underscores. A
    /// folder redirect (folder notes) wins over a page of the same name.
    fn resolve_page(&self, reference: &str) -> Option<String> {
        let underscored = reference.replace(' ', "_");
        let variants = iter::once(reference).chain((underscored != reference).then_some(underscored.as_str()));

        for candidate in variants {
            let source = lexical_join(self.map.source_root(), candidate);

            if self.policy.folder_notes
                && let Some(folder) = self.map.folder(&source)
                && let Some(target) = self.folder_target(folder)
            {
                return Some(target);
            }

            let mut page = source.into_os_string();
            page.push(".");
            page.push(PAGE_EXTENSION);
            if let Some(destination) = self.map.page(Path::new(&page)) {
                return self.page_target(destination);
            }
        }
        None
    }

    /// `Parent/Folder` -> `Parent/Folder/Folder` (the folder note).
    fn folder_target(&self, folder: &Path) -> Option<String> {
        let base = relative_slash(folder, self.map.destination_root())?;
        let leaf = folder.file_name()?.to_string_lossy();
        Some(format!("{base}/{leaf}"))
    }

    /// Vault-relative destination without the markdown extension.
    fn page_target(&self, destination: &Path) -> Option<String> {
        let relative = relative_slash(destination, self.map.destination_root())?;
        let suffix = format!(".{MARKDOWN_EXTENSION}");
        Some(match relative.strip_suffix(&suffix) {
            Some(stripped) => stripped.to_string(),
            None => relative,
        })
    }

    // ------------------------------------------------------------------------
    // embed size
    // ------------------------------------------------------------------------

    /// `WxH` suffix from the embed options, or `None` when unsized.
    fn embed_size(
        &self,
        token: &EmbedToken<'_>,
        image: Option<&Path>,
        diag: &Diagnostics,
    ) -> Option<String> {
        let mut width = None;
        let mut height = None;

        for (key, value) in token.option_pairs() {
            let slot = match key {
                "width" => &mut width,
                "height" => &mut height,
                "type" => continue,
                _ => {
                    diag.warn(Warning::UnknownEmbedOption(key.to_string()));
                    continue;
                }
            };
            match value.parse::<u32>() {
                Ok(parsed) if parsed > 0 => *slot = Some(parsed),
                _ => diag.warn(Warning::InvalidEmbedOption {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
            }
        }

        let (width, height) = match (width, height) {
            (None, None) => return None,
            (Some(width), Some(height)) => (width, height),
            (width, height) => {
                let Some(path) = image else {
                    diag.warn(Warning::UnsizedEmbed(token.target.to_string()));
                    return None;
                };
                match self.images.dimensions(path) {
                    Ok(natural) => complete_size(width, height, natural),
                    Err(reason) => {
                        diag.warn(Warning::UnreadableImage {
                            path: path.to_path_buf(),
                            reason,
                        });
                        return None;
                    }
                }
            }
        };
        Some(format!("{width}x{height}"))
    }
}

/// Fill in the missing dimension from the natural aspect ratio.
///
/// The companion is `trunc(given / natural * other)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn complete_size(width: Option<u32>, height: Option<u32>, natural: (u32, u32)) -> (u32, u32) {
    let (natural_width, natural_height) = (f64::from(natural.0), f64::from(natural.1));
    match (width, height) {
        (Some(width), None) => (
            width,
            (f64::from(width) / natural_width * natural_height) as u32,
        ),
        (None, Some(height)) => (
            (f64::from(height) / natural_height * natural_width) as u32,
            height,
        ),
        (Some(width), Some(height)) => (width, height),
        (None, None) => natural,
    }
}

// ============================================================================
// rendering
// ============================================================================

/// `[[target]]` when the label is the target itself, `[label](target)` otherwise.
fn render_internal(label: &str, target: &str) -> String {
    if label == target {
        format!("[[{target}]]")
    } else {
        render_external(label, target)
    }
}

/// `[label](target)`, with the target in angle brackets when it has spaces.
fn render_external(label: &str, target: &str) -> String {
    if target.contains(' ') {
        format!("[{label}](<{target}>)")
    } else {
        format!("[{label}]({target})")
    }
}

/// Join a `/` separated relative reference, folding `.` and `..` lexically.
fn lexical_join(base: &Path, reference: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in reference.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                path.pop();
            }
            part => path.push(part),
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::VaultMapBuilder;

    const NOTES: &str = "/notes";
    const VAULT: &str = "/vault";

    /// ```text
    /// Parent/          Parent.txt      Parent/Sub.txt
    /// My_Page.txt      Home/Garden/    Home/Garden.txt
    /// Home/Garden/pasted_image.png  (global: pasted_image 1.png)
    /// Mirror.txt       Mirror/doc.pdf
    /// ```
    fn vault_map(folder_notes: bool) -> VaultMap {
        let mut builder = VaultMapBuilder::new(NOTES, VAULT);
        builder
            .folder("/notes/Parent".into(), "/vault/Parent".into())
            .folder("/notes/Home".into(), "/vault/Home".into())
            .folder("/notes/Home/Garden".into(), "/vault/Home/Garden".into())
            .folder("/notes/Mirror".into(), "/vault/Mirror".into())
            .page("/notes/My_Page.txt".into(), "/vault/My_Page.md".into())
            .page("/notes/Parent/Sub.txt".into(), "/vault/Parent/Sub.md".into())
            .attachment(
                "/notes/Home/Garden/pasted_image.png".into(),
                "/vault/attachments/pasted_image 1.png".into(),
            )
            .attachment(
                "/notes/Mirror/doc.pdf".into(),
                "/vault/attachments/doc.pdf".into(),
            );
        if folder_notes {
            builder
                .page("/notes/Parent.txt".into(), "/vault/Parent/Parent.md".into())
                .page(
                    "/notes/Home/Garden.txt".into(),
                    "/vault/Home/Garden/Garden.md".into(),
                )
                .page("/notes/Mirror.txt".into(), "/vault/Mirror/Mirror.md".into());
        } else {
            builder
                .page("/notes/Parent.txt".into(), "/vault/Parent.md".into())
                .page("/notes/Home/Garden.txt".into(), "/vault/Home/Garden.md".into())
                .page("/notes/Mirror.txt".into(), "/vault/Mirror.md".into());
        }
        builder.finish()
    }

    fn scope(relative: &str) -> PageScope {
        PageScope::new(Path::new(NOTES), &Path::new(NOTES).join(relative))
    }

    fn link(map: &VaultMap, policy: &Policy, page: &str, raw: &str) -> Result<String, ErrorKind> {
        let images = ImageCache::new();
        let resolver = LinkResolver::new(map, policy, &images);
        let inner = &raw[2..raw.len() - 2];
        let diag = Diagnostics::new();
        resolver.resolve_link(&LinkToken::new(raw, inner), &scope(page), &diag)
    }

    fn resolve(raw: &str) -> String {
        link(&vault_map(true), &Policy::default(), "Parent.txt", raw).unwrap()
    }

    #[test]
    fn test_page_scope() {
        let scope = scope("Home/Garden/Rose_Bed.txt");
        assert_eq!(scope.title, "Rose Bed");
        assert_eq!(scope.namespace, "Home:Garden:Rose Bed");
        assert_eq!(scope.relative, PathBuf::from("Home/Garden/Rose_Bed.txt"));
        assert_eq!(
            scope.attachment_folder,
            PathBuf::from("/notes/Home/Garden/Rose_Bed")
        );
    }

    #[test]
    fn test_subpage_link_stays_bare() {
        assert_eq!(resolve("[[+Sub]]"), "[[Parent/Sub]]");
        assert_eq!(resolve("[[+Sub|the sub]]"), "[the sub](Parent/Sub)");
    }

    #[test]
    fn test_namespace_and_absolute_links() {
        assert_eq!(resolve("[[Parent:Sub]]"), "[[Parent/Sub]]");
        assert_eq!(resolve("[[Parent\\Sub]]"), "[[Parent/Sub]]");
        // A leading `:` drops the first namespace component as well
        assert_eq!(resolve("[[:Notebook:Parent:Sub]]"), "[[Parent/Sub]]");
        assert_eq!(resolve("[[:My Page]]"), "[My Page](My_Page)");
    }

    #[test]
    fn test_underscore_retry_keeps_label() {
        assert_eq!(resolve("[[My Page]]"), "[My Page](My_Page)");
    }

    #[test]
    fn test_folder_redirect() {
        assert_eq!(resolve("[[Home:Garden]]"), "[Home/Garden](Home/Garden/Garden)");
        assert_eq!(resolve("[[Mirror|m]]"), "[m](Mirror/Mirror)");
    }

    #[test]
    fn test_folder_notes_disabled() {
        let policy = Policy {
            folder_notes: false,
            ..Policy::default()
        };
        let map = vault_map(false);
        assert_eq!(
            link(&map, &policy, "Parent.txt", "[[Home:Garden]]").unwrap(),
            "[[Home/Garden]]"
        );
    }

    #[test]
    fn test_unresolved_link_passes_through() {
        let map = vault_map(true);
        let policy = Policy::default();
        let images = ImageCache::new();
        let resolver = LinkResolver::new(&map, &policy, &images);
        let diag = Diagnostics::new();

        let rendered = resolver
            .resolve_link(
                &LinkToken::new("[[Nowhere|x]]", "Nowhere|x"),
                &scope("Parent.txt"),
                &diag,
            )
            .unwrap();
        assert_eq!(rendered, "[[Nowhere|x]]");
        assert_eq!(
            diag.drain()[0].warning,
            Warning::UnresolvedLink("Nowhere".into())
        );
    }

    #[test]
    fn test_external_links() {
        assert_eq!(
            resolve("[[wp?Rust (programming language)]]"),
            "[Rust (programming language)](https://wikipedia.org/wiki/Rust_(programming_language))"
        );
        assert_eq!(
            resolve("[[https://zim-wiki.org|Zim]]"),
            "[Zim](https://zim-wiki.org)"
        );
        assert_eq!(
            resolve("[[https://zim-wiki.org]]"),
            "[https://zim-wiki.org](https://zim-wiki.org)"
        );
    }

    #[test]
    fn test_absolute_file_links() {
        assert_eq!(
            resolve("[[file:///srv/share/report.pdf|report]]"),
            "[report](file:///srv/share/report.pdf)"
        );
        let err = link(
            &vault_map(true),
            &Policy::default(),
            "Parent.txt",
            "[[file:///notes/Home/Garden/pasted_image.png]]",
        )
        .unwrap_err();
        assert!(matches!(err, ErrorKind::MisclassifiedAbsolutePath(_)));
    }

    #[test]
    fn test_relative_attachment_links() {
        let map = vault_map(true);
        let policy = Policy::default();
        assert_eq!(
            link(&map, &policy, "Home/Garden.txt", "[[./pasted_image.png]]").unwrap(),
            "[pasted_image.png](<pasted_image 1.png>)"
        );
        assert_eq!(
            link(&map, &policy, "Mirror.txt", "[[./doc.pdf]]").unwrap(),
            "[[doc.pdf]]"
        );
        assert_eq!(
            link(&map, &policy, "Mirror.txt", "[[./doc.pdf|./Doc]]").unwrap(),
            "[Doc](doc.pdf)"
        );

        let err = link(&map, &policy, "Mirror.txt", "[[./missing.pdf]]").unwrap_err();
        assert!(matches!(err, ErrorKind::MissingAttachment(_)));
    }

    #[test]
    fn test_mirrored_attachment_target() {
        let mut builder = VaultMapBuilder::new(NOTES, VAULT);
        builder.attachment(
            "/notes/Mirror/doc.pdf".into(),
            "/vault/Mirror/doc.pdf".into(),
        );
        let map = builder.finish();
        let policy = Policy {
            global_attachments: false,
            ..Policy::default()
        };
        assert_eq!(
            link(&map, &policy, "Mirror.txt", "[[./doc.pdf]]").unwrap(),
            "[doc.pdf](Mirror/doc.pdf)"
        );
    }

    #[test]
    fn test_embeds() {
        let dir = tempfile::TempDir::new().unwrap();
        let notes = dir.path().join("notes");
        std::fs::create_dir_all(notes.join("Page")).unwrap();
        image::RgbImage::new(200, 100)
            .save(notes.join("Page/img.png"))
            .unwrap();

        let mut builder = VaultMapBuilder::new(&notes, VAULT);
        builder.attachment(notes.join("Page/img.png"), "/vault/attachments/img.png".into());
        let map = builder.finish();
        let policy = Policy::default();
        let images = ImageCache::new();
        let resolver = LinkResolver::new(&map, &policy, &images);
        let scope = PageScope::new(&notes, &notes.join("Page.txt"));
        let diag = Diagnostics::new();

        let embed = |raw: &'static str| {
            let token = EmbedToken::new(raw, &raw[2..raw.len() - 2]);
            resolver.resolve_embed(&token, &scope, &diag).unwrap()
        };

        assert_eq!(embed("{{./img.png}}"), "![[img.png]]");
        assert_eq!(embed("{{./img.png?width=100}}"), "![[img.png|100x50]]");
        assert_eq!(embed("{{./img.png?height=20&type=image}}"), "![[img.png|40x20]]");
        assert_eq!(embed("{{./img.png?width=10&height=10}}"), "![[img.png|10x10]]");
        assert!(diag.is_empty());

        assert_eq!(embed("{{./img.png?width=abc}}"), "![[img.png]]");
        assert_eq!(embed("{{./img.png?href=x}}"), "![[img.png]]");
        assert_eq!(embed("{{other.png?width=5}}"), "![[other.png]]");
        assert_eq!(
            embed("{{file:///srv/scan.png?width=5&height=6}}"),
            "![5x6](file:///srv/scan.png)"
        );
        assert_eq!(embed("{{file:///srv/scan.png}}"), "![](file:///srv/scan.png)");

        let warnings: Vec<_> = diag.drain().into_iter().map(|w| w.warning).collect();
        assert_eq!(
            warnings,
            [
                Warning::InvalidEmbedOption {
                    key: "width".into(),
                    value: "abc".into()
                },
                Warning::UnknownEmbedOption("href".into()),
                Warning::UnsizedEmbed("other.png".into()),
            ]
        );
    }

    #[test]
    fn test_unreadable_embed_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let notes = dir.path().to_path_buf();
        std::fs::create_dir_all(notes.join("Page")).unwrap();
        std::fs::write(notes.join("Page/broken.png"), "nope").unwrap();

        let mut builder = VaultMapBuilder::new(&notes, VAULT);
        builder.attachment(
            notes.join("Page/broken.png"),
            "/vault/attachments/broken.png".into(),
        );
        let map = builder.finish();
        let policy = Policy::default();
        let images = ImageCache::new();
        let resolver = LinkResolver::new(&map, &policy, &images);
        let scope = PageScope::new(&notes, &notes.join("Page.txt"));
        let diag = Diagnostics::new();

        let raw = "{{./broken.png?width=10}}";
        let token = EmbedToken::new(raw, &raw[2..raw.len() - 2]);
        assert_eq!(
            resolver.resolve_embed(&token, &scope, &diag).unwrap(),
            "![[broken.png]]"
        );
        assert!(matches!(
            diag.drain()[0].warning,
            Warning::UnreadableImage { .. }
        ));
    }

    #[test]
    fn test_complete_size() {
        assert_eq!(complete_size(Some(100), None, (200, 100)), (100, 50));
        assert_eq!(complete_size(None, Some(30), (200, 100)), (60, 30));
        assert_eq!(complete_size(Some(99), None, (200, 100)), (99, 49));
    }

    #[test]
    fn test_lexical_join() {
        assert_eq!(
            lexical_join(Path::new("/notes/Home"), "./a/../b.png"),
            PathBuf::from("/notes/Home/b.png")
        );
        assert_eq!(
            lexical_join(Path::new("/notes"), "Parent/Sub"),
            PathBuf::from("/notes/Parent/Sub")
        );
    }
}
