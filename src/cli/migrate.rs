//! Vault migration orchestration.
//!
//! Migration phases:
//! - **Map** - Walk the notebook and freeze the vault map
//! - **Dump** - Optionally write the maps as JSON
//! - **Layout** - Create the vault folders
//! - **Copy** - Copy attachments (parallel)
//! - **Translate** - Rewrite pages to markdown (parallel)
//! - **Report** - Warnings per page, summary line

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;

use crate::{
    address::{LinkResolver, PageScope, PathMapper, VaultMap, dump_maps},
    config::MigrateConfig,
    core::{Diagnostics, ErrorKind, LineWarning, MigrateError},
    debug,
    image::ImageCache,
    log,
    logger::ProgressLine,
    markup::{PageContext, translate_page},
    utils::{date::CalendarDate, plural_count},
};

/// Migrate the notebook into the vault.
pub fn migrate_vault(config: &MigrateConfig) -> Result<()> {
    let map = PathMapper::new(config.source_root(), config.destination_root(), &config.policy)
        .map()?;

    if let Some(dir) = &config.paths.dump_maps {
        dump_maps(&map, dir)?;
        log!("migrate"; "maps written to {}", dir.display());
    }

    create_layout(&map, config)?;

    let progress = ProgressLine::new(
        "migrate",
        &[
            ("attachments", map.attachments().len()),
            ("pages", map.pages().len()),
        ],
    );
    let result = copy_attachments(&map, &progress)
        .and_then(|()| translate_pages(&map, config, &progress));
    progress.finish();
    let warnings = result?;

    log!(
        "migrate";
        "{}, {} and {} written to {}",
        plural_count(map.folders().len(), "folder"),
        plural_count(map.attachments().len(), "attachment"),
        plural_count(map.pages().len(), "page"),
        config.destination_root().display()
    );
    if warnings > 0 {
        log!("warning"; "{}", plural_count(warnings, "warning"));
    }
    Ok(())
}

/// Create the vault root, every mapped folder and every page's parent.
fn create_layout(map: &VaultMap, config: &MigrateConfig) -> Result<()> {
    let mut dirs: Vec<&Path> = vec![config.destination_root()];
    dirs.extend(map.folders().values().map(PathBuf::as_path));
    dirs.extend(map.pages().values().filter_map(|p| p.parent()));
    dirs.extend(map.attachments().values().filter_map(|p| p.parent()));
    dirs.sort_unstable();
    dirs.dedup();

    for dir in dirs {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory `{}`", dir.display()))?;
    }
    Ok(())
}

/// Copy every attachment to its destination.
fn copy_attachments(map: &VaultMap, progress: &ProgressLine) -> Result<()> {
    map.attachments()
        .par_iter()
        .try_for_each(|(source, destination)| {
            fs::copy(source, destination).with_context(|| {
                format!(
                    "failed to copy `{}` to `{}`",
                    source.display(),
                    destination.display()
                )
            })?;
            progress.inc("attachments");
            Ok(())
        })
}

/// Translate every page, returning the number of warnings.
///
/// The first fatal error stops the remaining pages.
fn translate_pages(
    map: &VaultMap,
    config: &MigrateConfig,
    progress: &ProgressLine,
) -> Result<usize> {
    let images = ImageCache::new();
    let today = CalendarDate::today();
    let warnings = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);

    map.pages()
        .par_iter()
        .try_for_each(|(source, destination)| {
            if failed.load(Ordering::Relaxed) {
                return Err(anyhow!("Migration aborted"));
            }

            let diagnostics = Diagnostics::new();
            let ctx = PageContext {
                scope: PageScope::new(map.source_root(), source),
                resolver: LinkResolver::new(map, &config.policy, &images),
                today,
                diagnostics: &diagnostics,
            };

            let page = match translate_file(source, &ctx) {
                Ok(page) => page,
                Err(e) => {
                    if !failed.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}", e);
                    }
                    return Err(anyhow!("Migration failed"));
                }
            };
            fs::write(destination, page)
                .with_context(|| format!("failed to write `{}`", destination.display()))?;

            if !diagnostics.is_empty() {
                let page_warnings = diagnostics.drain();
                report_warnings(&ctx.scope.relative, &page_warnings);
                warnings.fetch_add(page_warnings.len(), Ordering::Relaxed);
            }
            progress.inc("pages");
            Ok(())
        })?;

    debug!("migrate"; "read {} image headers", images.len());
    Ok(warnings.into_inner())
}

fn translate_file(source: &Path, ctx: &PageContext<'_>) -> Result<String, MigrateError> {
    let text = fs::read_to_string(source).map_err(|e| {
        MigrateError::new(
            &ctx.scope.relative,
            None,
            ErrorKind::Io(source.to_path_buf(), e),
        )
    })?;
    translate_page(&text, ctx)
}

/// Log a page's warnings as `page:line: message`.
fn report_warnings(page: &Path, warnings: &[LineWarning]) {
    for LineWarning { line, warning } in warnings {
        log!("warning"; "{}:{}: {}", page.display(), line, warning);
    }
}
