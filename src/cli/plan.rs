//! Dry run: build the vault map and report it without touching the vault.

use std::path::Path;

use anyhow::Result;

use crate::{
    address::{PathMapper, VaultMap, dump_maps},
    config::MigrateConfig,
    debug, log,
    utils::{path::relative_slash, plural_count},
};

/// Map the notebook and log what `migrate` would write.
pub fn plan_vault(config: &MigrateConfig) -> Result<()> {
    let map = PathMapper::new(config.source_root(), config.destination_root(), &config.policy)
        .map()?;

    if let Some(dir) = &config.paths.dump_maps {
        dump_maps(&map, dir)?;
        log!("plan"; "maps written to {}", dir.display());
    }

    for (source, destination) in map.pages() {
        debug!(
            "plan";
            "{} -> {}",
            display(source, map.source_root()),
            display(destination, map.destination_root())
        );
    }

    let renames = renamed_attachments(&map);
    for (source, destination) in &renames {
        log!("plan"; "rename {} -> {}", source, destination);
    }

    log!(
        "plan";
        "{}, {} and {} ({} renamed) into {}",
        plural_count(map.folders().len(), "folder"),
        plural_count(map.pages().len(), "page"),
        plural_count(map.attachments().len(), "attachment"),
        renames.len(),
        config.destination_root().display()
    );
    Ok(())
}

/// Attachments whose file name changes, as display strings.
fn renamed_attachments(map: &VaultMap) -> Vec<(String, String)> {
    map.attachments()
        .iter()
        .filter(|(source, destination)| source.file_name() != destination.file_name())
        .map(|(source, destination)| {
            (
                display(source, map.source_root()),
                display(destination, map.destination_root()),
            )
        })
        .collect()
}

fn display(path: &Path, root: &Path) -> String {
    relative_slash(path, root).unwrap_or_else(|| path.display().to_string())
}
