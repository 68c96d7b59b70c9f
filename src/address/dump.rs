//! JSON dumps of the vault map for inspection.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::{PathMap, VaultMap};
use crate::utils::path::{relative_slash, to_slash};

/// Write `folder_map.json`, `page_map.json` and `attachment_map.json` to `dir`.
///
/// Keys are relative to the notebook root, values relative to the vault
/// root, both `/` separated.
pub fn dump_maps(map: &VaultMap, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create `{}`", dir.display()))?;

    for (name, paths) in [
        ("folder_map.json", map.folders()),
        ("page_map.json", map.pages()),
        ("attachment_map.json", map.attachments()),
    ] {
        let path = dir.join(name);
        let json = serde_json::to_string_pretty(&to_json(map, paths))?;
        fs::write(&path, json).with_context(|| format!("failed to write `{}`", path.display()))?;
    }
    Ok(())
}

fn to_json(map: &VaultMap, paths: &PathMap) -> Value {
    let object: Map<String, Value> = paths
        .iter()
        .map(|(source, destination)| {
            let key = relative_slash(source, map.source_root()).unwrap_or_else(|| to_slash(source));
            let value = relative_slash(destination, map.destination_root())
                .unwrap_or_else(|| to_slash(destination));
            (key, Value::String(value))
        })
        .collect();
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::VaultMapBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_dump_maps() {
        let mut builder = VaultMapBuilder::new("/notes", "/vault");
        builder
            .folder("/notes/Home".into(), "/vault/Home".into())
            .page("/notes/Home.txt".into(), "/vault/Home/Home.md".into())
            .attachment(
                "/notes/Home/pasted_image.png".into(),
                "/vault/attachments/pasted_image.png".into(),
            );
        let map = builder.finish();

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("maps");
        dump_maps(&map, &out).unwrap();

        let read = |name: &str| -> Value {
            serde_json::from_str(&fs::read_to_string(out.join(name)).unwrap()).unwrap()
        };
        assert_eq!(read("folder_map.json")["Home"], "Home");
        assert_eq!(read("page_map.json")["Home.txt"], "Home/Home.md");
        assert_eq!(
            read("attachment_map.json")["Home/pasted_image.png"],
            "attachments/pasted_image.png"
        );
    }
}
