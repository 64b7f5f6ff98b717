//! Material Output
//!
//! Exports `{ material name: [bound object names] }` for every material under
//! a looks container.

use crate::error::{VrError, VrResult};
use crate::host::{bound_objects, first_selected, prim_name, SceneHost};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Material name -> names of the prims bound to it
pub type MaterialBindings = BTreeMap<String, Vec<String>>;

#[derive(Debug, Default, Clone)]
pub struct MaterialOutput {
    pub looks_path: Option<String>,
}

impl MaterialOutput {
    pub fn new(looks_path: &str) -> Self {
        Self {
            looks_path: Some(looks_path.to_string()),
        }
    }

    /// Use the first selected prim as the looks container.
    ///
    /// Returns false and leaves the path alone when nothing is selected.
    pub fn set_looks_path_from_selection<H: SceneHost + ?Sized>(&mut self, host: &H) -> bool {
        match first_selected(host) {
            Some(path) => {
                self.looks_path = Some(path);
                true
            }
            None => false,
        }
    }

    /// Collect the bound object names of every material in the container
    pub fn collect<H: SceneHost + ?Sized>(&self, host: &H) -> VrResult<MaterialBindings> {
        let looks_path = self
            .looks_path
            .as_deref()
            .ok_or(VrError::PathNotSet("Looks"))?;

        let mut data = MaterialBindings::new();
        for material in host.children(looks_path)? {
            let objects = bound_objects(host, &material)?
                .iter()
                .map(|path| prim_name(path).to_string())
                .collect();
            data.insert(prim_name(&material).to_string(), objects);
        }
        Ok(data)
    }

    /// Collect and write the export file, returning the path written.
    ///
    /// `extension` is appended when `path` has none.
    pub fn export<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        path: &Path,
        extension: &str,
    ) -> VrResult<PathBuf> {
        let data = self.collect(host)?;

        let path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(extension)
        };
        write_export(&path, &data)?;

        info!("💾 Exported {} material(s) to {:?}", data.len(), path);
        Ok(path)
    }
}

/// Write the bindings as compact UTF-8 JSON, replacing any existing file
pub fn write_export(path: &Path, data: &MaterialBindings) -> VrResult<()> {
    let json = serde_json::to_string(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Stage;

    fn stage() -> Stage {
        let mut stage = Stage::new();
        stage.define_prim("/World/Looks/Chrome", "Material").unwrap();
        stage.define_prim("/World/Looks/Unused", "Material").unwrap();
        stage.define_prim("/World/Car", "Xform").unwrap();
        stage.define_prim("/World/Car/Grille", "Mesh").unwrap();
        stage.define_prim("/World/Bike/Grille", "Mesh").unwrap();
        stage
            .bind_material(
                &["/World/Car".to_string(), "/World/Bike/Grille".to_string()],
                "/World/Looks/Chrome",
            )
            .unwrap();
        stage
    }

    #[test]
    fn test_collect() {
        let data = MaterialOutput::new("/World/Looks").collect(&stage()).unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data["Chrome"], vec!["Car", "Grille", "Grille"]);
        assert!(data["Unused"].is_empty());
    }

    #[test]
    fn test_collect_requires_looks_path() {
        assert!(matches!(
            MaterialOutput::default().collect(&stage()),
            Err(VrError::PathNotSet("Looks"))
        ));
        assert!(matches!(
            MaterialOutput::new("/World/Nope").collect(&stage()),
            Err(VrError::PrimNotFound(_))
        ));
    }

    #[test]
    fn test_looks_path_from_selection() {
        let mut stage = stage();
        let mut output = MaterialOutput::default();
        assert!(!output.set_looks_path_from_selection(&stage));
        assert_eq!(output.looks_path, None);

        stage.set_selection(vec!["/World/Looks".to_string(), "/World/Car".to_string()]);
        assert!(output.set_looks_path_from_selection(&stage));
        assert_eq!(output.looks_path.as_deref(), Some("/World/Looks"));
        assert_eq!(output.collect(&stage).unwrap()["Chrome"].len(), 3);

        stage.set_selection(Vec::new());
        assert!(!output.set_looks_path_from_selection(&stage));
        assert_eq!(output.looks_path.as_deref(), Some("/World/Looks"));
    }

    #[test]
    fn test_export_writes_json_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("materials");
        std::fs::write(target.with_extension("ovmt"), "stale content that is longer").unwrap();

        let written = MaterialOutput::new("/World/Looks")
            .export(&stage(), &target, "ovmt")
            .unwrap();
        assert_eq!(written, target.with_extension("ovmt"));

        let content = std::fs::read_to_string(&written).unwrap();
        let parsed: MaterialBindings = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["Chrome"].len(), 3);
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_export_keeps_given_extension() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("materials.json");

        let written = MaterialOutput::new("/World/Looks")
            .export(&stage(), &target, "ovmt")
            .unwrap();
        assert_eq!(written, target);
    }

    #[test]
    fn test_export_write_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing_dir").join("materials.ovmt");

        let result = MaterialOutput::new("/World/Looks").export(&stage(), &target, "ovmt");
        assert!(matches!(result, Err(VrError::Io(_))));
    }
}
