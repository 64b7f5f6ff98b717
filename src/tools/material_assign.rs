//! Material Assign
//!
//! Record the material of one prim, then select everything that shares it or
//! paste it onto other prims.

use crate::error::{VrError, VrResult};
use crate::host::{bound_objects, first_selected, with_undo_group, SceneHost};
use tracing::{debug, info};

#[derive(Debug, Default, Clone)]
pub struct MaterialAssign {
    recorded: Option<String>,
}

impl MaterialAssign {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded material path, if any
    pub fn recorded(&self) -> Option<&str> {
        self.recorded.as_deref()
    }

    /// Human readable status line
    pub fn status(&self) -> String {
        match &self.recorded {
            Some(path) => path.clone(),
            None => "Not recorded".to_string(),
        }
    }

    /// Record the material directly bound to the first selected prim.
    ///
    /// Leaves the previous recording untouched when nothing is selected or
    /// the prim has no binding.
    pub fn record<H: SceneHost + ?Sized>(&mut self, host: &H) -> VrResult<Option<&str>> {
        let Some(path) = first_selected(host) else {
            debug!("Record: nothing selected");
            return Ok(None);
        };

        match host.material_binding(&path)? {
            Some(material) => {
                info!("🎨 Recorded material {}", material);
                self.recorded = Some(material);
                Ok(self.recorded.as_deref())
            }
            None => {
                debug!("Record: {} has no material binding", path);
                Ok(None)
            }
        }
    }

    /// Select every prim bound to the material of the first selected prim.
    ///
    /// Returns the new selection.
    pub fn select_bound_objects<H: SceneHost + ?Sized>(&self, host: &mut H) -> VrResult<Vec<String>> {
        let path = first_selected(host).ok_or(VrError::NoSelection)?;
        let Some(material) = host.material_binding(&path)? else {
            return Ok(Vec::new());
        };

        let objects = bound_objects(host, &material)?;
        info!("🔎 {} prim(s) bound to {}", objects.len(), material);
        host.set_selection(objects.clone());
        Ok(objects)
    }

    /// Bind the recorded material to every selected prim
    pub fn assign<H: SceneHost + ?Sized>(&self, host: &mut H) -> VrResult<usize> {
        let material = self.recorded.as_deref().ok_or(VrError::NothingRecorded)?;
        let paths = host.selected_paths();
        if paths.is_empty() {
            return Err(VrError::NoSelection);
        }

        with_undo_group(host, "Assign Material", |host| {
            host.bind_material(&paths, material)
        })?;
        info!("🎨 Assigned {} to {} prim(s)", material, paths.len());
        Ok(paths.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Stage;

    fn stage() -> Stage {
        let mut stage = Stage::new();
        stage.define_prim("/World/Looks/Chrome", "Material").unwrap();
        stage.define_prim("/World/Looks/Rubber", "Material").unwrap();
        stage.define_prim("/World/Car/Grille", "Mesh").unwrap();
        stage.define_prim("/World/Car/Mirror", "Mesh").unwrap();
        stage.define_prim("/World/Car/Tire", "Mesh").unwrap();
        stage
            .bind_material(
                &["/World/Car/Grille".to_string(), "/World/Car/Mirror".to_string()],
                "/World/Looks/Chrome",
            )
            .unwrap();
        stage
    }

    #[test]
    fn test_record_and_assign() {
        let mut stage = stage();
        let mut tool = MaterialAssign::new();
        assert_eq!(tool.status(), "Not recorded");

        stage.set_selection(vec!["/World/Car/Grille".to_string()]);
        assert_eq!(tool.record(&stage).unwrap(), Some("/World/Looks/Chrome"));

        stage.set_selection(vec!["/World/Car/Tire".to_string()]);
        assert_eq!(tool.assign(&mut stage).unwrap(), 1);
        assert_eq!(
            stage.material_binding("/World/Car/Tire").unwrap().as_deref(),
            Some("/World/Looks/Chrome")
        );
        assert_eq!(stage.undo_labels(), vec!["Assign Material"]);
    }

    #[test]
    fn test_record_unbound_keeps_previous() {
        let mut stage = stage();
        let mut tool = MaterialAssign::new();
        stage.set_selection(vec!["/World/Car/Grille".to_string()]);
        tool.record(&stage).unwrap();

        stage.set_selection(vec!["/World/Car/Tire".to_string()]);
        assert_eq!(tool.record(&stage).unwrap(), None);
        assert_eq!(tool.recorded(), Some("/World/Looks/Chrome"));
    }

    #[test]
    fn test_assign_without_record() {
        let mut stage = stage();
        stage.set_selection(vec!["/World/Car/Tire".to_string()]);
        assert!(matches!(
            MaterialAssign::new().assign(&mut stage),
            Err(VrError::NothingRecorded)
        ));
    }

    #[test]
    fn test_select_bound_objects() {
        let mut stage = stage();
        stage.set_selection(vec!["/World/Car/Mirror".to_string()]);

        let selected = MaterialAssign::new().select_bound_objects(&mut stage).unwrap();
        assert_eq!(selected, vec!["/World/Car/Grille", "/World/Car/Mirror"]);
        assert_eq!(stage.selected_paths(), selected);
    }

    #[test]
    fn test_select_bound_objects_needs_selection() {
        let mut stage = stage();
        assert!(matches!(
            MaterialAssign::new().select_bound_objects(&mut stage),
            Err(VrError::NoSelection)
        ));
    }
}
