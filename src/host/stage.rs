//! In-memory scene stage
//!
//! A flat list of prims in definition order, persisted as JSON, with a
//! path index for lookups. Undo groups are snapshots of the prim list; the
//! newest [`MAX_UNDO`] closed groups are saved with the stage.

use crate::error::{VrError, VrResult};
use crate::host::{parent_path, validate_path, SceneHost};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Closed undo groups kept on the stage
pub const MAX_UNDO: usize = 20;

/// A single scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prim {
    pub path: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_binding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_xyz: Option<[f64; 3]>,
}

impl Prim {
    pub fn new(path: &str, type_name: &str) -> Self {
        Self {
            path: path.to_string(),
            type_name: type_name.to_string(),
            material_binding: None,
            rotate_xyz: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    label: String,
    prims: Vec<Prim>,
    #[serde(default)]
    selection: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Stage {
    prims: Vec<Prim>,
    #[serde(default)]
    selection: Vec<String>,
    /// Path -> position in `prims`
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    open_groups: Vec<Snapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    history: Vec<Snapshot>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> VrResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut stage: Stage = serde_json::from_str(&json)?;
        stage.reindex();
        debug!("Loaded stage {:?} ({} prims)", path, stage.prims.len());
        Ok(stage)
    }

    pub fn save(&self, path: &Path) -> VrResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn prims(&self) -> &[Prim] {
        &self.prims
    }

    pub fn prim(&self, path: &str) -> Option<&Prim> {
        self.index.get(path).map(|&idx| &self.prims[idx])
    }

    fn prim_mut(&mut self, path: &str) -> VrResult<&mut Prim> {
        match self.index.get(path) {
            Some(&idx) => Ok(&mut self.prims[idx]),
            None => Err(VrError::PrimNotFound(path.to_string())),
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .prims
            .iter()
            .enumerate()
            .map(|(idx, prim)| (prim.path.clone(), idx))
            .collect();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.prims = snapshot.prims;
        self.selection = snapshot.selection;
        self.reindex();
    }

    /// Define a prim, creating missing ancestors as untyped prims
    pub fn define_prim(&mut self, path: &str, type_name: &str) -> VrResult<()> {
        validate_path(path)?;
        if self.prim_exists(path) {
            return Err(VrError::PathExists(path.to_string()));
        }

        let parent = parent_path(path);
        if parent != "/" && !self.prim_exists(parent) {
            self.define_prim(parent, "")?;
        }

        self.index.insert(path.to_string(), self.prims.len());
        self.prims.push(Prim::new(path, type_name));
        Ok(())
    }

    /// Revert the most recent undo group, returning its label
    pub fn undo(&mut self) -> Option<String> {
        let snapshot = self.history.pop()?;
        debug!("↩️ Undo '{}'", snapshot.label);
        let label = snapshot.label.clone();
        self.restore(snapshot);
        Some(label)
    }

    /// Labels of undoable groups, oldest first
    pub fn undo_labels(&self) -> Vec<&str> {
        self.history.iter().map(|s| s.label.as_str()).collect()
    }
}

/// `path` rewritten from under `from` to under `to`, if it is in that subtree
fn reparent(path: &str, from: &str, to: &str) -> Option<String> {
    if path == from {
        return Some(to.to_string());
    }
    path.strip_prefix(from)
        .filter(|rest| rest.starts_with('/'))
        .map(|rest| format!("{}{}", to, rest))
}

impl SceneHost for Stage {
    fn prim_exists(&self, path: &str) -> bool {
        self.prim(path).is_some()
    }

    fn children(&self, path: &str) -> VrResult<Vec<String>> {
        if path != "/" && !self.prim_exists(path) {
            return Err(VrError::PrimNotFound(path.to_string()));
        }
        Ok(self
            .prims
            .iter()
            .filter(|prim| parent_path(&prim.path) == path)
            .map(|prim| prim.path.clone())
            .collect())
    }

    fn traverse(&self) -> Vec<String> {
        self.prims.iter().map(|prim| prim.path.clone()).collect()
    }

    fn selected_paths(&self) -> Vec<String> {
        self.selection.clone()
    }

    fn set_selection(&mut self, paths: Vec<String>) {
        self.selection = paths;
    }

    fn material_binding(&self, path: &str) -> VrResult<Option<String>> {
        self.prim(path)
            .map(|prim| prim.material_binding.clone())
            .ok_or_else(|| VrError::PrimNotFound(path.to_string()))
    }

    fn bind_material(&mut self, prims: &[String], material: &str) -> VrResult<()> {
        if !self.prim_exists(material) {
            return Err(VrError::PrimNotFound(material.to_string()));
        }
        if let Some(missing) = prims.iter().find(|path| !self.prim_exists(path)) {
            return Err(VrError::PrimNotFound(missing.clone()));
        }

        for path in prims {
            self.prim_mut(path)?.material_binding = Some(material.to_string());
        }
        debug!("Bound {} prim(s) to {}", prims.len(), material);
        Ok(())
    }

    fn move_prim(&mut self, from: &str, to: &str) -> VrResult<()> {
        validate_path(to)?;
        if !self.prim_exists(from) {
            return Err(VrError::PrimNotFound(from.to_string()));
        }
        if self.prim_exists(to) {
            return Err(VrError::PathExists(to.to_string()));
        }
        if reparent(to, from, to).is_some() {
            // `to` lies inside the subtree being moved
            return Err(VrError::InvalidPath(to.to_string()));
        }
        let new_parent = parent_path(to);
        if new_parent != "/" && !self.prim_exists(new_parent) {
            return Err(VrError::PrimNotFound(new_parent.to_string()));
        }

        for prim in &mut self.prims {
            if let Some(moved) = reparent(&prim.path, from, to) {
                prim.path = moved;
            }
            if let Some(binding) = prim.material_binding.as_deref() {
                if let Some(moved) = reparent(binding, from, to) {
                    prim.material_binding = Some(moved);
                }
            }
        }
        for selected in &mut self.selection {
            if let Some(moved) = reparent(selected, from, to) {
                *selected = moved;
            }
        }
        self.reindex();

        debug!("Moved {} -> {}", from, to);
        Ok(())
    }

    fn rotation(&self, path: &str) -> VrResult<[f64; 3]> {
        self.prim(path)
            .map(|prim| prim.rotate_xyz.unwrap_or([0.0; 3]))
            .ok_or_else(|| VrError::PrimNotFound(path.to_string()))
    }

    fn set_rotation(&mut self, path: &str, rotation: [f64; 3]) -> VrResult<()> {
        self.prim_mut(path)?.rotate_xyz = Some(rotation);
        Ok(())
    }

    fn begin_undo_group(&mut self, label: &str) {
        self.open_groups.push(Snapshot {
            label: label.to_string(),
            prims: self.prims.clone(),
            selection: self.selection.clone(),
        });
    }

    fn end_undo_group(&mut self) {
        if let Some(snapshot) = self.open_groups.pop() {
            // Nested groups fold into their parent
            if self.open_groups.is_empty() {
                self.history.push(snapshot);
                if self.history.len() > MAX_UNDO {
                    let dropped = self.history.len() - MAX_UNDO;
                    self.history.drain(..dropped);
                }
            }
        }
    }

    fn abort_undo_group(&mut self) {
        if let Some(snapshot) = self.open_groups.pop() {
            self.restore(snapshot);
        }
    }
}
