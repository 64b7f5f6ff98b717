//! Scene Host
//!
//! The panels never touch a scene directly: they talk to a [`SceneHost`],
//! the capability set a scene-authoring application exposes (children,
//! selection, material bindings, namespace edits, undo groups).
//! [`Stage`] is the in-memory, JSON-persisted implementation.

pub mod stage;

pub use stage::{Prim, Stage};

use crate::error::{VrError, VrResult};
use tracing::debug;

/// Capabilities the panels need from a scene-authoring host
pub trait SceneHost {
    /// Whether a prim exists at `path`
    fn prim_exists(&self, path: &str) -> bool;

    /// Child prim paths of `path`, in traversal order
    fn children(&self, path: &str) -> VrResult<Vec<String>>;

    /// Every prim path on the stage, in traversal order
    fn traverse(&self) -> Vec<String>;

    /// Currently selected prim paths
    fn selected_paths(&self) -> Vec<String>;

    /// Replace the selection
    fn set_selection(&mut self, paths: Vec<String>);

    /// The material directly bound to a prim (its `material:binding` target)
    fn material_binding(&self, path: &str) -> VrResult<Option<String>>;

    /// Bind `material` to every prim in `prims`
    fn bind_material(&mut self, prims: &[String], material: &str) -> VrResult<()>;

    /// Move (rename) a prim and its subtree
    fn move_prim(&mut self, from: &str, to: &str) -> VrResult<()>;

    /// The prim's XYZ rotation in degrees
    fn rotation(&self, path: &str) -> VrResult<[f64; 3]>;

    fn set_rotation(&mut self, path: &str, rotation: [f64; 3]) -> VrResult<()>;

    /// Open an undo group; groups may nest
    fn begin_undo_group(&mut self, label: &str);

    /// Close the innermost undo group, keeping its edits
    fn end_undo_group(&mut self);

    /// Close the innermost undo group, reverting its edits
    fn abort_undo_group(&mut self);
}

/// Run `f` inside one undo group.
///
/// On error the group is aborted so the host is left as it was.
pub fn with_undo_group<H, T, F>(host: &mut H, label: &str, f: F) -> VrResult<T>
where
    H: SceneHost + ?Sized,
    F: FnOnce(&mut H) -> VrResult<T>,
{
    host.begin_undo_group(label);
    match f(host) {
        Ok(value) => {
            host.end_undo_group();
            Ok(value)
        }
        Err(e) => {
            debug!("Undo group '{}' aborted: {}", label, e);
            host.abort_undo_group();
            Err(e)
        }
    }
}

/// Names of the children of `path`
pub fn child_names<H: SceneHost + ?Sized>(host: &H, path: &str) -> VrResult<Vec<String>> {
    Ok(host
        .children(path)?
        .iter()
        .map(|child| prim_name(child).to_string())
        .collect())
}

/// First selected prim path, if any
pub fn first_selected<H: SceneHost + ?Sized>(host: &H) -> Option<String> {
    host.selected_paths().into_iter().next()
}

/// The material that applies to a prim: its own binding, else the nearest
/// ancestor's.
pub fn bound_material<H: SceneHost + ?Sized>(host: &H, path: &str) -> VrResult<Option<String>> {
    if let Some(material) = host.material_binding(path)? {
        return Ok(Some(material));
    }

    let mut current = parent_path(path);
    while current != "/" {
        if host.prim_exists(current) {
            if let Some(material) = host.material_binding(current)? {
                return Ok(Some(material));
            }
        }
        current = parent_path(current);
    }
    Ok(None)
}

/// Every prim whose bound material is `material`, in traversal order.
///
/// Material prims themselves are never bound, so they are not reported.
pub fn bound_objects<H: SceneHost + ?Sized>(host: &H, material: &str) -> VrResult<Vec<String>> {
    let mut objects = Vec::new();
    for path in host.traverse() {
        if bound_material(host, &path)?.as_deref() == Some(material) {
            objects.push(path);
        }
    }
    Ok(objects)
}

/// Last segment of a prim path
pub fn prim_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Parent of a prim path; top-level prims have the root `/` as parent
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Join a container path and a child name
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    format!("{}/{}", parent, name)
}

/// Check a prim path is absolute and has no empty segments
pub fn validate_path(path: &str) -> VrResult<()> {
    let valid = path.len() > 1
        && path.starts_with('/')
        && path[1..].split('/').all(|segment| !segment.is_empty());
    if valid {
        Ok(())
    } else {
        Err(VrError::InvalidPath(path.to_string()))
    }
}
