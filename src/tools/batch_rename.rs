//! Batch Rename
//!
//! Adds a prefix or suffix to the name of every selected prim.

use crate::error::VrResult;
use crate::host::{join_path, parent_path, prim_name, with_undo_group, SceneHost};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where the rename text goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameMode {
    Prefix,
    #[default]
    Suffix,
}

impl std::str::FromStr for RenameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix" => Ok(RenameMode::Prefix),
            "suffix" => Ok(RenameMode::Suffix),
            other => Err(format!("unknown rename mode '{}'", other)),
        }
    }
}

/// New path for `path` with `text` joined to its name by `_`
pub fn renamed_path(path: &str, mode: RenameMode, text: &str) -> String {
    let name = prim_name(path);
    let new_name = match mode {
        RenameMode::Prefix => format!("{}_{}", text, name),
        RenameMode::Suffix => format!("{}_{}", name, text),
    };
    join_path(parent_path(path), &new_name)
}

#[derive(Debug, Clone)]
pub struct BatchRename {
    pub mode: RenameMode,
    pub text: String,
}

impl BatchRename {
    pub fn new(mode: RenameMode, text: &str) -> Self {
        Self {
            mode,
            text: text.to_string(),
        }
    }

    /// Rename the selection in one undo group.
    ///
    /// Returns `(old, new)` path pairs; empty rename text does nothing.
    pub fn run<H: SceneHost + ?Sized>(&self, host: &mut H) -> VrResult<Vec<(String, String)>> {
        if self.text.is_empty() {
            return Ok(Vec::new());
        }

        let selection = host.selected_paths();
        if selection.is_empty() {
            return Ok(Vec::new());
        }

        // Children first, so a renamed parent never invalidates a pending path
        let mut paths = selection.clone();
        paths.sort_by_key(|path| std::cmp::Reverse(path.matches('/').count()));

        let renames: Vec<(String, String)> = paths
            .iter()
            .map(|path| (path.clone(), renamed_path(path, self.mode, &self.text)))
            .collect();

        with_undo_group(host, "Batch Rename", |host| {
            for (from, to) in &renames {
                host.move_prim(from, to)?;
            }
            Ok(())
        })?;

        let renames = final_paths(&renames);
        host.set_selection(
            selection
                .iter()
                .filter_map(|path| renames.iter().find(|(from, _)| from == path))
                .map(|(_, to)| to.clone())
                .collect(),
        );

        info!("✏️ Renamed {} prim(s)", renames.len());
        Ok(renames)
    }
}

/// Where each renamed prim ends up once its renamed ancestors have moved too.
/// `renames` is ordered children first.
fn final_paths(renames: &[(String, String)]) -> Vec<(String, String)> {
    renames
        .iter()
        .enumerate()
        .map(|(i, (from, to))| {
            let mut path = to.clone();
            for (ancestor_from, ancestor_to) in &renames[i + 1..] {
                if let Some(rest) = path.strip_prefix(ancestor_from.as_str()) {
                    if rest.starts_with('/') {
                        path = format!("{}{}", ancestor_to, rest);
                    }
                }
            }
            (from.clone(), path)
        })
        .collect()
}
