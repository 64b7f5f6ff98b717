//! Material Match
//!
//! Matches the materials under one container to replacement materials under
//! another by name, then rebinds everything in one undo group.

use crate::error::{VrError, VrResult};
use crate::host::{
    bound_objects, child_names, first_selected, join_path, with_undo_group, SceneHost,
};
use crate::matcher::{classify_by_similarity, MatchChoice, MatchResult};
use tracing::{debug, info};

/// One rebind issued by a commit
#[derive(Debug, Clone, PartialEq)]
pub struct Rebind {
    pub objects: Vec<String>,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Default, Clone)]
pub struct MaterialMatch {
    pub materials_path: Option<String>,
    pub replace_path: Option<String>,
}

impl MaterialMatch {
    pub fn new(materials_path: &str, replace_path: &str) -> Self {
        Self {
            materials_path: Some(materials_path.to_string()),
            replace_path: Some(replace_path.to_string()),
        }
    }

    /// Use the first selected prim as the source container
    pub fn set_materials_path_from_selection<H: SceneHost + ?Sized>(&mut self, host: &H) -> bool {
        match first_selected(host) {
            Some(path) => {
                self.materials_path = Some(path);
                true
            }
            None => false,
        }
    }

    /// Use the first selected prim as the replacement container
    pub fn set_replace_path_from_selection<H: SceneHost + ?Sized>(&mut self, host: &H) -> bool {
        match first_selected(host) {
            Some(path) => {
                self.replace_path = Some(path);
                true
            }
            None => false,
        }
    }

    fn paths(&self) -> VrResult<(&str, &str)> {
        let materials = self
            .materials_path
            .as_deref()
            .ok_or(VrError::PathNotSet("Materials"))?;
        let replace = self
            .replace_path
            .as_deref()
            .ok_or(VrError::PathNotSet("Replace"))?;
        Ok((materials, replace))
    }

    /// Propose a replacement for every material in the source container
    pub fn run<H: SceneHost + ?Sized>(&self, host: &H) -> VrResult<MatchResult> {
        let (materials_path, replace_path) = self.paths()?;

        let materials = child_names(host, materials_path)?;
        let replacements = child_names(host, replace_path)?;

        let result = classify_by_similarity(&materials, &replacements);
        let unmatched = result
            .rows()
            .iter()
            .filter(|row| row.choice == MatchChoice::None)
            .count();
        info!(
            "🔗 Matched {} material(s) against {} replacement(s), {} without a match",
            materials.len(),
            replacements.len(),
            unmatched
        );
        Ok(result)
    }

    /// Rebind every prim bound to a matched source material to its
    /// replacement, all in one undo group. Consumes the result.
    pub fn commit<H: SceneHost + ?Sized>(&self, host: &mut H, result: MatchResult) -> VrResult<Vec<Rebind>> {
        let (materials_path, replace_path) = self.paths()?;

        let mut rebinds = Vec::new();
        for (source, candidate) in result.into_rebinds() {
            let from = join_path(materials_path, &source);
            let objects = bound_objects(host, &from)?;
            if objects.is_empty() {
                debug!("Nothing bound to {}, skipping", from);
                continue;
            }
            rebinds.push(Rebind {
                objects,
                from,
                to: join_path(replace_path, &candidate),
            });
        }

        with_undo_group(host, "Material Match", |host| {
            for rebind in &rebinds {
                host.bind_material(&rebind.objects, &rebind.to)?;
            }
            Ok(())
        })?;

        info!("✅ Issued {} rebind(s)", rebinds.len());
        Ok(rebinds)
    }
}
