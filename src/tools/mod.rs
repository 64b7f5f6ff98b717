//! Panels
//!
//! One controller per VR Tools panel. Each works against any [`SceneHost`].
//!
//! [`SceneHost`]: crate::host::SceneHost

pub mod batch_rename;
pub mod material_assign;
pub mod material_match;
pub mod material_output;
pub mod rotate_tool;
pub mod usd_converter;

pub use batch_rename::{BatchRename, RenameMode};
pub use material_assign::MaterialAssign;
pub use material_match::{MaterialMatch, Rebind};
pub use material_output::{MaterialBindings, MaterialOutput};
pub use rotate_tool::{Axis, Direction, Turntable};
pub use usd_converter::{
    AssetConverter, ConversionHandle, ConvertProgress, ExternalConverter, ProgressReporter,
    UsdConverter,
};
