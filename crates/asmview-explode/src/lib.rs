//! Explode engine for the asmview assembly viewer.
//!
//! Given a loaded [`asmview_scene::Scene`], this crate decides whether the
//! asset can be meaningfully exploded, partitions meshes into independently
//! movable parts, and drives their radial separation as a user-controlled
//! amount in `[0, 1]` changes. The original asset is never corrupted: source
//! geometries and materials are read, cloned and left alone, and
//! [`Exploder::reset`] restores the pre-partition graph exactly.
//!
//! # Design principles
//!
//! - **Synchronous**: partitioning and conversion run inside the discrete
//!   state transition that triggers them, never per frame.
//! - **Prepare once**: the Unprepared→Prepared transition happens on the
//!   first [`Exploder::apply`] call and is terminal until reset.
//! - **O(parts) updates**: per-amount work only rewrites cached offsets.
//!
//! # Key entry points
//!
//! - [`detect_capability`]: can this scene explode at all?
//! - [`Exploder::apply`]: lazily partition, then position parts.
//! - [`extract_sub_geometry`]: attribute-complete sub-buffer extraction.

mod capability;
mod engine;
mod error;
mod extract;
mod material;
mod partition;
mod picking;

pub use capability::{Capability, CapabilityReason, detect_capability};
pub use engine::{Exploder, ExplodeRecord, FALLBACK_AXIS};
pub use error::ExtractError;
pub use extract::{Extraction, IndexSelection, extract_sub_geometry};
pub use material::MaterialCache;
pub use picking::{NoopPickingAccel, PickingAccel, index_scene_geometries};
