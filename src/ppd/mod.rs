//! Prefab descriptor (`.ppd`) reader and writer
//!
//! A prefab descriptor holds everything about a prefab that is not
//! geometry: where roads attach, AI and GPS navigation, signs, traffic
//! lights, spawn points and the map overlay.
//!
//! ## Format Overview
//!
//! - `u32` version (0x15 to 0x19)
//! - `u32` section counts (ten before 0x16, eleven after)
//! - `u32` section offsets (ignored on read)
//! - Sections, back to back, in a fixed order
//!
//! Revisions 0x15 to 0x19 can be read. Saving always produces 0x19.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scs_models::ppd::PrefabDescriptor;
//!
//! let mut ppd = PrefabDescriptor::open("prefab/cross.ppd")?;
//! for curve in &ppd.nav_curves {
//!     println!("{} {:?}", curve.name, curve.blinker());
//! }
//! ppd.save("prefab/cross_new.ppd")?;
//! # Ok::<(), scs_models::Error>(())
//! ```

mod control_node;
mod definitions;
mod descriptor;
mod nav_curve;
mod nav_node;
mod semaphore;
mod terrain;
mod version;

pub use control_node::ControlNode;
pub use definitions::{Intersection, MapPoint, Sign, SpawnPoint, SpawnPointType, TriggerPoint};
pub use descriptor::PrefabDescriptor;
pub use nav_curve::{AllowedVehicles, BlinkerType, NavCurve, NodeLane};
pub use nav_node::{NavNode, NavNodeConnection, NavNodeType};
pub use semaphore::{Semaphore, SemaphoreType};
pub use terrain::{TerrainPoint, TerrainPointMap, TerrainPointVariant};
pub use version::PpdVersion;
