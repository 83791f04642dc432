//! # scs-models
//!
//! A Rust library for reading and writing SCS Software model and prefab
//! files.
//!
//! ## Overview
//!
//! - `.pmd` / `.pmg`: model metadata and geometry, loaded together into
//!   a [`Model`]
//! - `.ppd`: prefab descriptors, loaded into a [`PrefabDescriptor`]
//!
//! Every reader rejects format versions it does not know and never
//! returns a partially populated object. Writers always produce the
//! newest supported layout, byte-identical to the input when nothing
//! was changed.
//!
//! ## Example - Prefab
//!
//! ```rust,no_run
//! use scs_models::PrefabDescriptor;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut ppd = PrefabDescriptor::open("prefab/cross.ppd")?;
//!
//!     for node in &ppd.nodes {
//!         println!("{:?} {} terrain variants", node.position, node.terrain_points.len());
//!     }
//!
//!     ppd.save("prefab/cross_0x19.ppd")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Model
//!
//! ```rust,no_run
//! use scs_models::Model;
//!
//! fn main() -> anyhow::Result<()> {
//!     let model = Model::open("vehicle/truck/cabin.pmd")?;
//!
//!     for look in &model.looks {
//!         println!("{}: {:?}", look.name, look.materials);
//!     }
//!
//!     model.save("out", "cabin")?;
//!     Ok(())
//! }
//! ```

pub mod asset_utils;
pub mod error;
pub mod flags;
pub mod fs;
pub mod io;
pub mod limited_list;
pub mod math;
pub mod model;
pub mod ppd;
pub mod token;
pub mod utils;

pub use error::{Error, Result};
pub use flags::{FlagField, Nibble};
pub use fs::{DiskFileSystem, FileSystem, MemoryFileSystem, ReadSeek};
pub use io::{read_records, write_records, Record};
pub use limited_list::LimitedList;
pub use math::{AxisAlignedBox, Quaternion, Vector2, Vector3, Vector4};
pub use model::Model;
pub use ppd::{PpdVersion, PrefabDescriptor};
pub use token::Token;
pub use utils::{collect_assets, create_glob_matcher, format_size, matches_filter, AssetKind};
