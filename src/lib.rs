//! Bounds-checked parsing of the resource directory in Windows PE images.
//!
//! Every offset in a resource section comes from the file, so the tree
//! builder borrows each raw structure only after the bounds oracle has
//! accepted it. Malformed branches are dropped and reported as
//! [`ResourceAnomaly`] values; only allocation failure aborts a build.
//!
//! ```no_run
//! use pe_resource_tree::{MappedImage, IOLimits, ParseOptions};
//!
//! # fn main() -> pe_resource_tree::Result<()> {
//! let image = MappedImage::open("sample.exe", IOLimits::default())?;
//! let parser = image.parser(ParseOptions::default())?;
//! for entry in parser.resources()?.entries() {
//!     println!("{:?} {:?} {} bytes", entry.type_id, entry.name_id, entry.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod formats;
pub mod io;
pub mod logging;

pub use error::{Error, Result};
pub use formats::pe::directories::resources::{
    lookup_type_descriptor, NodeId, NodeKind, RawNode, ResourceAnomaly, ResourceEntrySummary,
    ResourceId, ResourceNode, ResourceSearchResult, ResourceTree, ResourceTypeDescriptor,
    ResourcesView,
};
pub use formats::pe::{ParseOptions, PeError, PeParser};
pub use io::{IOLimits, MappedImage};
