//! Data directory parsers

pub mod resources;

pub use resources::{load_resources, locate_resource_base, ResourceEntrySummary, ResourcesView};
