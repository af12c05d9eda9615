mod collection;
mod registry;

pub use collection::{CollectionError, ZoneCollection};
pub use registry::ZoneRegistry;
