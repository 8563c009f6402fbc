pub mod catalog;
pub mod error;
pub mod registry;

pub use catalog::Catalog;
pub use error::{DiscoveryError, SourceFailure};
pub use registry::{DiscoverySource, Registry};
