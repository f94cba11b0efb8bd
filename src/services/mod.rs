//! Service layer for the release tracker.
//!
//! - `Extractor`: Reads release details out of an announcement page
//! - `ReleaseCatalog`: Validates input and stores releases

pub mod catalog;
pub mod extractor;

pub use catalog::{NewRelease, ReleaseCatalog};
pub use extractor::{Analysis, Extractor};
