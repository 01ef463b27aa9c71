//! Package records, the installed-package manifest and version matching.

mod manifest;
mod record;
mod version;

pub use manifest::{Manifest, ManifestStore};
pub use record::PackageRecord;
pub use version::{RuntimeSupport, VersionResolver, parse_version};
