//! Configuration sections.

mod build;
mod compile;
mod package;
mod serve;

pub use build::{BuildConfig, BusterKind};
pub use compile::CompilerEntry;
pub use package::PackageEntry;
pub use serve::ServeEntry;
