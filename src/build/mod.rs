//! Static build: render every package and served file into an output root.

mod compile;
mod pipeline;
mod render;
mod writer;

pub use compile::{CommandCompiler, INPUT_PLACEHOLDER};
pub use pipeline::{BuildStats, Builder};
pub use render::{CachedRenderer, Compiler, PackRenderer, RenderCache, Renderer};
pub use writer::{ArtifactWriter, FsWriter};
