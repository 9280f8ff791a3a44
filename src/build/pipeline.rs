//! Build orchestration.
//!
//! Pipeline phases:
//! - **Discover** - index every served file, expand package specs
//! - **Packages** - render each package, write canonical + busted copies
//! - **Files** - same for every served file outside all packages
//!
//! The first failure aborts the run. Artifacts written before it stay on
//! disk; build into a staging root and swap if the whole build must be
//! atomic. Concurrent builds into one output root race on writes and must
//! be serialized by the caller.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::asset::{AssetRegistry, FileIndex, GlobEngine, TokenSource, add_buster, dedup_first};
use crate::error::{AssetError, Result};
use crate::logger::ProgressLine;
use crate::utils::plural::plural_count;
use crate::{debug, log};

use super::{ArtifactWriter, Renderer};

/// Counts from a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub packages: usize,
    pub files: usize,
    /// Artifacts written, busted copies included.
    pub written: usize,
}

/// Writes every package and served file under an output root.
#[derive(Debug)]
pub struct Builder<'a> {
    registry: &'a AssetRegistry,
    output: PathBuf,
    progress: bool,
}

/// One unit of work: a public URI and the sources its token derives from.
struct Job {
    uri: String,
    sources: Vec<PathBuf>,
}

impl<'a> Builder<'a> {
    pub fn new(registry: &'a AssetRegistry, output: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            output: output.into(),
            progress: false,
        }
    }

    /// Show a progress line on stdout while building.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Local output path for a public URI.
    pub fn output_path(&self, uri: &str) -> PathBuf {
        self.output.join(uri.trim_start_matches('/'))
    }

    /// Build all packages, then all unpackaged files.
    ///
    /// # Errors
    ///
    /// `BuildFailed` naming the first asset whose render, token or write
    /// failed; `InvalidArgument` if a package spec is not a valid glob.
    pub fn build(
        &self,
        sink: &dyn ArtifactWriter,
        renderer: &dyn Renderer,
        tokens: &dyn TokenSource,
    ) -> Result<BuildStats> {
        let index = GlobEngine::new(self.registry).all_files();
        let (packages, files) = self.plan(&index)?;

        let progress = self
            .progress
            .then(|| ProgressLine::new(&[("packages", packages.len()), ("files", files.len())]));

        let mut stats = BuildStats::default();
        for job in &packages {
            stats.written += self.emit(job, sink, renderer, tokens)?;
            stats.packages += 1;
            if let Some(p) = &progress {
                p.inc("packages");
            }
        }
        for job in &files {
            stats.written += self.emit(job, sink, renderer, tokens)?;
            stats.files += 1;
            if let Some(p) = &progress {
                p.inc("files");
            }
        }

        if let Some(p) = progress {
            p.finish();
        }
        log!(
            "build";
            "{}, {} -> {}",
            plural_count(stats.packages, "package"),
            plural_count(stats.files, "file"),
            self.output.display()
        );
        Ok(stats)
    }

    /// Split the work into package jobs and jobs for files no package owns.
    ///
    /// A served file whose URI equals a package path is skipped: the
    /// package output owns that path.
    fn plan(&self, index: &FileIndex) -> Result<(Vec<Job>, Vec<Job>)> {
        let mut owned = FxHashSet::default();
        let mut packages = Vec::with_capacity(self.registry.packages().len());

        for package in self.registry.packages() {
            let members = dedup_first(index.glob(&package.specs)?);
            owned.extend(members.iter().map(|f| f.uri.clone()));
            owned.insert(package.path());
            packages.push(Job {
                uri: package.path(),
                sources: members.into_iter().map(|f| f.source).collect(),
            });
        }

        let files = index
            .iter()
            .filter(|(uri, _)| {
                let skip = owned.contains(*uri);
                if skip {
                    debug!("build"; "{} belongs to a package", uri);
                }
                !skip
            })
            .map(|(uri, source)| Job {
                uri: uri.to_string(),
                sources: vec![source.to_path_buf()],
            })
            .collect();

        Ok((packages, files))
    }

    /// Render one job and write its canonical and busted copies.
    fn emit(
        &self,
        job: &Job,
        sink: &dyn ArtifactWriter,
        renderer: &dyn Renderer,
        tokens: &dyn TokenSource,
    ) -> Result<usize> {
        let fail = |e: AssetError| AssetError::build_failed(&job.uri, e);

        let bytes = renderer.render(&job.uri).map_err(|e| fail(e.into()))?;
        let token = tokens.token(&job.sources).map_err(|e| {
            let at = job.sources.first().cloned().unwrap_or_default();
            fail(AssetError::Io(at, e))
        })?;

        let mut targets = vec![self.output_path(&job.uri)];
        if let Some(token) = token {
            targets.push(self.output_path(&add_buster(&job.uri, &token)));
        }

        for target in &targets {
            sink.write(target, &bytes)
                .map_err(|e| fail(AssetError::Io(target.clone(), e)))?;
            debug!("build"; "{}", target.display());
        }
        Ok(targets.len())
    }
}
