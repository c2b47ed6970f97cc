//! Shared pipeline helpers for CLI commands.
//!
//! Contains the project root lookup and the [`Session`] every command builds
//! on: configuration, declarations, the metadata engine with the shipped
//! providers, and a full build that brings every artifact up to date.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use weave_compose::{ArtifactWriter, Composer, DiskFileLayer, FileError, FileLayer};
use weave_config::{ProjectConfig, ResolvedProvider, CONFIG_FILE};
use weave_metadata::{EngineConfig, MetadataEngine};
use weave_source::{MemorySourceLayer, SourceLayer};

use crate::declarations::scan_source_root;
use crate::providers;
use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `weave.toml`.
///
/// Returns the directory containing `weave.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `weave.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Resolves the project root, loads `weave.toml`, and opens a [`Session`].
pub fn open_session(global: &GlobalArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = weave_config::load_config(&project_dir)?;
    Session::open(&project_dir, config)
}

/// A [`DiskFileLayer`] that remembers which artifacts a build touched.
#[derive(Debug, Default)]
pub struct TrackingFileLayer {
    disk: DiskFileLayer,
    written: RefCell<BTreeSet<PathBuf>>,
    deleted: RefCell<BTreeSet<PathBuf>>,
}

impl TrackingFileLayer {
    /// Artifacts whose content changed on disk.
    pub fn written(&self) -> Vec<PathBuf> {
        self.written.borrow().iter().cloned().collect()
    }

    /// Artifacts that were removed and not written again.
    pub fn deleted(&self) -> Vec<PathBuf> {
        self.deleted.borrow().iter().cloned().collect()
    }
}

impl FileLayer for TrackingFileLayer {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, FileError> {
        self.disk.read(path)
    }

    fn write_if_different(&self, path: &Path, bytes: &[u8]) -> Result<bool, FileError> {
        let wrote = self.disk.write_if_different(path, bytes)?;
        if wrote {
            self.deleted.borrow_mut().remove(path);
            self.written.borrow_mut().insert(path.to_path_buf());
        }
        Ok(wrote)
    }

    fn delete(&self, path: &Path) -> Result<bool, FileError> {
        let deleted = self.disk.delete(path)?;
        if deleted {
            self.written.borrow_mut().remove(path);
            self.deleted.borrow_mut().insert(path.to_path_buf());
        }
        Ok(deleted)
    }

    fn exists(&self, path: &Path) -> bool {
        self.disk.exists(path)
    }
}

/// What a build did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Governors announced to the engine.
    pub governors: usize,
    /// Items that ended up valid.
    pub valid: usize,
    /// Items that ended up invalid.
    pub invalid: usize,
    /// Artifacts written.
    pub written: Vec<PathBuf>,
    /// Artifacts present and already up to date.
    pub unchanged: usize,
    /// Artifacts deleted.
    pub deleted: Vec<PathBuf>,
}

/// A loaded project with a live metadata engine.
pub struct Session {
    root: PathBuf,
    config: ProjectConfig,
    engine: MetadataEngine,
    source: Rc<MemorySourceLayer>,
    files: Rc<TrackingFileLayer>,
    writer: ArtifactWriter,
    providers: Vec<ResolvedProvider>,
}

impl Session {
    /// Loads declarations under `root` and registers the enabled providers.
    pub fn open(root: &Path, config: ProjectConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let resolved = weave_config::resolve_providers(&config, providers::KNOWN)?;
        let engine = MetadataEngine::new(EngineConfig {
            max_notify_depth: config.engine.max_notify_depth,
        });

        let source = Rc::new(MemorySourceLayer::new());
        for source_root in &config.project.source_roots {
            for governor in scan_source_root(root, source_root)? {
                source.insert(governor);
            }
        }
        tracing::debug!(governors = source.len(), "loaded declarations");

        let files = Rc::new(TrackingFileLayer::default());
        let writer = ArtifactWriter::new(files.clone(), config.artifacts.extension.clone());
        let composer = Composer::new(config.artifacts.implicit_packages.clone());
        let source_layer: Rc<dyn SourceLayer> = source.clone();
        providers::install(&engine, source_layer, &writer, &composer, &resolved)?;

        Ok(Self {
            root: root.to_path_buf(),
            config,
            engine,
            source,
            files,
            writer,
            providers: resolved,
        })
    }

    /// The project configuration.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The metadata engine.
    pub fn engine(&self) -> &MetadataEngine {
        &self.engine
    }

    /// Announces every governor, then removes artifacts no governor accounts for.
    pub fn build(&self) -> Result<BuildReport, Box<dyn std::error::Error>> {
        let governors = self.source.governors();
        for governor in &governors {
            weave_provider::notify_governor_changed(
                &self.engine,
                &governor.path,
                &governor.qualified_name,
            )?;
        }
        self.sweep_orphans()?;

        let mut report = BuildReport {
            governors: governors.len(),
            written: self.files.written(),
            deleted: self.files.deleted(),
            ..BuildReport::default()
        };
        for mid in self.engine.cached_ids() {
            let Some(item) = self.engine.peek(&mid) else {
                continue;
            };
            if item.is_valid() {
                report.valid += 1;
            } else {
                report.invalid += 1;
            }
            if let Some(path) = item.artifact() {
                if !report.written.iter().any(|w| w == path) {
                    report.unchanged += 1;
                }
            }
        }
        Ok(report)
    }

    /// Deletes provider artifacts that no loaded governor accounts for.
    ///
    /// A file is a provider artifact when its name ends in `_<suffix>.<ext>`
    /// for a known provider. It is kept only if some governor's artifact for
    /// an enabled provider lives at exactly that path.
    fn sweep_orphans(&self) -> Result<(), Box<dyn std::error::Error>> {
        let ext = &self.config.artifacts.extension;
        let expected = self.expected_artifacts();
        for source_root in &self.config.project.source_roots {
            let base = self.root.join(source_root);
            if !base.is_dir() {
                continue;
            }
            let mut candidates = Vec::new();
            collect_with_extension(&base, ext, &mut candidates)?;
            for path in candidates {
                if expected.contains(&path) {
                    continue;
                }
                if let Some(reason) = self.orphan_reason(&path, ext) {
                    tracing::debug!(path = %path.display(), reason, "removing orphaned artifact");
                    self.files.delete(&path)?;
                }
            }
        }
        Ok(())
    }

    /// Artifact paths of every loaded governor under every enabled provider.
    fn expected_artifacts(&self) -> HashSet<PathBuf> {
        let governors = self.source.governors();
        self.providers
            .iter()
            .filter(|p| p.enabled)
            .flat_map(|p| {
                governors
                    .iter()
                    .map(move |g| self.writer.artifact_path(g, &p.suffix))
            })
            .collect()
    }

    /// Why an unexpected file is an orphan, or `None` if no provider claims it.
    fn orphan_reason(&self, path: &Path, ext: &str) -> Option<&'static str> {
        let file_name = path.file_name()?.to_str()?;
        let owner = self
            .providers
            .iter()
            .find(|p| file_name.ends_with(&format!("_{}.{ext}", p.suffix)))?;
        if owner.enabled {
            Some("no governor")
        } else {
            Some("provider disabled")
        }
    }
}

fn collect_with_extension(
    dir: &Path,
    ext: &str,
    out: &mut Vec<PathBuf>,
) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_with_extension(&path, ext, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(path);
        }
    }
    Ok(())
}
