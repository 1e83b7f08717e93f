//! Pipeline execution implementation.

use super::CancellationToken;
use crate::core::grouper::{
    default_concurrency, DuplicateGrouper, DuplicateLedger, Group, ReadErrorPolicy,
};
use crate::core::hasher::{ContentHasher, Sha256Hasher};
use crate::core::metadata::CaptureDateResolver;
use crate::core::organize::{OperationMode, Organizer};
use crate::core::reporter::{Report, ReportEntry};
use crate::core::scanner::{MediaScanner, ScanConfig};
use crate::error::{OrganizerError, ValidationError};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder to scan
    pub source: PathBuf,
    /// Root of the organized tree; required for [`Pipeline::run`]
    pub target: Option<PathBuf>,
    /// Move or copy
    pub mode: OperationMode,
    /// Files hashed at once
    pub concurrency: usize,
    /// Scanner configuration
    pub scan_config: ScanConfig,
    /// What to do with files that cannot be read
    pub read_error_policy: ReadErrorPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: None,
            mode: OperationMode::default(),
            concurrency: default_concurrency(),
            scan_config: ScanConfig::default(),
            read_error_policy: ReadErrorPolicy::default(),
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    hasher: Option<Box<dyn ContentHasher>>,
    resolver: Option<CaptureDateResolver>,
    cancellation: Option<CancellationToken>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            hasher: None,
            resolver: None,
            cancellation: None,
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.source = source.into();
        self
    }

    pub fn target(mut self, target: impl Into<PathBuf>) -> Self {
        self.config.target = Some(target.into());
        self
    }

    pub fn mode(mut self, mode: OperationMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Maximum files hashed at once
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Replace the recognized extensions
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.scan_config.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.scan_config.follow_symlinks = follow;
        self
    }

    pub fn read_error_policy(mut self, policy: ReadErrorPolicy) -> Self {
        self.config.read_error_policy = policy;
        self
    }

    /// Use a different content hasher
    pub fn hasher(mut self, hasher: Box<dyn ContentHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Use a different capture date resolver
    pub fn date_resolver(mut self, resolver: CaptureDateResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            hasher: self.hasher.unwrap_or_else(|| Box::new(Sha256Hasher::new())),
            resolver: self.resolver.unwrap_or_default(),
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan and hash results, before anything is moved
#[derive(Debug, Default)]
pub struct Analysis {
    pub files_scanned: usize,
    /// Every group, duplicate or not, in creation order
    pub groups: Vec<Group>,
    pub ledger: DuplicateLedger,
    /// Scan and read problems
    pub errors: Vec<ReportEntry>,
    pub cancelled: bool,
}

impl Analysis {
    /// Groups with more than one member
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| g.has_duplicates())
    }
}

/// The scan, hash, organize pipeline.
///
/// Runs `Idle -> Scanning -> Hashing -> Organizing -> Done`. Inputs are
/// validated before anything happens; only the organizing phase writes.
pub struct Pipeline {
    config: PipelineConfig,
    hasher: Box<dyn ContentHasher>,
    resolver: CaptureDateResolver,
    cancellation: CancellationToken,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A handle that stops this pipeline at the next file boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<Report, OrganizerError> {
        self.run_with_events(&null_sender())
    }

    /// Scan, hash and organize, reporting progress on `events`
    pub fn run_with_events(&self, events: &EventSender) -> Result<Report, OrganizerError> {
        let start = Instant::now();
        let (scanner, target) = self.validate(true)?;
        let target = target.ok_or(ValidationError::TargetUnspecified)?;

        events.send(Event::Pipeline(PipelineEvent::Started {
            source: self.config.source.clone(),
            target: target.to_path_buf(),
        }));

        let analysis = self.scan_and_hash(&scanner, events)?;

        let mut report = Report::new(self.config.mode, target.to_path_buf());
        report.files_scanned = analysis.files_scanned;
        report.groups = analysis.groups.len();
        report.duplicate_count = analysis.ledger.count();
        report.reclaimed_bytes = analysis.ledger.reclaimed_bytes;
        report.duplicate_paths = analysis.ledger.paths;
        report.errors = analysis.errors;

        if analysis.cancelled {
            return Ok(self.finish_cancelled(report, PipelinePhase::Hashing, start, events));
        }

        self.change_phase(PipelinePhase::Organizing, events);
        let organized = Organizer::new(target, self.config.mode, &self.resolver)
            .cancellation(self.cancellation.clone())
            .organize(&analysis.groups, events);

        report.unique_count = organized.keepers_placed;
        report.duplicates_transferred = organized.duplicates_placed;
        report
            .errors
            .extend(organized.warnings.iter().map(ReportEntry::from));
        report
            .errors
            .extend(organized.failures.iter().map(ReportEntry::from));

        if organized.cancelled {
            return Ok(self.finish_cancelled(report, PipelinePhase::Organizing, start, events));
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        self.change_phase(PipelinePhase::Done, events);
        info!(
            unique = report.unique_count,
            duplicates = report.duplicate_count,
            errors = report.errors.len(),
            "run complete"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: report.pipeline_summary(),
        }));

        Ok(report)
    }

    /// Scan and hash only; nothing on disk changes
    pub fn analyze(&self) -> Result<Analysis, OrganizerError> {
        self.analyze_with_events(&null_sender())
    }

    pub fn analyze_with_events(&self, events: &EventSender) -> Result<Analysis, OrganizerError> {
        let (scanner, _) = self.validate(false)?;
        let analysis = self.scan_and_hash(&scanner, events)?;
        if analysis.cancelled {
            events.send(Event::Pipeline(PipelineEvent::Cancelled {
                phase: PipelinePhase::Hashing,
            }));
        } else {
            self.change_phase(PipelinePhase::Done, events);
        }
        Ok(analysis)
    }

    /// Check inputs before touching anything
    fn validate(&self, needs_target: bool) -> Result<(MediaScanner, Option<&Path>), ValidationError> {
        let source = &self.config.source;
        if source.as_os_str().is_empty() || !source.exists() {
            return Err(ValidationError::SourceMissing {
                path: source.clone(),
            });
        }
        if !source.is_dir() {
            return Err(ValidationError::SourceNotDirectory {
                path: source.clone(),
            });
        }

        let target = self
            .config
            .target
            .as_deref()
            .filter(|t| !t.as_os_str().is_empty());
        if needs_target && target.is_none() {
            return Err(ValidationError::TargetUnspecified);
        }

        if self.config.concurrency == 0 {
            return Err(ValidationError::InvalidConcurrency { value: 0 });
        }

        let scanner = MediaScanner::new(self.config.scan_config.clone());
        if scanner.filter().is_empty() {
            return Err(ValidationError::NoExtensions);
        }

        Ok((scanner, target))
    }

    fn scan_and_hash(
        &self,
        scanner: &MediaScanner,
        events: &EventSender,
    ) -> Result<Analysis, OrganizerError> {
        self.change_phase(PipelinePhase::Scanning, events);
        let scanned = scanner.scan_with_events(&self.config.source, events);
        let mut errors: Vec<ReportEntry> = scanned.errors.iter().map(ReportEntry::from).collect();
        let files_scanned = scanned.files.len();

        self.change_phase(PipelinePhase::Hashing, events);
        let grouping = DuplicateGrouper::new(self.hasher.as_ref())
            .concurrency(self.config.concurrency)
            .read_error_policy(self.config.read_error_policy)
            .cancellation(self.cancellation.clone())
            .group(&scanned.files, events);

        // Concurrency was validated, so only pool start-up can fail here
        let grouping = grouping.inspect_err(|e| error!("hashing could not start: {e}"))?;

        errors.extend(grouping.failures.iter().map(ReportEntry::from));
        info!(
            files = files_scanned,
            groups = grouping.groups.len(),
            duplicates = grouping.ledger.count(),
            "hashing complete"
        );

        Ok(Analysis {
            files_scanned,
            groups: grouping.groups,
            ledger: grouping.ledger,
            errors,
            cancelled: grouping.cancelled,
        })
    }

    fn change_phase(&self, phase: PipelinePhase, events: &EventSender) {
        info!("phase: {phase}");
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    fn finish_cancelled(
        &self,
        mut report: Report,
        phase: PipelinePhase,
        start: Instant,
        events: &EventSender,
    ) -> Report {
        info!("cancelled during {phase}");
        report.cancelled = true;
        report.duration_ms = start.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Cancelled { phase }));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn pipeline_builder_creates_pipeline() {
        let pipeline = Pipeline::builder()
            .source("/photos")
            .target("/organized")
            .mode(OperationMode::Copy)
            .concurrency(3)
            .extensions(["jpg", "PNG"])
            .build();

        assert_eq!(pipeline.config().concurrency, 3);
        assert_eq!(pipeline.config().mode, OperationMode::Copy);
        assert_eq!(
            pipeline.config().scan_config.extensions,
            Some(vec!["jpg".to_string(), "PNG".to_string()])
        );
    }

    #[test]
    fn missing_source_fails_before_anything_happens() {
        let target = TempDir::new().unwrap();
        let (sender, receiver) = EventChannel::new();

        let result = Pipeline::builder()
            .source("/definitely/not/here")
            .target(target.path())
            .build()
            .run_with_events(&sender);

        assert!(matches!(
            result,
            Err(OrganizerError::Validation(ValidationError::SourceMissing { .. }))
        ));
        assert!(receiver.drain().is_empty());
    }

    #[test]
    fn empty_target_is_rejected() {
        let source = TempDir::new().unwrap();
        let result = Pipeline::builder()
            .source(source.path())
            .target("")
            .build()
            .run();

        assert!(matches!(
            result,
            Err(OrganizerError::Validation(ValidationError::TargetUnspecified))
        ));
    }

    #[test]
    fn source_file_is_not_a_folder() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.jpg");
        fs::write(&file, b"x").unwrap();

        let result = Pipeline::builder().source(&file).target(temp.path()).build().run();
        assert!(matches!(
            result,
            Err(OrganizerError::Validation(ValidationError::SourceNotDirectory { .. }))
        ));
    }

    #[test]
    fn blank_extension_list_is_rejected() {
        let source = TempDir::new().unwrap();
        let result = Pipeline::builder()
            .source(source.path())
            .extensions([".", ""])
            .build()
            .analyze();

        assert!(matches!(
            result,
            Err(OrganizerError::Validation(ValidationError::NoExtensions))
        ));
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        let report = Pipeline::builder()
            .source(source.path())
            .target(target.path())
            .build()
            .run()
            .unwrap();

        assert_eq!(report.files_scanned, 0);
        assert_eq!(report.unique_count, 0);
        assert!(!report.cancelled);
    }

    #[test]
    fn phases_arrive_in_order() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(source.path().join("a.jpg"), b"a").unwrap();
        let (sender, receiver) = EventChannel::new();

        Pipeline::builder()
            .source(source.path())
            .target(target.path())
            .build()
            .run_with_events(&sender)
            .unwrap();

        let phases: Vec<PipelinePhase> = receiver
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                PipelinePhase::Scanning,
                PipelinePhase::Hashing,
                PipelinePhase::Organizing,
                PipelinePhase::Done
            ]
        );
    }
}
