//! Pipeline controller and the observable analysis state
//!
//! The analysis runs as one cooperative task, advancing through fixed
//! stages; each stage consumes the previous stage's full output, so there
//! is no internal fan-out. Every state transition publishes atomically
//! through a watch channel: readers always see a consistent variant.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use arbor_core::{AnalysisError, Artifact, ArtifactId, ArtifactTree, Result, Size};

use crate::builder;
use crate::input::{CodeFolder, CodeSymbolData, ProjectLocation};
use crate::layout::{self, LayoutStyle};
use crate::lifter;
use crate::metrics;
use crate::provider::SymbolProvider;
use crate::reader;
use crate::sorter;

/// Consecutive provider failures tolerated before it is marked not
/// working and the pipeline stops asking.
const MAX_PROVIDER_FAILURES: u32 = 3;

/// Enumerated pipeline steps, published inside the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStep {
    ReadFolder,
    ConnectProvider,
    RetrieveSymbols,
    RetrieveReferences,
    BuildArchitecture,
    LiftCrossScope,
    ComputeMetrics,
    Sort,
    Layout,
    BuildViewModels,
}

/// Observable pipeline state.
#[derive(Debug, Clone)]
pub enum AnalysisState {
    Located,
    RetrievingData(AnalysisStep),
    DataReady,
    Analyzing(AnalysisStep),
    Ready(Arc<ArchitectureSnapshot>),
    Failed(String),
}

impl AnalysisState {
    pub fn is_ready(&self) -> bool {
        matches!(self, AnalysisState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AnalysisState::Failed(_))
    }
}

/// The finished architecture: sorted, laid out, metric-annotated, and
/// read-only from here on.
#[derive(Debug)]
pub struct ArchitectureSnapshot {
    pub tree: ArtifactTree,
    pub root: ArtifactId,
}

/// Predicate selecting which artifacts the layout shows.
pub type ArtifactFilter = Arc<dyn Fn(&Artifact) -> bool + Send + Sync>;

/// How the final treemap is produced.
#[derive(Clone)]
pub struct AnalysisConfig {
    pub root_size: Size,
    pub style: LayoutStyle,
    /// `None` shows every artifact.
    pub filter: Option<ArtifactFilter>,
}

impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("root_size", &self.root_size)
            .field("style", &self.style)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            root_size: Size::new(1280.0, 800.0),
            style: LayoutStyle::default(),
            filter: None,
        }
    }
}

/// Handle for cancelling a running analysis from another task.
#[derive(Clone)]
pub struct Canceller {
    flag: Arc<AtomicBool>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Tracks whether the shared provider is still worth asking.
struct ProviderHealth {
    consecutive_failures: u32,
    working: bool,
}

impl ProviderHealth {
    fn new() -> Self {
        ProviderHealth {
            consecutive_failures: 0,
            working: true,
        }
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn note_success(&mut self) {
        self.consecutive_failures = 0;
    }

    fn note_failure(&mut self, step: AnalysisStep, cause: &AnalysisError) {
        warn!(stage = ?step, cause = %cause, "symbol provider request failed");
        self.consecutive_failures += 1;
        if self.consecutive_failures >= MAX_PROVIDER_FAILURES {
            self.working = false;
            warn!(stage = ?step, "symbol provider marked not working; continuing with partial data");
        }
    }
}

/// Owns the state machine and sequences the pipeline stages.
pub struct AnalysisController {
    location: ProjectLocation,
    provider: Arc<dyn SymbolProvider>,
    config: AnalysisConfig,
    state_tx: watch::Sender<AnalysisState>,
    // Held so publishing never observes a closed channel.
    state_rx: watch::Receiver<AnalysisState>,
    cancelled: Arc<AtomicBool>,
}

impl AnalysisController {
    pub fn new(location: ProjectLocation, provider: Arc<dyn SymbolProvider>) -> Self {
        let (state_tx, state_rx) = watch::channel(AnalysisState::Located);
        AnalysisController {
            location,
            provider,
            config: AnalysisConfig::default(),
            state_tx,
            state_rx,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// A receiver observing every published state transition.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state_rx.clone()
    }

    /// The current state, read tear-free.
    pub fn state(&self) -> AnalysisState {
        self.state_rx.borrow().clone()
    }

    pub fn canceller(&self) -> Canceller {
        Canceller {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// Drive the pipeline to `Ready` or `Failed`.
    pub async fn run(&self) -> Result<Arc<ArchitectureSnapshot>> {
        match self.run_pipeline().await {
            Ok(snapshot) => {
                info!(artifacts = snapshot.tree.len(), "analysis ready");
                self.publish(AnalysisState::Ready(Arc::clone(&snapshot)));
                Ok(snapshot)
            }
            Err(err) => {
                warn!(cause = %err, "analysis failed");
                self.publish(AnalysisState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn run_pipeline(&self) -> Result<Arc<ArchitectureSnapshot>> {
        self.checkpoint()?;
        self.publish(AnalysisState::RetrievingData(AnalysisStep::ReadFolder));
        let mut folder = reader::read_project(&self.location)?;

        self.checkpoint()?;
        self.publish(AnalysisState::RetrievingData(AnalysisStep::ConnectProvider));
        let mut health = ProviderHealth::new();
        if let Err(err) = self.provider.connect().await {
            health.note_failure(AnalysisStep::ConnectProvider, &err);
        }

        self.checkpoint()?;
        self.publish(AnalysisState::RetrievingData(AnalysisStep::RetrieveSymbols));
        self.retrieve_symbols(&mut folder, &mut health).await?;

        self.checkpoint()?;
        self.publish(AnalysisState::RetrievingData(
            AnalysisStep::RetrieveReferences,
        ));
        self.retrieve_references(&mut folder, &mut health).await?;

        self.publish(AnalysisState::DataReady);
        tokio::task::yield_now().await;

        self.checkpoint()?;
        self.publish(AnalysisState::Analyzing(AnalysisStep::BuildArchitecture));
        let builder::BuildOutput {
            mut tree,
            index,
            references,
        } = builder::build_architecture(&folder)?;

        self.checkpoint()?;
        self.publish(AnalysisState::Analyzing(AnalysisStep::LiftCrossScope));
        lifter::lift_cross_scope(&mut tree, &index, &references)?;
        // The side tables have served their purpose.
        drop(index);
        drop(references);

        self.checkpoint()?;
        self.publish(AnalysisState::Analyzing(AnalysisStep::ComputeMetrics));
        metrics::compute_lines_of_code(&mut tree);
        metrics::prune_and_rank(&mut tree)?;

        self.checkpoint()?;
        self.publish(AnalysisState::Analyzing(AnalysisStep::Sort));
        sorter::sort_children(&mut tree);

        self.checkpoint()?;
        self.publish(AnalysisState::Analyzing(AnalysisStep::Layout));
        match &self.config.filter {
            Some(filter) => layout::layout_tree(
                &mut tree,
                self.config.root_size,
                filter.as_ref(),
                &self.config.style,
            ),
            None => {
                layout::layout_tree(&mut tree, self.config.root_size, &|_| true, &self.config.style)
            }
        }

        self.checkpoint()?;
        self.publish(AnalysisState::Analyzing(AnalysisStep::BuildViewModels));
        let root = tree.root();
        Ok(Arc::new(ArchitectureSnapshot { tree, root }))
    }

    async fn retrieve_symbols(
        &self,
        folder: &mut CodeFolder,
        health: &mut ProviderHealth,
    ) -> Result<()> {
        let mut stack: Vec<&mut CodeFolder> = vec![folder];
        while let Some(current) = stack.pop() {
            for file in &mut current.files {
                self.checkpoint()?;
                if !health.is_working() {
                    return Ok(());
                }
                match self.provider.symbols(&file.path, &file.lines).await {
                    Ok(symbols) => {
                        health.note_success();
                        debug!(file = %file.path.display(), count = symbols.len(), "symbols retrieved");
                        file.symbols = symbols;
                    }
                    Err(err) => health.note_failure(AnalysisStep::RetrieveSymbols, &err),
                }
            }
            for sub in &mut current.subfolders {
                stack.push(sub);
            }
        }
        Ok(())
    }

    async fn retrieve_references(
        &self,
        folder: &mut CodeFolder,
        health: &mut ProviderHealth,
    ) -> Result<()> {
        let mut folders: Vec<&mut CodeFolder> = vec![folder];
        while let Some(current) = folders.pop() {
            for file in &mut current.files {
                let path = file.path.clone();
                let mut symbols: Vec<&mut CodeSymbolData> = file.symbols.iter_mut().collect();
                while let Some(symbol) = symbols.pop() {
                    self.checkpoint()?;
                    if !health.is_working() {
                        return Ok(());
                    }
                    match self.provider.references(&path, symbol).await {
                        Ok(references) => {
                            health.note_success();
                            symbol.references = Some(references);
                        }
                        Err(err) => health.note_failure(AnalysisStep::RetrieveReferences, &err),
                    }
                    for child in &mut symbol.children {
                        symbols.push(child);
                    }
                }
            }
            for sub in &mut current.subfolders {
                folders.push(sub);
            }
        }
        Ok(())
    }

    fn publish(&self, state: AnalysisState) {
        debug!(state = ?state_label(&state), "pipeline state");
        let _ = self.state_tx.send(state);
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }
}

fn state_label(state: &AnalysisState) -> &'static str {
    match state {
        AnalysisState::Located => "located",
        AnalysisState::RetrievingData(_) => "retrieving",
        AnalysisState::DataReady => "data-ready",
        AnalysisState::Analyzing(_) => "analyzing",
        AnalysisState::Ready(_) => "ready",
        AnalysisState::Failed(_) => "failed",
    }
}
