//! One user's optimization requests against the solver.

use crate::error::{SessionError, SessionResult, SocketError};
use crate::socket::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use techforge_protocol::events::{
    OptimizationResult, OptimizeRequest, ProgressUpdate, OPTIMIZATION_RESULT, OPTIMIZE, PROGRESS,
};
use techforge_protocol::grid::Grid;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Where the session reads the current grid from and writes results to.
pub trait GridStore: Send {
    fn grid(&self) -> Grid;
    fn set_grid(&mut self, grid: Grid);
    fn set_result(&mut self, result: &OptimizationResult, tech: &str);
}

/// A [`GridStore`] that just keeps everything in memory.
#[derive(Debug, Clone)]
pub struct MemoryGridStore {
    pub grid: Grid,
    pub results: HashMap<String, OptimizationResult>,
    pub grid_updates: usize,
}

impl MemoryGridStore {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            results: HashMap::new(),
            grid_updates: 0,
        }
    }
}

impl GridStore for MemoryGridStore {
    fn grid(&self) -> Grid {
        self.grid.clone()
    }

    fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.grid_updates += 1;
    }

    fn set_result(&mut self, result: &OptimizationResult, tech: &str) {
        self.results.insert(tech.to_string(), result.clone());
    }
}

/// Which modules the user has enabled per tech, and which module group is
/// active for techs that have several.
#[derive(Debug, Clone, Default)]
pub struct ModuleSelection {
    pub checked_modules: HashMap<String, Vec<String>>,
    pub tech_groups: HashMap<String, Vec<String>>,
    pub active_groups: HashMap<String, String>,
}

impl ModuleSelection {
    pub fn available_modules(&self, tech: &str) -> Vec<String> {
        self.checked_modules.get(tech).cloned().unwrap_or_default()
    }

    /// Only sent for techs with more than one module group.
    pub fn solve_type(&self, tech: &str) -> Option<String> {
        let groups = self.tech_groups.get(tech)?;
        if groups.len() > 1 {
            self.active_groups.get(tech).cloned()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Connecting,
    Solving,
    Done,
    Errored,
}

/// Snapshot published to observers after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub progress_percent: f64,
    pub status: Option<String>,
    /// Tech whose last unforced solve came back "Pattern No Fit".
    pub pattern_no_fit_tech: Option<String>,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn is_solving(&self) -> bool {
        matches!(self.phase, Phase::Connecting | Phase::Solving)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The result went to the store.
    Applied(OptimizationResult),
    /// The pattern solver couldn't place the tech; a forced retry is on offer.
    PatternNoFit,
}

pub struct OptimizationSession<G: GridStore> {
    manager: Arc<ConnectionManager>,
    store: G,
    modules: ModuleSelection,
    ship: String,
    state: watch::Sender<SessionState>,
}

impl<G: GridStore> OptimizationSession<G> {
    pub fn new(manager: Arc<ConnectionManager>, store: G, ship: &str) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            manager,
            store,
            modules: ModuleSelection::default(),
            ship: ship.to_string(),
            state,
        }
    }

    pub fn with_modules(mut self, modules: ModuleSelection) -> Self {
        self.modules = modules;
        self
    }

    pub fn store(&self) -> &G {
        &self.store
    }

    pub fn into_store(self) -> G {
        self.store
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn pattern_no_fit_tech(&self) -> Option<String> {
        self.state.borrow().pattern_no_fit_tech.clone()
    }

    pub fn clear_pattern_no_fit_tech(&mut self) {
        self.state.send_if_modified(|s| s.pattern_no_fit_tech.take().is_some());
    }

    /// Re-runs the pending "Pattern No Fit" tech with `forced = true`.
    /// Returns `None` when nothing is pending.
    pub async fn force_pattern_no_fit(&mut self) -> SessionResult<Option<Outcome>> {
        match self.pattern_no_fit_tech() {
            Some(tech) => self.optimize(&tech, true).await.map(Some),
            None => Ok(None),
        }
    }

    fn build_request(&self, tech: &str, forced: bool) -> OptimizeRequest {
        OptimizeRequest {
            ship: self.ship.clone(),
            tech: tech.to_string(),
            available_modules: self.modules.available_modules(tech),
            grid: self.store.grid().without_tech(tech),
            forced,
            send_grid_updates: self.manager.config().send_grid_updates,
            solve_type: self.modules.solve_type(tech),
        }
    }

    /// Asks the solver to place `tech`.
    ///
    /// Cells currently holding `tech` are sent empty. Progress and best-so-far
    /// grids stream into the state and store until the result arrives.
    pub async fn optimize(&mut self, tech: &str, forced: bool) -> SessionResult<Outcome> {
        self.state.send_modify(|s| {
            s.phase = Phase::Connecting;
            s.progress_percent = 0.0;
            s.status = None;
            s.last_error = None;
            if forced || s.pattern_no_fit_tech.as_deref() == Some(tech) {
                s.pattern_no_fit_tech = None;
            }
        });
        info!(
            "🧩 Optimization started for {} (forced: {}, platform: {})",
            tech, forced, self.ship
        );

        let request = self.build_request(tech, forced);
        let payload = match serde_json::to_value(&request) {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(SocketError::from(e).into())),
        };

        if let Err(e) = self.manager.connect().await {
            return Err(self.fail(e.into()));
        }
        self.state.send_modify(|s| s.phase = Phase::Solving);

        let store = &mut self.store;
        let state = &self.state;
        let response = self
            .manager
            .request_streaming(
                OPTIMIZE,
                payload,
                OPTIMIZATION_RESULT,
                PROGRESS,
                self.manager.config().optimize_idle_timeout(),
                |data| match serde_json::from_value::<ProgressUpdate>(data) {
                    Ok(update) => {
                        let percent = update.progress_percent.clamp(0.0, 100.0);
                        state.send_modify(|s| {
                            s.progress_percent = s.progress_percent.max(percent);
                            if update.status.is_some() {
                                s.status = update.status.clone();
                            }
                        });
                        if let Some(best) = update.best_grid {
                            if best.is_well_formed() {
                                store.set_grid(best);
                            }
                        }
                    }
                    Err(e) => warn!("Ignoring malformed progress frame: {}", e),
                },
            )
            .await;

        let data = match response {
            Ok(data) => data,
            Err(e) => {
                error!("❌ Optimization failed for {}: {}", tech, e);
                return Err(self.fail(e.into()));
            }
        };

        let Some(result) = OptimizationResult::validate(&data) else {
            error!("❌ Optimization failed for {}: invalid response {}", tech, data);
            return Err(self.fail(SessionError::InvalidResponse));
        };

        if result.is_pattern_no_fit() && !forced {
            info!("🧱 \"Pattern No Fit\" for {}", tech);
            self.finish(Phase::Idle, |s| s.pattern_no_fit_tech = Some(tech.to_string()));
            return Ok(Outcome::PatternNoFit);
        }

        info!(
            "✅ Optimization complete for {} ({}, bonus {:?})",
            tech, result.solve_method, result.max_bonus
        );
        self.store.set_result(&result, tech);
        if let Some(grid) = &result.grid {
            self.store.set_grid(grid.clone());
        }
        self.finish(Phase::Done, |s| {
            if forced || s.pattern_no_fit_tech.as_deref() == Some(tech) {
                s.pattern_no_fit_tech = None;
            }
        });
        Ok(Outcome::Applied(result))
    }

    fn finish(&self, phase: Phase, update: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(|s| {
            s.phase = phase;
            s.progress_percent = 0.0;
            s.status = None;
            update(s);
        });
    }

    fn fail(&self, err: SessionError) -> SessionError {
        let message = err.to_string();
        self.finish(Phase::Errored, |s| s.last_error = Some(message));
        err
    }
}
