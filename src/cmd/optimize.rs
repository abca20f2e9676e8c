use super::read_grid;
use crate::reports;
use clap::Args;
use std::path::PathBuf;
use techforge::error::CliResult;
use techforge_client::{
    ClientConfig, ConnectionManager, MemoryGridStore, ModuleSelection, OptimizationSession, Outcome,
};
use techforge_core::platform::DEFAULT_SHIP_TYPE;
use techforge_core::util::atomic_write;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// Grid JSON file to start from
    #[arg(short, long)]
    pub grid: PathBuf,

    /// Technology to place
    #[arg(short, long)]
    pub tech: String,

    #[arg(short, long, default_value = DEFAULT_SHIP_TYPE)]
    pub ship: String,

    /// Modules the solver may use, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub modules: Vec<String>,

    /// Module groups of the tech, comma separated
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Active module group
    #[arg(long)]
    pub solve_type: Option<String>,

    /// Skip the pattern solver and run the full search
    #[arg(long, default_value_t = false)]
    pub forced: bool,

    /// Rerun with --forced when the pattern solver can't fit the tech
    #[arg(long, default_value_t = false)]
    pub auto_force: bool,

    /// Write the resulting grid JSON here instead of printing it
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

fn module_selection(args: &OptimizeArgs) -> ModuleSelection {
    let mut modules = ModuleSelection::default();
    modules
        .checked_modules
        .insert(args.tech.clone(), args.modules.clone());
    modules
        .tech_groups
        .insert(args.tech.clone(), args.groups.clone());
    if let Some(group) = &args.solve_type {
        modules.active_groups.insert(args.tech.clone(), group.clone());
    }
    modules
}

pub async fn run(args: OptimizeArgs, config: &ClientConfig) -> CliResult<()> {
    let grid = read_grid(&args.grid)?;

    let manager = ConnectionManager::global(config);
    let mut session =
        OptimizationSession::new(manager.clone(), MemoryGridStore::new(grid), &args.ship)
            .with_modules(module_selection(&args));

    let mut state = session.subscribe();
    let progress = tokio::spawn(async move {
        let mut shown = 0.0;
        while state.changed().await.is_ok() {
            let s = state.borrow_and_update().clone();
            if s.is_solving() && s.progress_percent >= shown + 10.0 {
                shown = s.progress_percent;
                info!("📈 {:.0}% {}", s.progress_percent, s.status.unwrap_or_default());
            }
        }
    });

    let mut outcome = session.optimize(&args.tech, args.forced).await;
    if matches!(outcome, Ok(Outcome::PatternNoFit)) {
        if args.auto_force {
            warn!("🧱 Pattern solver couldn't fit '{}', forcing a full search", args.tech);
            if let Some(forced) = session.force_pattern_no_fit().await.transpose() {
                outcome = forced;
            }
        } else {
            warn!(
                "🧱 Pattern solver couldn't fit '{}'. Rerun with --forced or --auto-force.",
                args.tech
            );
        }
    }

    manager.disconnect().await;
    let store = session.into_store();
    progress.abort();

    if let Outcome::Applied(result) = outcome? {
        reports::print_result(&args.tech, &result);
        match &args.out {
            Some(path) => {
                atomic_write(path, serde_json::to_string_pretty(&store.grid)?)?;
                info!("💾 Wrote grid to {:?}", path);
            }
            None => reports::print_grid(&store.grid),
        }
    }
    Ok(())
}
