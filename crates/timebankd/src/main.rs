//! timebankd - time budget accounting daemon
//!
//! Loads configuration, opens the store (seeding policy and persons on
//! first run), and runs the watchdog loop that expires sessions and
//! fires the screen lock. Shutdown settles any running session first.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use timebank_config::{load_config, Settings};
use timebank_core::{BudgetEngine, CoreEvent, StopDecision};
use timebank_host::{CommandLock, ScreenLock};
use timebank_store::{NewPerson, SqliteStore, Store};
use timebank_util::{now, CallerRole, MonotonicInstant};

const DB_FILE: &str = "timebankd.db";

#[derive(Parser, Debug)]
#[command(name = "timebankd", about = "Time budget accounting daemon", version)]
struct Args {
    /// Path to the TOML config file. Built-in defaults apply if omitted.
    #[arg(short, long, env = "TIMEBANKD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(long, env = "TIMEBANKD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

struct Service {
    engine: BudgetEngine,
    screen_lock: Option<Arc<dyn ScreenLock>>,
    tick_interval: Duration,
}

impl Service {
    fn new(settings: Settings) -> Result<Self> {
        std::fs::create_dir_all(&settings.service.data_dir).with_context(|| {
            format!("creating data dir {}", settings.service.data_dir.display())
        })?;

        let db_path = settings.service.data_dir.join(DB_FILE);
        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("opening store at {}", db_path.display()))?,
        );

        seed_store(store.as_ref(), &settings)?;

        let screen_lock: Option<Arc<dyn ScreenLock>> = settings
            .service
            .lock_command
            .as_deref()
            .and_then(CommandLock::from_command_line)
            .map(|lock| Arc::new(lock) as Arc<dyn ScreenLock>);
        if screen_lock.is_none() {
            warn!("no lock command configured; expiry will settle without locking");
        }

        let engine = BudgetEngine::load(Arc::clone(&store) as Arc<dyn Store>)?;
        info!(db = %db_path.display(), "service initialized");

        Ok(Self {
            engine,
            screen_lock,
            tick_interval: settings.service.tick_interval,
        })
    }

    async fn run(mut self) -> Result<()> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sighup = signal(SignalKind::hangup())?;

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("timebankd running");
        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                _ = sigterm.recv() => {
                    info!("received SIGTERM");
                    break;
                }
                _ = sigint.recv() => {
                    info!("received SIGINT");
                    break;
                }
                _ = sighup.recv() => {
                    info!("received SIGHUP; shutting down (restart to reload config)");
                    break;
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    fn on_tick(&mut self) {
        let now_mono = MonotonicInstant::now();

        if let Some(CoreEvent::ExpireDue { session_id, person_id }) = self.engine.tick(now_mono) {
            info!(%session_id, %person_id, "session countdown ran out");
        }

        // Settle any exhausted session. Retries on the next tick if the
        // store write fails.
        let status = self.engine.poll(now_mono);
        if status.active && status.remaining_seconds == 0 {
            match self.engine.expire_session(now(), now_mono) {
                Ok(StopDecision::Settled(result)) => {
                    info!(
                        session_id = %result.session_id,
                        elapsed = %result.elapsed_minutes,
                        "expired session settled"
                    );
                    self.fire_screen_lock();
                }
                Ok(StopDecision::Idle) => {}
                Err(err) => error!(error = %err, "failed to settle expired session"),
            }
        }
    }

    /// Fire-and-forget: settlement never waits on, or rolls back for,
    /// the lock.
    fn fire_screen_lock(&self) {
        let Some(lock) = self.screen_lock.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(err) = lock.lock().await {
                warn!(error = %err, "screen lock failed");
            }
        });
    }

    fn shutdown(&mut self) {
        match self.engine.stop_session(CallerRole::Admin, now(), MonotonicInstant::now()) {
            Ok(StopDecision::Settled(result)) => {
                info!(
                    session_id = %result.session_id,
                    elapsed = %result.elapsed_minutes,
                    "settled running session on shutdown"
                );
            }
            Ok(StopDecision::Idle) => {}
            Err(err) => error!(error = %err, "failed to settle session on shutdown"),
        }
        info!("timebankd stopped");
    }
}

/// First-run seeding: write the policy row if none exists, and create
/// the configured persons when the store is empty.
fn seed_store(store: &SqliteStore, settings: &Settings) -> Result<()> {
    if store.load_policy()?.is_none() {
        store.save_policy(&settings.policy_defaults)?;
        info!("seeded policy defaults");
    }

    if store.list_persons()?.is_empty() && !settings.seed_persons.is_empty() {
        let today = now().date_naive();
        for seed in &settings.seed_persons {
            let person = store.insert_person(NewPerson {
                name: seed.name.clone(),
                initial_minutes: seed.initial_minutes,
                created_on: today,
            })?;
            info!(person_id = %person.id, name = %person.name, "seeded person");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let mut settings = match &args.config {
        Some(path) => {
            load_config(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => Settings::default(),
    };
    if let Some(dir) = args.data_dir {
        settings.service.data_dir = dir;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "timebankd starting");

    let service = Service::new(settings)?;
    service.run().await
}
