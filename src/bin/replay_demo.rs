//! CLI: run a small three-step workflow under record/replay.
//!
//! The first run executes every step and writes the state file. Later runs
//! replay each step from its checkpoint, restoring the shared store, so the
//! randomly chosen processing status stays the same across runs. Pass
//! `--rerun <NODE>` to execute a step again and append a fresh checkpoint.
//!
//! Usage: `replay_demo [OPTIONS]`
//! Example: replay_demo --rerun demo::process_data
//!
//! Set RUST_LOG=streamweave_replay=debug to see record/replay decisions.

use clap::Parser;
use rand::Rng;
use serde_json::{Value, json};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use streamweave_replay::config::ENV_REPLAY_MODE;
use streamweave_replay::{NodeId, Recordable, ReplayMode, SharedStore, StateManager};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

const DEFAULT_STATE_FILE: &str = ".streamweave/replay_state.json";
const ENV_STATE_FILE: &str = "STREAMWEAVE_REPLAY_FILE";
const SCOPE: &str = "demo";

/// Run the demo workflow with checkpoint record/replay.
#[derive(Parser, Debug)]
#[command(name = "replay_demo")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  STREAMWEAVE_REPLAY_FILE   Path of the JSON state file.
  STREAMWEAVE_REPLAY_MODE   replay | record | off

Examples:
  replay_demo
  replay_demo --rerun demo::process_data
  replay_demo --mode record --state-file /tmp/replay.json"#
)]
struct Args {
  /// JSON state file loaded before and written after the run.
  #[arg(long, value_name = "PATH", default_value = DEFAULT_STATE_FILE)]
  state_file: PathBuf,

  /// replay, record or off.
  #[arg(long, value_name = "MODE", default_value = "replay")]
  mode: ReplayMode,

  /// Node id to execute again even if it has a checkpoint. Repeatable.
  #[arg(long = "rerun", value_name = "NODE")]
  rerun: Vec<String>,

  /// Ignore an existing state file.
  #[arg(long)]
  fresh: bool,

  /// User id passed to the first step.
  #[arg(long, default_value_t = 42)]
  user_id: u64,
}

fn fetch_user(user_id: u64) -> Result<Value, String> {
  info!(user_id, "fetching user");
  std::thread::sleep(Duration::from_millis(100));
  Ok(json!({"id": user_id, "name": "Jane Doe", "email": "jane.doe@example.com"}))
}

fn process_data((store, user): (SharedStore, Value)) -> Result<String, String> {
  info!("processing user data");
  let status = if rand::thread_rng().gen_bool(0.5) {
    "processed_with_error"
  } else {
    "processed_successfully"
  };
  store.insert("user", user);
  store.insert("status", status);
  Ok(status.to_string())
}

fn finalize(store: SharedStore) -> Result<Value, String> {
  info!("finalizing");
  let status = store
    .get("status")
    .ok_or_else(|| "no status in shared store".to_string())?;
  store.insert("finalized", true);
  Ok(json!({"final_status": status, "message": "Workflow complete."}))
}

fn run(args: &Args, mode: ReplayMode, state_file: &Path) -> Result<Value, String> {
  let manager = Arc::new(StateManager::new().with_mode(mode));
  if state_file.exists() && !args.fresh {
    manager
      .load_from_file(state_file)
      .map_err(|e| format!("loading {}: {}", state_file.display(), e))?;
    info!(checkpoints = manager.checkpoint_count(), "state loaded");
  }
  for node in &args.rerun {
    manager.mark_for_rerun(&NodeId::new(node.as_str()));
  }

  let fetch = Recordable::new(
    Arc::clone(&manager),
    NodeId::qualified(SCOPE, "fetch_user"),
    fetch_user,
  );
  let process = Recordable::new(
    Arc::clone(&manager),
    NodeId::qualified(SCOPE, "process_data"),
    process_data,
  )
  .with_shared_state(|(store, _): &(SharedStore, Value)| Some(store.clone()));
  let finish = Recordable::new(
    Arc::clone(&manager),
    NodeId::qualified(SCOPE, "finalize"),
    finalize,
  )
  .with_shared_state(|store: &SharedStore| Some(store.clone()));

  let store = SharedStore::new();
  let user = fetch.invoke(args.user_id)?;
  println!("  {:<20} {}", fetch.node_id(), user.status);
  let processed = process.invoke((store.clone(), user.output))?;
  println!("  {:<20} {} ({})", process.node_id(), processed.status, processed.output);
  let result = finish.invoke(store.clone())?;
  println!("  {:<20} {}", finish.node_id(), result.status);

  println!("Timeline:");
  for entry in manager.timeline() {
    println!(
      "  {:.3} {:<20} #{} {} cpu={:.6}s",
      entry.checkpoint.timestamp,
      entry.node_id,
      entry.attempt,
      entry.checkpoint.status,
      entry.checkpoint.execution_time
    );
  }

  if mode.records() {
    manager
      .persist_to_file(state_file)
      .map_err(|e| format!("writing {}: {}", state_file.display(), e))?;
    info!(path = %state_file.display(), checkpoints = manager.checkpoint_count(), "state written");
  }
  Ok(result.output)
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Env vars override flags.
  let state_file = env::var(ENV_STATE_FILE)
    .ok()
    .map(PathBuf::from)
    .unwrap_or_else(|| args.state_file.clone());
  let mode = match env::var(ENV_REPLAY_MODE) {
    Ok(raw) => match raw.parse::<ReplayMode>() {
      Ok(m) => m,
      Err(e) => {
        eprintln!("Error: {}", e);
        process::exit(2);
      }
    },
    Err(_) => args.mode,
  };
  info!(mode = %mode, state_file = %state_file.display(), "options (env or flags)");

  println!("Running workflow:");
  match run(&args, mode, &state_file) {
    Ok(result) => {
      println!("Result: {}", result);
    }
    Err(e) => {
      eprintln!("Workflow error: {}", e);
      process::exit(1);
    }
  }
}
