use std::time::Duration;

use anyhow::Result;
use timebox::{cli::run_cli, utils::runtime::single_thread_runtime};
use tracing::error;

/// Reading stdin can't be cancelled, so the runtime is not allowed to wait for it on exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(run_cli()).inspect_err(|e| {
        error!("Error running cli {e:?}");
    });
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    result
}
