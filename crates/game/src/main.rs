mod app;

use std::process::ExitCode;

use tracing::{error, info};

use app::{bootstrap, loop_runner};

fn main() -> ExitCode {
    bootstrap::init_tracing();
    info!("=== TileJump Startup ===");

    match bootstrap::build_app() {
        Ok(wiring) => loop_runner::run(wiring),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
