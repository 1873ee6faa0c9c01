use std::process::ExitCode;

use tileworld::run_app;
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.scene) {
        error!(error = %err, "game_loop_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
