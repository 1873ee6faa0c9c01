mod app;

use std::env;
use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let requested_level = env::args().nth(1);
    let app = match app::build_app(requested_level.as_deref()) {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    app::run(app)
}
