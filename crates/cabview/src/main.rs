mod app;

use tracing::error;

fn main() {
    let wiring = match app::build_app() {
        Ok(wiring) => wiring,
        Err(err) => {
            error!(error = %err, "startup_failed");
            std::process::exit(1);
        }
    };

    if let Err(err) = railcab::run_app(wiring.config, wiring.session, wiring.route) {
        error!(error = %err, "host_failed");
        std::process::exit(1);
    }
}
