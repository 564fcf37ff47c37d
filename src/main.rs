use std::sync::Arc;

use sessiongate::config::{load_config, print_schema};
use sessiongate::startup;
use sessiongate::utils::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    if std::env::args().skip(1).any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = load_config();
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initializing logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(Arc::new(config)).await {
        error!(
            event_name = "proxy.stopped",
            event_domain = "proxy",
            error = %e,
            "proxy exited with an error"
        );
        std::process::exit(1);
    }
}
