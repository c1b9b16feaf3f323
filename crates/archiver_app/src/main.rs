mod logging;
mod menu;

use engine_logging::engine_error;

#[tokio::main]
async fn main() {
    logging::initialize();
    if let Err(err) = menu::run().await {
        engine_error!("run failed: {}", menu::describe_failure(err.as_ref()));
        std::process::exit(1);
    }
}
