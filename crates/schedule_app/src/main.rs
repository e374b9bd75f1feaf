use schedule_app::app::{run, AppConfig};

fn main() {
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_env_or_default();
    if let Err(err) = run(config) {
        eprintln!("Failed to render schedule: {err:#}");
    }
}
