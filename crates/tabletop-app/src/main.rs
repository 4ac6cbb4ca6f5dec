//! Main application entry point (native).

fn main() {
    env_logger::init();
    log::info!("Starting Tabletop");

    if let Err(e) = tabletop_app::run(tabletop_app::AppConfig::from_env()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
