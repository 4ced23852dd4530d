use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize env_logger for binaries and tests embedding this crate.
/// Reads RUST_LOG, defaulting to info. Safe to call more than once.
pub fn init_logging() {
    INIT.call_once(|| {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    });
}
