use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Installs the global `fmt` subscriber once. Later calls, or calls made after
/// someone else installed a subscriber, do nothing.
pub fn init_logging(level: Level) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    });
}
