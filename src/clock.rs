//! Injected time source.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

/// Clock handle shared by the service and the activity log.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Wall-clock time.
pub fn system_clock() -> SharedClock {
    Arc::new(DefaultClock)
}
