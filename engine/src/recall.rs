use store::StoreError;
use tracing::{debug, warn};

/// Missing state means a first run; unusable state is logged and treated
/// the same way, trading one cycle of accuracy for availability.
pub(crate) fn or_default<T: Default>(loaded: Result<Option<T>, StoreError>, what: &str) -> T {
    match loaded {
        Ok(Some(state)) => state,
        Ok(None) => {
            debug!(state = what, "no prior state; starting fresh");
            T::default()
        }
        Err(e) => {
            warn!(state = what, error = %e, "persisted state unusable; starting fresh");
            T::default()
        }
    }
}
