/// Builds a `serde_json::Map` of hint fields for reference stubs.
#[doc(hidden)]
#[macro_export]
macro_rules! hints {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut map = $crate::serde_json::Map::new();
        $(map.insert($key.into(), $crate::serde_json::json!($value));)*
        map
    });
}

/// Evaluates the block and logs how long it took at `info` level.
#[doc(hidden)]
#[macro_export]
macro_rules! timed {
    ($stage:expr, $($token:tt)*) => ({
        let start = std::time::Instant::now();
        let value = { $($token)* };
        $crate::tracing::info!(stage = $stage, elapsed_ms = start.elapsed().as_millis() as u64, "stage finished");
        value
    });
}

pub use crate::{hints, timed};
