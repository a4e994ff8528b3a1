//! Logging infrastructure for heapstore

use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the heapstore logging system
///
/// Call once at the start of the embedding application. Heapstore records are
/// shown at `Info` and above unless `RUST_LOG` says otherwise.
pub fn init() {
    INIT.call_once(|| {
        let mut logger = builder(LevelFilter::Info);
        logger.parse_default_env();
        install(&mut logger);
    });
}

/// Initialize logging with heapstore records shown at `level` and above
///
/// `RUST_LOG` is ignored so the level is exactly the one asked for.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| install(&mut builder(level)));
}

/// Initialize logging for test binaries, where output goes through the test
/// harness capture
pub fn init_for_tests(level: LevelFilter) {
    INIT.call_once(|| {
        let mut logger = builder(level);
        logger.is_test(true);
        install(&mut logger);
    });
}

/// Whether heapstore records at `level` currently reach a logger
pub fn enabled(level: log::Level) -> bool {
    log::log_enabled!(target: "heapstore", level)
}

fn builder(level: LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("heapstore", level)
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.6f"),
                record.level(),
                record.module_path().unwrap_or_else(|| record.target()),
                record.args()
            )
        });
    builder
}

// Another logger may already be installed by the embedding application
fn install(builder: &mut env_logger::Builder) {
    if builder.try_init().is_ok() {
        log::debug!(target: "heapstore", "logging ready, heapstore level {}", log::max_level());
    }
}

/// Log an error message under the heapstore target
#[macro_export]
macro_rules! heapstore_error {
    ($($arg:tt)*) => {
        $crate::__log::error!(target: "heapstore", $($arg)*)
    };
}

/// Log a warning message under the heapstore target
#[macro_export]
macro_rules! heapstore_warn {
    ($($arg:tt)*) => {
        $crate::__log::warn!(target: "heapstore", $($arg)*)
    };
}

/// Log an info message under the heapstore target
#[macro_export]
macro_rules! heapstore_info {
    ($($arg:tt)*) => {
        $crate::__log::info!(target: "heapstore", $($arg)*)
    };
}

/// Log a debug message under the heapstore target
#[macro_export]
macro_rules! heapstore_debug {
    ($($arg:tt)*) => {
        $crate::__log::debug!(target: "heapstore", $($arg)*)
    };
}

/// Log a trace message under the heapstore target
#[macro_export]
macro_rules! heapstore_trace {
    ($($arg:tt)*) => {
        $crate::__log::trace!(target: "heapstore", $($arg)*)
    };
}

/// Operations slower than this are reported at `warn` when their timer drops
const SLOW_OPERATION: std::time::Duration = std::time::Duration::from_millis(10);

/// Performance timing helper
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        heapstore_trace!("Starting operation: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Get elapsed time without stopping the timer
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Stop the timer and log the elapsed time
    pub fn stop(self) -> std::time::Duration {
        let elapsed = self.start.elapsed();
        heapstore_debug!("Operation '{}' completed in {:?}", self.operation, elapsed);
        elapsed
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if elapsed > SLOW_OPERATION {
            heapstore_warn!("Slow operation '{}' took {:?}", self.operation, elapsed);
        }
    }
}
