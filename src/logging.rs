//! Logging setup
//!
//! Installs a `tracing` fmt subscriber once per process. Output goes to the
//! configured log file (append mode, no ANSI colors) or to stderr.
//! `RUST_LOG` takes precedence over the configured level.

use crate::cli::config::LoggingConfig;
use crate::errors::{IncidentError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the level filter from `RUST_LOG` or the configured level
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(&config.level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match config.log_file() {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| IncidentError::ConfigError(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts WARN and ERROR events seen on the current thread
    #[derive(Clone, Default)]
    pub(crate) struct LevelCounter {
        warnings: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
    }

    impl LevelCounter {
        /// Install as the thread-local default; events are counted while the guard lives
        pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
            let subscriber = tracing_subscriber::registry().with(self.clone());
            tracing::subscriber::set_default(subscriber)
        }

        pub(crate) fn warnings(&self) -> usize {
            self.warnings.load(Ordering::SeqCst)
        }

        pub(crate) fn errors(&self) -> usize {
            self.errors.load(Ordering::SeqCst)
        }
    }

    impl<S: Subscriber> Layer<S> for LevelCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            match *event.metadata().level() {
                Level::WARN => {
                    self.warnings.fetch_add(1, Ordering::SeqCst);
                }
                Level::ERROR => {
                    self.errors.fetch_add(1, Ordering::SeqCst);
                }
                _ => {}
            }
        }
    }
}
