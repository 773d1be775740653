//! Logging utilities for the application
//!
//! Logging goes through `tracing`; `log` records emitted by error constructors are
//! forwarded to the same subscriber. `RUST_LOG` takes precedence over the level
//! passed in by the caller.
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

type SetupResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Default level when neither `RUST_LOG` nor the CLI sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Setup logging to stderr
///
/// Stdout is reserved for command output (JSON results), so log lines go to stderr.
pub fn setup_logging(default_level: &str) -> SetupResult {
	setup_logging_with_writer(std::io::stderr, default_level)
}

/// Setup logging with a custom writer
pub fn setup_logging_with_writer<W>(writer: W, default_level: &str) -> SetupResult
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let filter =
		EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(false)
						.compact(),
				)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}
