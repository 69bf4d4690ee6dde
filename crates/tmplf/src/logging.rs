use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::args::GlobalArgs;

/// Install a stderr subscriber. `RUST_LOG` wins over the level picked from
/// the command line and the `debug` setting.
pub fn init_tracing(global: &GlobalArgs, debug: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(global, debug)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter);

    // Keep an already installed subscriber.
    let _ = Registry::default().with(stderr_layer).try_init();
}

fn default_level(global: &GlobalArgs, debug: bool) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 if debug => "debug",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(quiet: bool, verbose: u8) -> GlobalArgs {
        GlobalArgs { quiet, verbose }
    }

    #[test]
    fn levels_follow_flags() {
        assert_eq!(default_level(&global(false, 0), false), "warn");
        assert_eq!(default_level(&global(false, 1), false), "info");
        assert_eq!(default_level(&global(false, 2), false), "debug");
        assert_eq!(default_level(&global(false, 5), false), "trace");
        assert_eq!(default_level(&global(true, 0), true), "error");
    }

    #[test]
    fn debug_setting_raises_default() {
        assert_eq!(default_level(&global(false, 0), true), "debug");
        assert_eq!(default_level(&global(false, 3), true), "trace");
    }
}
