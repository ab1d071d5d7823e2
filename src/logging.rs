//! Process-wide logger setup.

use log::SetLoggerError;

/// Install the process logger; `RUST_LOG` overrides the `info` default
pub fn init() -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // Another test may already have installed a logger
        let _ = init();
        assert!(init().is_err());
    }
}
