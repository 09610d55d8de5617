use log::LevelFilter;
use simple_logger::SimpleLogger;

use crate::AppError;

/// Installs the global logger. `RUST_LOG` takes precedence over `level`.
pub fn init(level: LevelFilter) -> Result<(), AppError> {
    SimpleLogger::new().with_level(level).env().init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use log::LevelFilter;

    use crate::config::log::init;

    #[test]
    fn test_init() {
        // Given
        let noop_logger = log::logger();

        // When
        let result = init(LevelFilter::Debug);

        // Then
        assert!(result.is_ok());
        let logger = log::logger();
        assert!(
            !ptr::eq(noop_logger, logger),
            "Should initialize global logger"
        );
        assert!(
            init(LevelFilter::Debug).is_err(),
            "Should refuse to install a second logger"
        );
    }
}
