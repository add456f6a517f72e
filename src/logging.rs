//! Логирование
//!
//! Библиотека пишет через макросы `tracing`; подписчик ставит только CLI.
//! Уровень по умолчанию `info` (`debug` с `--verbose`), `RUST_LOG` имеет приоритет.

use tracing_subscriber::EnvFilter;

/// Устанавливает глобальный подписчик с выводом в stderr.
///
/// Повторный вызов ничего не делает.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
