use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

/// Install the engine's stderr logger. Later calls keep the first logger.
pub fn init(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    if TermLogger::init(level, config.clone(), TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        // Either a logger is already installed or stderr is not a terminal.
        let _ = WriteLogger::init(level, config, std::io::stderr());
    }
}
