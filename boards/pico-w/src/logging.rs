//! Routes the `log` records emitted by `duoclock-core` into defmt, so the
//! whole firmware shares one RTT transport.

use log::{LevelFilter, Metadata, Record};

struct DefmtBridge;

impl log::Log for DefmtBridge {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let args = defmt::Display2Format(record.args());
        match record.level() {
            log::Level::Error => defmt::error!("{}", args),
            log::Level::Warn => defmt::warn!("{}", args),
            log::Level::Info => defmt::info!("{}", args),
            log::Level::Debug => defmt::debug!("{}", args),
            log::Level::Trace => defmt::trace!("{}", args),
        }
    }

    fn flush(&self) {}
}

static BRIDGE: DefmtBridge = DefmtBridge;

/// Installs the bridge. Must run before the first task is spawned.
///
/// The safe `log::set_logger` is unavailable on thumbv6m (no atomic
/// compare-and-swap); the racy variant is fine here because this is called
/// exactly once, from `main`, on a single core.
pub fn init() {
    #[allow(unsafe_code)]
    unsafe {
        log::set_logger_racy(&BRIDGE).ok();
        log::set_max_level_racy(LevelFilter::Debug);
    }
}
