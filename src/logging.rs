use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/**
Installs the `env_logger` backend.

`RUST_LOG` directives (e.g. `watershed_hydro=debug,info`) are honored; `level`, when it
names a valid level, overrides the default level. Without either, `info` is used.

# Arguments

* `level` - Level from the command line, e.g. `"debug"`
*/
pub fn init_logging(level: Option<&str>) {
    let directives = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    let initialized = logger_builder(level, directives.as_deref()).try_init();
    if initialized.is_ok() {
        log::debug!("logger initialized (max level: {})", log::max_level());
    }
}

fn logger_builder(level: Option<&str>, directives: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    builder.parse_filters(directives.filter(|d| !d.trim().is_empty()).unwrap_or("info"));
    if let Some(level) = level {
        match level.parse::<LevelFilter>() {
            Ok(filter) => {
                builder.filter_level(filter);
            }
            Err(_) => eprintln!("ignoring unknown log level {level:?}"),
        }
    }
    builder.format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()));
    builder
}
