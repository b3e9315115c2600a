use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// Environment variable with `env_logger` filter directives, applied on top of `-v`.
pub const LOG_ENV: &str = "PRGEN_LOG";

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Log to stderr so drafts and PR URLs on stdout stay clean.
pub fn init_logger(verbosity: u8) {
    let level = level_for(verbosity);
    let show_target = level >= LevelFilter::Debug;

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_env(LOG_ENV);

    builder.format(move |buf, record| {
        let level_label = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        if show_target {
            writeln!(
                buf,
                "{} {} {}",
                level_label,
                format!("[{}]", record.target()).dimmed(),
                record.args()
            )
        } else {
            writeln!(buf, "{} {}", level_label, record.args())
        }
    });

    builder.init();
}
