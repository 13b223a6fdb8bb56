use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Once;

use chrono::Utc;

use crate::shared::config::{self, LogFormat, LoggingConfig, LogMode};

/// Filter used when `RUST_LOG` is unset: this crate at info, dependencies
/// (reqwest, hyper) only from warn.
pub const DEFAULT_FILTER: &str = "warn,recast_bot=info";

static INIT: Once = Once::new();

/// Installs the env_logger backend once, per `config::logging_config()`.
///
/// The library only logs through the `log` facade; the CLI and the e2e tests
/// call this to get output. Messages written as `[component] text` (the
/// `[recast]` client, `[dispatch]`, `[RecastBot]` failures) have the bracket
/// lifted into a `component` field; other records use their log target.
///
/// ```
/// recast_bot::logging::init();
/// log::info!("[recast] logger ready");
/// ```
pub fn init() {
    INIT.call_once(|| {
        let cfg = config::logging_config().clone();
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER));

        let format = cfg.format.clone();
        builder.format(move |buf, record| {
            let ts = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
            let msg = record.args().to_string();
            let (component, text) = split_component(&msg);
            let line = format_line(
                &format,
                &ts,
                record.level(),
                component.unwrap_or(record.target()),
                text,
            );
            writeln!(buf, "{}", line)
        });

        let (target, warnings) = open_target(&cfg);
        builder.target(target);

        let _ = builder.try_init();
        for warning in warnings {
            log::warn!("[logging] {}", warning);
        }
    });
}

/// Splits a leading `[component]` tag (and an optional `:`) off a message.
pub fn split_component(msg: &str) -> (Option<&str>, &str) {
    let Some(rest) = msg.strip_prefix('[') else {
        return (None, msg);
    };
    match rest.split_once(']') {
        Some((component, text)) if !component.is_empty() => {
            let text = text.strip_prefix(':').unwrap_or(text);
            (Some(component), text.trim_start())
        }
        _ => (None, msg),
    }
}

/// Renders one log line without the trailing newline.
pub fn format_line(
    format: &LogFormat,
    ts: &str,
    level: log::Level,
    component: &str,
    msg: &str,
) -> String {
    match format {
        LogFormat::Json => serde_json::json!({
            "ts": ts,
            "level": level.as_str(),
            "component": component,
            "msg": msg,
        })
        .to_string(),
        LogFormat::Text => format!("{} {:<5} {} {}", ts, level, component, msg),
    }
}

/// Picks the writer for `cfg`. File mode falls back to stdout when the log
/// file cannot be opened; the reasons come back as warnings to log after init.
fn open_target(cfg: &LoggingConfig) -> (env_logger::Target, Vec<String>) {
    let mut warnings = Vec::new();
    let dir = match (&cfg.mode, cfg.dir.as_ref()) {
        (LogMode::File, Some(dir)) => dir,
        _ => return (env_logger::Target::Stdout, warnings),
    };

    if let Err(err) = std::fs::create_dir_all(dir) {
        warnings.push(format!("failed to create log dir {}: {}", dir, err));
    }
    let path = Path::new(dir).join(&cfg.file_name);
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => (env_logger::Target::Pipe(Box::new(file)), warnings),
        Err(err) => {
            warnings.push(format!(
                "failed to open log file ({}), using stdout: {}",
                path.display(),
                err
            ));
            (env_logger::Target::Stdout, warnings)
        }
    }
}
