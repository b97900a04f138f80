// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 保留的历史日志文件数量
const MAX_LOG_FILES: usize = 5;

/// 持有日志文件写入线程，drop 时刷新剩余日志
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

/// `-v`/`-q` 计数之差对应的日志级别
pub fn level_for_verbosity(verbosity: i8) -> LevelFilter {
    match verbosity {
        i8::MIN..=-1 => LevelFilter::ERROR,
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// 初始化日志
///
/// `RUST_LOG` 优先；否则使用由 verbosity 推导的级别。
/// 指定 `log_file` 时日志只写入文件，不再输出到 stderr。
/// 日志文件按天轮转（`<name>.YYYY-MM-DD`），最多保留 [`MAX_LOG_FILES`] 个。
pub fn init_telemetry(verbosity: i8, log_file: Option<&Path>) -> anyhow::Result<TelemetryGuard> {
    let level = level_for_verbosity(verbosity);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{level},jobcount={level}").into());

    let registry = tracing_subscriber::registry().with(filter);

    let file_guard = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(directory)?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(file_name.to_string_lossy())
                .max_log_files(MAX_LOG_FILES)
                .build(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .try_init()?;
            Some(guard)
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
            None
        }
    };

    Ok(TelemetryGuard {
        _file_guard: file_guard,
    })
}
