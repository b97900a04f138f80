// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

use jobcount::application::use_cases::query_use_case::QueryUseCase;
use jobcount::application::use_cases::session_use_case::{ClearCookiesUseCase, LoginUseCase};
use jobcount::config::settings::Settings;
use jobcount::domain::services::query_engine::QueryEngine;
use jobcount::domain::services::session_manager::SessionManager;
use jobcount::domain::services::term_source::TermSource;
use jobcount::engines::factory::ConfiguredBackend;
use jobcount::engines::traits::BackendKind;
use jobcount::infrastructure::credential_store::FileCredentialStore;
use jobcount::infrastructure::csv_result_sink::CsvResultSink;
use jobcount::presentation::cli::{self, Cli, Command, CommonArgs, LoginArgs, QueryArgs};
use jobcount::presentation::table;
use jobcount::utils::telemetry;

/// 主函数
///
/// 解析命令行、初始化日志与配置，然后执行对应命令。
/// 退出码：0 全部成功，1 批次开始前中止，2 部分搜索词失败，3 批次中途中止
#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap would exit with 2, which means "completed with failures" here
            let _ = e.print();
            return ExitCode::from(cli::parse_error_exit_code(&e));
        }
    };

    let common = cli.command.common().clone();
    let _telemetry = match telemetry::init_telemetry(common.verbosity(), common.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: could not initialize logging: {:#}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli, &common).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli, common: &CommonArgs) -> anyhow::Result<ExitCode> {
    // 1. Load configuration, then apply command-line overrides
    let mut settings = Settings::new(cli.config.as_deref())?;
    if let Some(dir) = &common.cookie_dir {
        settings.session.cookie_dir = dir.to_string_lossy().to_string();
    }
    if let Some(browser) = common.browser {
        settings.session.browser = browser;
    }
    debug!(?settings, "configuration loaded");

    // 2. Session management shared by every command
    let store = Arc::new(FileCredentialStore::new(settings.session.cookie_path()));
    let sessions = Arc::new(SessionManager::new(
        store,
        settings.site.landing_url(),
        settings.site.login_url(),
    ));

    match cli.command {
        Command::Login(args) => login(settings, sessions, args).await,
        Command::Query(args) => query(settings, sessions, args).await,
        Command::ClearCookies(_) => {
            ClearCookiesUseCase::new(sessions).execute().await?;
            println!("Cookies cleared");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn login(
    mut settings: Settings,
    sessions: Arc<SessionManager>,
    args: LoginArgs,
) -> anyhow::Result<ExitCode> {
    if let Some(secs) = args.login_timeout {
        settings.session.login_timeout_secs = secs;
    }
    let timeout = settings.session.login_timeout();

    // Logging in always needs a visible browser window
    let backends = Arc::new(ConfiguredBackend::new(BackendKind::Chrome, settings, false));
    println!("Log in using the browser window (waiting up to {}s)...", timeout.as_secs());

    LoginUseCase::new(sessions.clone(), backends, timeout)
        .execute()
        .await?;
    println!(
        "Successfully logged in! Cookies saved here: {}",
        sessions.credential_location()
    );
    Ok(ExitCode::SUCCESS)
}

async fn query(
    settings: Settings,
    sessions: Arc<SessionManager>,
    args: QueryArgs,
) -> anyhow::Result<ExitCode> {
    let source = TermSource::from_args(args.terms, args.input_file)?;
    let output = args
        .output_file
        .unwrap_or_else(|| PathBuf::from(&settings.output.default_path));

    let headless = settings.session.headless && !args.no_headless;
    let engine = QueryEngine::from_settings(&settings)?;
    let backends = Arc::new(ConfiguredBackend::new(
        settings.session.browser,
        settings,
        headless,
    ));
    let sink = Arc::new(CsvResultSink::new(&output));

    let use_case = QueryUseCase::new(sessions, backends, engine, sink);
    let report = use_case.execute(&source, shutdown_signal()).await?;

    if !report.observations.is_empty() {
        print!("{}", table::render_results(&report));
        println!("Results written to {}", output.display());
    }
    if !report.failures.is_empty() {
        eprintln!("Failed terms:");
        eprint!("{}", table::render_failures(&report));
    }
    eprintln!("{}", report);

    let code = report.status().exit_code();
    info!(exit_code = code, "done");
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

/// Ctrl-C；无法安装信号处理器时永不完成
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
