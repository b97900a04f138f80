// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::engines::traits::BackendKind;

/// 命令行入口
#[derive(Parser, Debug)]
#[command(name = "jobcount", version)]
#[command(about = "Count job postings for (job title, location) searches and record them over time", long_about = None)]
pub struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in interactively and save the session for later queries
    Login(LoginArgs),
    /// Query job counts and append them to a CSV file
    Query(QueryArgs),
    /// Delete the saved session
    ClearCookies(ClearCookiesArgs),
}

/// 所有命令共用的参数
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Increase logging verbosity (-vv to increase further)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (-qq to decrease further)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Write logs to this file instead of stderr
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Search backend
    #[arg(short, long, value_enum)]
    pub browser: Option<BackendKind>,

    /// Directory for the saved session (defaults to ~/.local/share/job-count)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub cookie_dir: Option<PathBuf>,
}

impl CommonArgs {
    /// `-v` 与 `-q` 相抵后的日志级别偏移
    pub fn verbosity(&self) -> i8 {
        let verbose = i8::try_from(self.verbose).unwrap_or(i8::MAX);
        let quiet = i8::try_from(self.quiet).unwrap_or(i8::MAX);
        verbose.saturating_sub(quiet)
    }
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Seconds to wait for the login to complete
    #[arg(short = 't', long, value_name = "SECS")]
    pub login_timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Inline "title,location" terms, e.g. -t "Ice Sculptor,Honolulu" "Panda Fluffer,Tokyo"
    #[arg(short = 't', long, num_args = 1.., value_name = "TERM")]
    pub terms: Option<Vec<String>>,

    /// CSV file with job_title and location columns
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// CSV file to append the counts to
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Show the browser window
    #[arg(short = 'N', long)]
    pub no_headless: bool,
}

#[derive(Args, Debug)]
pub struct ClearCookiesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::Login(args) => &args.common,
            Command::Query(args) => &args.common,
            Command::ClearCookies(args) => &args.common,
        }
    }
}

/// 命令行解析失败时的退出码
///
/// `--help` 与 `--version` 返回 0；用法错误返回 1，与“批次开始前中止”一致，
/// 不占用表示部分失败的 2。
pub fn parse_error_exit_code(error: &clap::Error) -> u8 {
    if error.use_stderr() {
        1
    } else {
        0
    }
}
