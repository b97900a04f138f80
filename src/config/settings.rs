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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::engines::traits::BackendKind;
use crate::utils::retry_policy::RetryPolicy;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// 应用程序配置设置
///
/// 包含站点、会话、查询节奏和输出等所有配置项
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// 站点配置
    #[validate(nested)]
    pub site: SiteSettings,
    /// 会话配置
    #[validate(nested)]
    pub session: SessionSettings,
    /// 查询配置
    #[validate(nested)]
    pub query: QuerySettings,
    /// 输出配置
    pub output: OutputSettings,
}

/// 站点配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SiteSettings {
    /// 站点根地址
    #[validate(url)]
    pub base_url: String,
    /// 登录页路径
    pub login_path: String,
    /// 登录后用于校验会话的页面路径
    pub landing_path: String,
}

impl SiteSettings {
    pub fn login_url(&self) -> String {
        join_url(&self.base_url, &self.login_path)
    }

    pub fn landing_url(&self) -> String {
        join_url(&self.base_url, &self.landing_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// 会话配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionSettings {
    /// Cookie 存放目录
    pub cookie_dir: String,
    /// 搜索后端
    pub browser: BackendKind,
    /// 是否无头运行浏览器
    pub headless: bool,
    /// 等待人工登录完成的时间（秒）
    #[validate(range(min = 1))]
    pub login_timeout_secs: u64,
}

impl SessionSettings {
    /// 凭据文件路径：`<cookie_dir>/chrome/cookies.json`
    pub fn cookie_path(&self) -> PathBuf {
        Path::new(&self.cookie_dir)
            .join(self.browser.cookie_profile())
            .join("cookies.json")
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

/// 查询配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuerySettings {
    /// 相邻两个搜索词之间的间隔（毫秒）
    pub inter_term_delay_ms: u64,
    /// 单次请求超时时间（秒）
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
    /// 临时错误的最大重试次数
    #[validate(range(max = 5))]
    pub max_retries: u32,
    /// 首次重试前的退避时间（毫秒）
    pub initial_backoff_ms: u64,
    /// 退避时间上限（毫秒）
    pub max_backoff_ms: u64,
}

impl QuerySettings {
    pub fn inter_term_delay(&self) -> Duration {
        Duration::from_millis(self.inter_term_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            ..RetryPolicy::default()
        }
    }
}

/// 输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// 未指定 `--output-file` 时的结果文件
    pub default_path: String,
}

/// 默认 Cookie 目录：`~/.local/share/job-count`
pub fn default_cookie_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("job-count")
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加：内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`、
    /// 显式指定的配置文件、`JOBCOUNT__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载并通过校验的配置
    /// * `Err(SettingsError)` - 配置加载或校验失败
    pub fn new(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let mut builder = Config::builder()
            .set_default("site.base_url", "https://www.linkedin.com")?
            .set_default("site.login_path", "/login")?
            .set_default("site.landing_path", "/feed/")?
            .set_default(
                "session.cookie_dir",
                default_cookie_dir().to_string_lossy().to_string(),
            )?
            .set_default("session.browser", "chrome")?
            .set_default("session.headless", true)?
            .set_default("session.login_timeout_secs", 60)?
            .set_default("query.inter_term_delay_ms", 2000)?
            .set_default("query.request_timeout_secs", 30)?
            .set_default("query.max_retries", 1)?
            .set_default("query.initial_backoff_ms", 1000)?
            .set_default("query.max_backoff_ms", 10000)?
            .set_default("output.default_path", "job-counts.csv")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("JOBCOUNT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}
