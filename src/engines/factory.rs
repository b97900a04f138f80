// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::settings::Settings;
use crate::engines::chromium_engine::{ChromiumEngine, ChromiumOptions};
use crate::engines::http_engine::HttpEngine;
use crate::engines::traits::{BackendKind, EngineError, SearchBackend};

/// 按配置创建搜索后端
///
/// # 参数
///
/// * `kind` - 后端类型
/// * `settings` - 应用配置
/// * `headless` - 是否无头运行浏览器，HTTP 后端忽略该参数
pub async fn create_backend(
    kind: BackendKind,
    settings: &Settings,
    headless: bool,
) -> Result<Arc<dyn SearchBackend>, EngineError> {
    info!(backend = kind.as_str(), headless, "starting search backend");
    match kind {
        BackendKind::Chrome => {
            let options = ChromiumOptions {
                headless,
                request_timeout: settings.query.request_timeout(),
                ..ChromiumOptions::default()
            };
            Ok(Arc::new(ChromiumEngine::launch(options).await?))
        }
        BackendKind::Http => Ok(Arc::new(HttpEngine::new(
            &settings.site.base_url,
            settings.query.request_timeout(),
        )?)),
    }
}

/// 搜索后端提供者
///
/// 用例只在加载完搜索词和会话之后才创建后端
#[async_trait]
pub trait BackendProvider: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn SearchBackend>, EngineError>;
}

/// 按配置启动真实后端
pub struct ConfiguredBackend {
    kind: BackendKind,
    settings: Settings,
    headless: bool,
}

impl ConfiguredBackend {
    pub fn new(kind: BackendKind, settings: Settings, headless: bool) -> Self {
        Self {
            kind,
            settings,
            headless,
        }
    }
}

#[async_trait]
impl BackendProvider for ConfiguredBackend {
    async fn create(&self) -> Result<Arc<dyn SearchBackend>, EngineError> {
        create_backend(self.kind, &self.settings, self.headless).await
    }
}
