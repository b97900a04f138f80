// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：搜索词、观测值、会话与运行报告
/// - 仓库接口（repositories）：凭据存储与结果存储的抽象接口
/// - 服务（services）：会话管理、词条加载与查询引擎
///
/// 领域层不依赖具体的浏览器或文件实现，只依赖 engines 中的能力接口。
pub mod models;
pub mod repositories;
pub mod services;
