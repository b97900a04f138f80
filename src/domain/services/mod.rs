// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 会话管理（session_manager）：加载、校验、清除会话，以及登录后保存会话
/// - 查询引擎（query_engine）：逐个执行搜索并产出观测值或失败记录
/// - 词条来源（term_source）：从命令行或 CSV 文件加载搜索词
pub mod query_engine;
pub mod session_manager;
pub mod term_source;
