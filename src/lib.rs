// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含一次运行的用例编排：查询、登录、清除凭据
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心实体、会话管理、查询引擎和仓库接口
pub mod domain;

/// 引擎模块
///
/// 实现搜索能力接口的浏览器与 HTTP 后端
pub mod engines;

/// 基础设施模块
///
/// 提供凭据文件与结果 CSV 的持久化实现
pub mod infrastructure;

/// 表示层模块
///
/// 命令行参数定义与结果表格输出
pub mod presentation;

/// 工具模块
///
/// 提供日志初始化、重试策略等通用功能
pub mod utils;
