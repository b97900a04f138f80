// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 仓库接口定义了持久化的抽象契约，具体实现由基础设施层提供：
/// - 凭据仓库（credential_repository）：会话 Cookie 的读写与删除
/// - 结果仓库（result_repository）：观测值的追加写入
pub mod credential_repository;
pub mod result_repository;
