// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// - 凭据存储（credential_store）：JSON Cookie 文件，原子覆盖写入
/// - 结果存储（csv_result_sink）：只追加的 CSV 观测值文件
pub mod credential_store;
pub mod csv_result_sink;
