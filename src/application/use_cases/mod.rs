// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 每个用例对应一个命令：查询、登录、清除凭据
pub mod query_use_case;
pub mod session_use_case;
