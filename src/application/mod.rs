// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 将领域服务、引擎与基础设施组装成命令级别的用例
pub mod use_cases;
