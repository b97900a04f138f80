// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 搜索词（search_term）：一次搜索的 (职位, 地点) 对
/// - 观测值（observation）：某个搜索词在某一时刻的职位数量
/// - 会话（session）：已认证的 Cookie 集合
/// - 运行报告（report）：一次批量运行的结果汇总
pub mod observation;
pub mod report;
pub mod search_term;
pub mod session;
