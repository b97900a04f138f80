// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// 结果数量所在元素的选择器，按优先级排列
const COUNT_SELECTORS: &[&str] = &[
    "div[class*='jobs-search-results-list__subtitle']",
    "[class*='jobs-search-results-list__text']",
    "[class*='results-context-header__job-count']",
];

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d]").expect("static regex"));

/// 从搜索结果页面提取职位总数
///
/// 找不到计数元素（页面改版、空结果页、限流页）时返回 `None`，不做猜测
pub fn extract_count(html_content: &str) -> Option<u64> {
    let document = Html::parse_document(html_content);

    for selector_str in COUNT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        for element in document.select(&selector) {
            let text = element.text().collect::<Vec<_>>().join(" ");
            if let Some(count) = parse_count_text(&text) {
                tracing::debug!(selector = selector_str, text = text.trim(), count, "count element found");
                return Some(count);
            }
        }
    }

    None
}

/// 去掉所有非数字字符后解析，例如 `"1,234 results"` -> 1234
pub fn parse_count_text(text: &str) -> Option<u64> {
    let digits = NON_DIGITS.replace_all(text, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}
