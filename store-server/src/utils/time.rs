//! 时间工具函数
//!
//! 所有持久化时间戳统一使用 `i64` Unix millis；
//! repository 层不做任何时区转换。

use chrono::Utc;

/// 当前时间 → Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
    }
}
