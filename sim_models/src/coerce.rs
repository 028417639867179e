//! 宽松参数收敛辅助函数。
//!
//! 积木宿主下发的指令参数是松散的 JSON 值（数字可能以字符串形式到达，
//! 字段可能整体缺失）。这里提供把这些值收敛为类型化可选参数的小工具，
//! 无法解析的值一律按"缺失"处理，由请求构造函数补默认值。

use serde_json::Value;

/// 尝试把参数值收敛为字符串。
///
/// 字符串原样返回（空串也保留，缺失才算缺失）；数字转为其十进制文本；
/// 其余类型视为缺失。
pub fn opt_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

/// 尝试把参数值收敛为浮点数。
///
/// 数字直接取值；字符串按十进制解析（解析失败视为缺失）；
/// 其余类型视为缺失。
pub fn opt_num(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// 解析两值开关令牌。
///
/// 仅当令牌（大小写不敏感）等于 `off` 时为关，其余任何令牌
/// （包括空串）都视为开。
pub fn switch_on(token: &str) -> bool {
    !token.eq_ignore_ascii_case("off")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    /// 数字与数字字符串都应能收敛为浮点数，垃圾文本视为缺失。
    fn test_opt_num_coercion() {
        assert_eq!(opt_num(Some(&json!(1.5))), Some(1.5));
        assert_eq!(opt_num(Some(&json!("2.5"))), Some(2.5));
        assert_eq!(opt_num(Some(&json!(" 3 "))), Some(3.0));
        assert_eq!(opt_num(Some(&json!("abc"))), None, "无法解析的文本应视为缺失");
        assert_eq!(opt_num(Some(&json!(true))), None);
        assert_eq!(opt_num(None), None);
    }

    #[test]
    /// 字符串参数应原样保留（包括空串），数字参数转文本。
    fn test_opt_text_coercion() {
        assert_eq!(opt_text(Some(&json!("Scout"))), Some("Scout".to_string()));
        assert_eq!(opt_text(Some(&json!(""))), Some(String::new()));
        assert_eq!(opt_text(Some(&json!(7))), Some("7".to_string()));
        assert_eq!(opt_text(Some(&json!(null))), None);
        assert_eq!(opt_text(None), None);
    }

    #[test]
    /// 只有 off（大小写不敏感）才是关，其余令牌一律为开。
    fn test_switch_token() {
        assert!(!switch_on("off"));
        assert!(!switch_on("OFF"));
        assert!(!switch_on("Off"));
        assert!(switch_on("on"));
        assert!(switch_on("anything"));
        assert!(switch_on(""), "空令牌应视为开");
    }
}
