//! 远程调用结果的归一化模型。
//!
//! 服务客户端把每一次远程调用的结局统一收敛为 `RpcResult`：
//! 成功标志、一条人类可读的消息、以及可选的原始响应数据。
//! 任何错误都在客户端边界被捕获并转换为失败结果，指令层永远
//! 只拿到返回值而不是异常。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 无可用响应时返回的固定失败消息。
pub const RPC_CALL_FAILED: &str = "RPC call failed";

/// 一次远程调用的归一化结果。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcResult {
    /// 调用是否得到了可用的响应。
    pub success: bool,
    /// 人类可读的结果消息（成功时为远端消息或序列化后的响应体，
    /// 失败时为失败原因）。
    pub message: String,
    /// 远端返回的原始结构化响应（若有）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcResult {
    /// 构造一个失败结果。
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// 把传输层的可选响应归一化为结果。
    ///
    /// 规则与远端约定保持一致：
    /// - 无响应（或响应为 JSON null）→ 失败，消息为 [`RPC_CALL_FAILED`]；
    /// - 响应带字符串 `message` 字段 → 成功，消息原样透传；
    /// - 响应没有可用消息 → 成功，消息为整个响应体的 JSON 序列化文本。
    pub fn from_response(response: Option<Value>) -> Self {
        match response {
            None | Some(Value::Null) => Self::failure(RPC_CALL_FAILED),
            Some(value) => {
                let message = match value.get("message").and_then(Value::as_str) {
                    Some(text) => text.to_string(),
                    None => value.to_string(),
                };
                Self {
                    success: true,
                    message,
                    data: Some(value),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    /// 带字符串 message 字段的响应应原样透传消息并标记成功。
    fn test_message_field_passthrough() {
        let result = RpcResult::from_response(Some(json!({"message": "done", "code": 0})));
        assert!(result.success);
        assert_eq!(result.message, "done");
        assert_eq!(result.data.as_ref().and_then(|d| d["code"].as_i64()), Some(0));
    }

    #[test]
    /// 没有响应时应返回固定的失败消息。
    fn test_absent_response_is_failure() {
        let result = RpcResult::from_response(None);
        assert!(!result.success);
        assert_eq!(result.message, RPC_CALL_FAILED);
        assert!(result.data.is_none());

        // JSON null 与"无响应"同样处理
        let result = RpcResult::from_response(Some(Value::Null));
        assert!(!result.success);
        assert_eq!(result.message, RPC_CALL_FAILED);
    }

    #[test]
    /// message 字段缺失（或不是字符串）时，消息应为整个响应体的序列化文本。
    fn test_structured_response_is_stringified() {
        let result = RpcResult::from_response(Some(json!({"pos": {"x": 1.0}})));
        assert!(result.success);
        assert_eq!(result.message, r#"{"pos":{"x":1.0}}"#);

        let result = RpcResult::from_response(Some(json!({"message": 42})));
        assert!(result.success, "message 字段非字符串时仍视为成功响应");
        assert_eq!(result.message, r#"{"message":42}"#);
    }
}
