//! IPFS驱动工具函数 / IPFS driver utility functions

use serde_json::Value;

/// MD5哈希(十六进制) / MD5 hash (hex)
pub fn md5_hex(data: &str) -> String {
    format!("{:x}", md5::compute(data.as_bytes()))
}

/// 当前Unix时间戳 / Current Unix timestamp (seconds)
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 宽松布尔判断 / Loose truthiness of a decoded response
///
/// `false`, `null`, `0`, `""`, `"0"`, `[]` and `{}` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// 读取整数字段(兼容字符串) / Read an integer field, accepting numeric strings
pub fn int_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
