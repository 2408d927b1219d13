//! JSON 文档到 `Value` 的解码
//!
//! 约定：形如 `{"type": T, "data": [字节...]}` 且 T 为 Buffer / ArrayBuffer / Blob / File
//! 的对象解码为二进制叶子（即 Buffer#toJSON 的输出形状）；Blob / File 可带 `mime`，
//! File 可带 `name`。其余一律按普通值解码。
use serde_json::Value as Json;

use crate::error::Result;
use crate::value::{Array, Object, Value};

/// 解析 JSON 文本并解码
pub fn parse_json(text: &str) -> Result<Value> {
    let json: Json = serde_json::from_str(text)?;
    Ok(decode_json(&json))
}

/// 将已解析的 JSON 值解码为 `Value`
pub fn decode_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => {
            let arr = Array::new();
            for item in items {
                arr.push(decode_json(item));
            }
            Value::Array(arr)
        }
        Json::Object(map) => {
            if let Some(leaf) = decode_binary_leaf(map) {
                return leaf;
            }
            let obj = Object::new();
            for (k, v) in map {
                obj.insert(k.clone(), decode_json(v));
            }
            Value::Object(obj)
        }
    }
}

/// 识别二进制叶子形状；多余的键或非字节数据都视为普通对象
fn decode_binary_leaf(map: &serde_json::Map<String, Json>) -> Option<Value> {
    let tag = map.get("type")?.as_str()?;
    let data = bytes_of(map.get("data")?)?;
    let str_field = |key: &str| map.get(key).and_then(Json::as_str);

    let allowed: &[&str] = match tag {
        "Buffer" | "ArrayBuffer" => &["type", "data"],
        "Blob" => &["type", "data", "mime"],
        "File" => &["type", "data", "mime", "name"],
        _ => return None,
    };
    if map.keys().any(|k| !allowed.contains(&k.as_str())) {
        return None;
    }

    Some(match tag {
        "Buffer" => Value::buffer(data),
        "ArrayBuffer" => Value::array_buffer(data),
        "Blob" => Value::blob(data, str_field("mime")),
        _ => Value::file(data, str_field("name").unwrap_or(""), str_field("mime")),
    })
}

fn bytes_of(json: &Json) -> Option<Vec<u8>> {
    json.as_array()?
        .iter()
        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}
