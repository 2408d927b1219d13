//! 公共类型（对外暴露）
use serde::Serialize;

use crate::capabilities::BinaryKind;
use crate::findings::BinaryMatch;

/// 输出项结构（对应结果 JSON 数组的单个元素）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputItem {
    pub file: String,
    pub has_binary: bool,
    pub path: Option<String>,
    pub kind: Option<BinaryKind>,
}

impl OutputItem {
    pub fn new(file: impl Into<String>, found: Option<&BinaryMatch>) -> Self {
        Self {
            file: file.into(),
            has_binary: found.is_some(),
            path: found.map(BinaryMatch::path_string),
            kind: found.map(|m| m.kind),
        }
    }
}
