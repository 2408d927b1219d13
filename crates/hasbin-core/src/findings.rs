//! 命中项：二进制叶子的种类与访问路径
use std::fmt;

use crate::capabilities::BinaryKind;

/// 路径片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Index(usize),
    Key(String),
    /// 经由 `toJSON()` 钩子的返回值
    ToJson,
}

/// 首个二进制叶子的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMatch {
    pub kind: BinaryKind,
    pub path: Vec<PathSegment>,
}

impl BinaryMatch {
    /// 形如 `$[1].bin.toJSON()` 的路径文本
    pub fn path_string(&self) -> String {
        let mut s = String::from("$");
        for seg in &self.path {
            match seg {
                PathSegment::Index(i) => s.push_str(&format!("[{i}]")),
                PathSegment::Key(k) if is_identifier(k) => {
                    s.push('.');
                    s.push_str(k);
                }
                // 非标识符键名用带引号的下标形式
                PathSegment::Key(k) => s.push_str(&format!("[{k:?}]")),
                PathSegment::ToJson => s.push_str(".toJSON()"),
            }
        }
        s
    }
}

impl fmt::Display for BinaryMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind.as_str(), self.path_string())
    }
}

fn is_identifier(k: &str) -> bool {
    let mut chars = k.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
