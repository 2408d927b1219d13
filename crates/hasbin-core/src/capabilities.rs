//! 二进制叶子的能力判定（可注入的运行环境描述）
use serde::Serialize;

use crate::value::{BlobKind, Value};

/// 构造器槽位：环境中 Blob / File 名下实际放的是什么
#[derive(Debug, Clone, Default)]
pub enum ConstructorSlot {
    /// 环境不提供该能力
    Absent,
    /// 真正的构造器
    #[default]
    Constructor,
    /// 同名占位值（例如被覆盖成普通数组），不构成能力
    Placeholder(Value),
}

impl ConstructorSlot {
    pub fn is_constructor(&self) -> bool {
        matches!(self, ConstructorSlot::Constructor)
    }
}

/// 命中的二进制种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryKind {
    Buffer,
    ArrayBuffer,
    Blob,
    File,
}

impl BinaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryKind::Buffer => "Buffer",
            BinaryKind::ArrayBuffer => "ArrayBuffer",
            BinaryKind::Blob => "Blob",
            BinaryKind::File => "File",
        }
    }
}

/// 扫描环境的能力描述；默认值等价于具备全部能力的宿主
#[derive(Debug, Clone)]
pub struct Environment {
    pub buffer: bool,
    pub array_buffer: bool,
    pub blob: ConstructorSlot,
    pub file: ConstructorSlot,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            buffer: true,
            array_buffer: true,
            blob: ConstructorSlot::Constructor,
            file: ConstructorSlot::Constructor,
        }
    }
}

/// 可跨线程传递的能力摘要；占位值本身不参与叶子判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    pub buffer: bool,
    pub array_buffer: bool,
    pub blob: bool,
    pub file: bool,
}

impl From<CapabilitySet> for Environment {
    fn from(c: CapabilitySet) -> Self {
        let slot = |on: bool| if on { ConstructorSlot::Constructor } else { ConstructorSlot::Absent };
        Self { buffer: c.buffer, array_buffer: c.array_buffer, blob: slot(c.blob), file: slot(c.file) }
    }
}

impl Environment {
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet {
            buffer: self.buffer,
            array_buffer: self.array_buffer,
            blob: self.blob.is_constructor(),
            file: self.file.is_constructor(),
        }
    }

    /// 没有 Blob / File 的宿主（例如较旧的服务端运行时）
    pub fn without_blob() -> Self {
        Self { blob: ConstructorSlot::Absent, file: ConstructorSlot::Absent, ..Self::default() }
    }

    /// 叶子判定：返回命中的二进制种类，容器与标量一律为 None
    pub fn binary_kind(&self, value: &Value) -> Option<BinaryKind> {
        match value {
            Value::Buffer(_) if self.buffer => Some(BinaryKind::Buffer),
            Value::ArrayBuffer(_) if self.array_buffer => Some(BinaryKind::ArrayBuffer),
            // 仅当槽位是真正的构造器时才承认 Blob / File
            Value::Blob(b) => match b.kind {
                BlobKind::Blob if self.blob.is_constructor() => Some(BinaryKind::Blob),
                BlobKind::File if self.file.is_constructor() => Some(BinaryKind::File),
                _ => None,
            },
            _ => None,
        }
    }
}
