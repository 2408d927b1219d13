//! 二进制数据检测库
//!
//! 设计要点：
//! - 值模型为标签联合（标量 / 函数 / 二进制叶子 / 数组 / 对象），数组与对象为共享句柄，可成环。
//! - 叶子判定通过可注入的 `Environment` 完成，Blob / File 仅在对应槽位是真正的构造器时才算二进制。
//! - 遍历使用显式工作栈 + 按身份去重的已访问集合，环形结构必然终止；`toJSON` 钩子每个对象至多调用一次。
//! - 外围提供 JSON 解码、TOML 环境配置与目录批量扫描（结果为稳定顺序的 JSON 数组）。

mod capabilities;
mod decode;
mod detect;
mod error;
mod findings;
mod options;
mod profile;
mod scan;
mod types;
mod value;

pub use capabilities::{BinaryKind, CapabilitySet, ConstructorSlot, Environment};
pub use decode::{decode_json, parse_json};
pub use detect::{contains_binary, contains_binary_in, locate_binary};
pub use error::{HasbinError, Result};
pub use findings::{BinaryMatch, PathSegment};
pub use options::{ScanOptions, ScanStats, DEFAULT_NAME_PATTERN};
pub use profile::{load_profile, parse_profile};
pub use scan::scan_and_write;
pub use types::OutputItem;
pub use value::{Array, Blob, BlobKind, Function, Object, Value, TO_JSON};
