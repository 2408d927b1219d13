//! 运行环境配置文件加载（TOML）
use serde::Deserialize;
use std::path::Path;

use crate::capabilities::{ConstructorSlot, Environment};
use crate::error::{HasbinError, Result};
use crate::value::Value;

/// 构造器槽位在配置文件中的写法
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SlotEntry {
    Constructor,
    Absent,
    Placeholder,
}

/// `[environment]` 段；缺省字段取宿主默认值
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnvironmentEntry {
    #[serde(default)]
    pub buffer: Option<bool>,
    #[serde(default)]
    pub array_buffer: Option<bool>,
    #[serde(default)]
    pub blob: Option<SlotEntry>,
    #[serde(default)]
    pub file: Option<SlotEntry>,
}

/// 顶层配置结构
#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    pub environment: EnvironmentEntry,
}

impl SlotEntry {
    fn into_slot(self) -> ConstructorSlot {
        match self {
            SlotEntry::Constructor => ConstructorSlot::Constructor,
            SlotEntry::Absent => ConstructorSlot::Absent,
            // 配置里只能声明“被占位”，占位值本身固定为空数组
            SlotEntry::Placeholder => ConstructorSlot::Placeholder(Value::array(Vec::<Value>::new())),
        }
    }
}

/// 从 TOML 文本解析环境描述
pub fn parse_profile(txt: &str, origin: &Path) -> Result<Environment> {
    let parsed: ProfileFile = toml::from_str(txt)
        .map_err(|source| HasbinError::Profile { path: origin.to_path_buf(), source })?;
    let e = parsed.environment;
    let mut env = Environment::default();
    if let Some(b) = e.buffer { env.buffer = b; }
    if let Some(b) = e.array_buffer { env.array_buffer = b; }
    if let Some(s) = e.blob { env.blob = s.into_slot(); }
    if let Some(s) = e.file { env.file = s.into_slot(); }
    Ok(env)
}

/// 从 TOML 配置文件加载环境描述
pub fn load_profile(path: &Path) -> Result<Environment> {
    let txt = std::fs::read_to_string(path)
        .map_err(|source| HasbinError::Io { path: path.to_path_buf(), source })?;
    parse_profile(&txt, path)
}
