//! 批量扫描选项与统计信息
use crate::capabilities::Environment;

/// 默认只扫描 .json 文件
pub const DEFAULT_NAME_PATTERN: &str = r"\.json$";

/// 批量扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 文件名过滤正则
    pub name_pattern: String,
    /// 运行环境描述（决定哪些叶子算二进制）
    pub environment: Environment,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: None,
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            environment: Environment::default(),
            threads: None,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub files_with_binary: usize,
}
