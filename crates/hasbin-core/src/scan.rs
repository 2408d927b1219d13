//! 批量扫描主流程与并行调度
use regex::Regex;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::capabilities::{CapabilitySet, Environment};
use crate::decode::parse_json;
use crate::detect::locate_binary;
use crate::error::{HasbinError, Result};
use crate::options::{ScanOptions, ScanStats};
use crate::types::OutputItem;

/// 单个文件的处理结果
#[derive(Debug)]
enum Outcome {
    Scanned(OutputItem),
    Skipped,
    Failed,
}

/// 扫描目录下的 JSON 文档并将结果以 JSON 数组流式写入 `out`
/// 稳定性保证：文件按文件名排序，并行与串行输出完全一致
pub fn scan_and_write(input_dir: &Path, out: &mut dyn Write, opts: &ScanOptions) -> Result<ScanStats> {
    let pattern = Regex::new(&opts.name_pattern)?;
    let files = collect_files(input_dir, &pattern);
    info!(files = files.len(), dir = %input_dir.display(), "collected documents");

    let mut stats = ScanStats::default();
    let threads = opts.threads.unwrap_or_else(num_cpus::get);

    // 决策：多线程且文件数 > 1 时走并行调度；否则串行
    if threads > 1 && files.len() > 1 {
        scan_and_write_parallel(files, out, opts, &mut stats, threads)?;
        return Ok(stats);
    }

    write!(out, "[")?;
    let mut first = true;
    for path in &files {
        let outcome = scan_file(path, opts.max_file_size, &opts.environment);
        write_outcome(out, outcome, &mut first, &mut stats)?;
    }
    write!(out, "]")?;
    Ok(stats)
}

/// 收集输入目录（单层）下文件名匹配的常规文件，按文件名排序
fn collect_files(input_dir: &Path, pattern: &Regex) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = vec![];
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = match entry { Ok(e) => e, Err(_) => continue };
        if !entry.file_type().is_file() { continue; }
        let matched = entry.file_name().to_str().is_some_and(|n| pattern.is_match(n));
        if matched { files.push(entry.into_path()); }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

/// 读取、解码并检测单个文件
fn scan_file(path: &Path, max_file_size: Option<u64>, env: &Environment) -> Outcome {
    let file_name = match path.file_name().and_then(|s| s.to_str()) { Some(s) => s, None => return Outcome::Skipped };
    if let Some(max) = max_file_size {
        if let Ok(md) = std::fs::metadata(path) {
            if md.len() > max {
                debug!(file = file_name, size = md.len(), "skipping oversized file");
                return Outcome::Skipped;
            }
        }
    }

    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(source) => {
            warn!("{}", HasbinError::Io { path: path.to_path_buf(), source });
            return Outcome::Failed;
        }
    };
    let value = match parse_json(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!(file = file_name, "{e}");
            return Outcome::Failed;
        }
    };

    let found = locate_binary(&value, env);
    debug!(file = file_name, has_binary = found.is_some(), "document scanned");
    Outcome::Scanned(OutputItem::new(file_name, found.as_ref()))
}

/// 按序写出单个结果并更新统计
fn write_outcome(out: &mut dyn Write, outcome: Outcome, first: &mut bool, stats: &mut ScanStats) -> Result<()> {
    match outcome {
        Outcome::Scanned(item) => {
            stats.files_scanned += 1;
            if item.has_binary { stats.files_with_binary += 1; }
            if !*first { write!(out, ",")?; } else { *first = false; }
            serde_json::to_writer(&mut *out, &item)?;
        }
        Outcome::Skipped => stats.files_skipped += 1,
        Outcome::Failed => stats.files_failed += 1,
    }
    Ok(())
}

/// 并行调度：
/// - 在后台线程内的 Rayon 线程池上逐文件解码、检测
/// - 单线程 Writer 按 idx 重排并流式写 JSON，保证稳定顺序
/// 值模型不可跨线程，因此只传递能力摘要，由各 worker 重建环境
fn scan_and_write_parallel(
    files: Vec<PathBuf>,
    out: &mut dyn Write,
    opts: &ScanOptions,
    stats: &mut ScanStats,
    threads: usize,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

    write!(out, "[")?;
    let mut first = true;

    let total = files.len();
    let (tx, rx) = channel::bounded::<(usize, Outcome)>(256);
    let caps: CapabilitySet = opts.environment.capabilities();
    let max_file_size = opts.max_file_size;

    let scan_thread = std::thread::spawn(move || {
        pool.install(|| {
            files.par_iter().enumerate().for_each_with(tx, |tx, (idx, path)| {
                let env = Environment::from(caps);
                // Receiver 仅在 writer 出错时提前关闭，此时结果已无处可写
                let _ = tx.send((idx, scan_file(path, max_file_size, &env)));
            });
        });
        // 结束后 Sender 全部被丢弃，Receiver 将收到关闭信号
    });

    let written = write_ordered(&rx, total, out, &mut first, stats);
    drop(rx);
    if scan_thread.join().is_err() {
        return Err(HasbinError::Worker("scan thread panicked".into()));
    }
    written?;

    write!(out, "]")?;
    Ok(())
}

/// Writer：维护 next_idx 与缓存，按序输出；通道关闭时必须恰好写完 `total` 项
fn write_ordered(
    rx: &crossbeam_channel::Receiver<(usize, Outcome)>,
    total: usize,
    out: &mut dyn Write,
    first: &mut bool,
    stats: &mut ScanStats,
) -> Result<()> {
    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, Outcome> = BTreeMap::new();
    while let Ok((idx, outcome)) = rx.recv() {
        buffer.insert(idx, outcome);
        while let Some(outcome) = buffer.remove(&next_idx) {
            write_outcome(out, outcome, first, stats)?;
            next_idx += 1;
        }
    }

    // 有 worker 未送达结果（通常是 panic），其后的结果都卡在缓存里
    if next_idx != total || !buffer.is_empty() {
        return Err(HasbinError::Worker(format!(
            "only {next_idx} of {total} results delivered ({} stranded)",
            buffer.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "1").unwrap();
        std::fs::write(dir.path().join("a.json"), "1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "1").unwrap();
        std::fs::create_dir(dir.path().join("sub.json")).unwrap();

        let files = collect_files(dir.path(), &Regex::new(r"\.json$").unwrap());
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap().to_string()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn scan_file_reports_path_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"bin": {"type": "Buffer", "data": [1]}}"#).unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{").unwrap();

        match scan_file(&good, None, &Environment::default()) {
            Outcome::Scanned(item) => assert_eq!(item.path.as_deref(), Some("$.bin")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(scan_file(&bad, None, &Environment::default()), Outcome::Failed));
        assert!(matches!(scan_file(&good, Some(1), &Environment::default()), Outcome::Skipped));
    }

    #[test]
    fn missing_result_fails_instead_of_truncating() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send((1, Outcome::Skipped)).unwrap();
        tx.send((2, Outcome::Failed)).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let mut first = true;
        let mut stats = ScanStats::default();
        let err = write_ordered(&rx, 3, &mut out, &mut first, &mut stats).unwrap_err();
        assert!(matches!(err, HasbinError::Worker(_)));
        assert!(err.to_string().contains("0 of 3"));
        assert_eq!(stats, ScanStats::default());
    }

    #[test]
    fn ordered_writer_reorders_out_of_order_results() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send((1, Outcome::Scanned(OutputItem::new("b.json", None)))).unwrap();
        tx.send((0, Outcome::Scanned(OutputItem::new("a.json", None)))).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let mut first = true;
        let mut stats = ScanStats::default();
        write_ordered(&rx, 2, &mut out, &mut first, &mut stats).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.find("a.json").unwrap() < text.find("b.json").unwrap());
        assert_eq!(stats.files_scanned, 2);
    }

    #[test]
    fn bad_pattern_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ScanOptions { name_pattern: "(".into(), ..ScanOptions::default() };
        let mut out = Vec::new();
        let err = scan_and_write(dir.path(), &mut out, &opts).unwrap_err();
        assert!(matches!(err, HasbinError::Pattern(_)));
    }
}
