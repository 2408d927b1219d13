//! 二进制检测主流程
//!
//! 以显式工作栈代替递归：深度优先、自左向右，访问顺序与递归版本一致，
//! 任意深度的（无环）结构也不会耗尽调用栈。
//! 已访问集合按节点身份（指针地址）记录，仅在单次调用内有效。
//! 布尔判定不记录路径；定位时每个节点只在路径表里存一条“父节点 + 片段”，
//! 命中后再回溯出完整路径，两者都是线性开销。
use std::collections::HashSet;

use tracing::trace;

use crate::capabilities::{BinaryKind, Environment};
use crate::findings::{BinaryMatch, PathSegment};
use crate::value::Value;

/// 在默认环境下判定 `value` 中是否含有二进制数据
pub fn contains_binary(value: &Value) -> bool {
    contains_binary_in(value, &Environment::default())
}

/// 在给定环境下判定 `value` 中是否含有二进制数据
pub fn contains_binary_in(value: &Value, env: &Environment) -> bool {
    walk(value, env, (), |_, _| ()).is_some()
}

/// 查找首个二进制叶子（文档顺序），返回其种类与路径
pub fn locate_binary(value: &Value, env: &Environment) -> Option<BinaryMatch> {
    // 路径表：(父节点下标, 片段)；None 表示根
    let mut links: Vec<(Option<usize>, PathSegment)> = Vec::new();
    let (kind, node) = walk(value, env, None, |parent: &Option<usize>, seg| {
        links.push((*parent, seg));
        Some(links.len() - 1)
    })?;

    let mut path = Vec::new();
    let mut cur = node;
    while let Some(idx) = cur {
        let (parent, seg) = &links[idx];
        path.push(seg.clone());
        cur = *parent;
    }
    path.reverse();
    Some(BinaryMatch { kind, path })
}

/// 工作栈遍历；`child` 由父节点标记和片段生成子节点标记
fn walk<P>(
    value: &Value,
    env: &Environment,
    root: P,
    mut child: impl FnMut(&P, PathSegment) -> P,
) -> Option<(BinaryKind, P)> {
    let mut visited: HashSet<usize> = HashSet::new();
    // 第三项：该值是否为钩子的返回值（其自身钩子不再调用）
    let mut stack: Vec<(Value, P, bool)> = vec![(value.clone(), root, false)];

    while let Some((value, mark, from_hook)) = stack.pop() {
        if let Some(kind) = env.binary_kind(&value) {
            return Some((kind, mark));
        }

        match &value {
            Value::Array(arr) => {
                if !visited.insert(arr.identity()) {
                    continue;
                }
                let Some(items) = arr.snapshot() else { continue };
                // 逆序压栈，保证自左向右弹出
                for (i, item) in items.into_iter().enumerate().rev() {
                    let m = child(&mark, PathSegment::Index(i));
                    stack.push((item, m, false));
                }
            }
            Value::Object(obj) => {
                if !visited.insert(obj.identity()) {
                    continue;
                }
                // 钩子只在首次访问时调用，之后该对象已在 visited 中
                if !from_hook {
                    if let Some(hook) = obj.to_json_hook() {
                        let converted = hook.call(&value);
                        trace!(result = converted.type_name(), "toJSON hook invoked");
                        // 返回自身：该节点不再贡献任何二进制
                        if !converted.same_ref(&value) {
                            let m = child(&mark, PathSegment::ToJson);
                            stack.push((converted, m, true));
                        }
                        continue;
                    }
                }
                let Some(entries) = obj.snapshot() else { continue };
                for (key, item) in entries.into_iter().rev() {
                    let m = child(&mark, PathSegment::Key(key));
                    stack.push((item, m, false));
                }
            }
            // 缺省值、标量、函数与不被承认的叶子
            _ => {}
        }
    }

    None
}
