//! 待扫描值模型（标签联合）
//!
//! 设计要点：
//! - 标量、函数、二进制叶子按值持有；数组与对象为共享句柄（`Rc<RefCell<..>>`），
//!   克隆句柄即共享同一节点，从而可以构造环形结构。
//! - 节点身份以 `Rc` 指针地址表示（见 `identity`），与结构相等无关。
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// 自定义转换钩子所在的属性名
pub const TO_JSON: &str = "toJSON";

/// 任意可扫描的值
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// 可调用值；作为普通成员扫描时视为非二进制
    Function(Function),
    /// 定长字节缓冲
    Buffer(Rc<[u8]>),
    /// 原始内存缓冲
    ArrayBuffer(Rc<[u8]>),
    /// Blob / File 类对象
    Blob(Blob),
    Array(Array),
    Object(Object),
}

/// Blob 的具体种类（File 是 Blob 的特化）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Blob,
    File,
}

/// Blob 类对象
#[derive(Debug, Clone)]
pub struct Blob {
    pub kind: BlobKind,
    pub data: Rc<[u8]>,
    pub mime: Option<String>,
    /// 仅 File 使用
    pub name: Option<String>,
}

/// 零参数钩子：入参为 `this`，返回替代值
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&Value) -> Value>);

impl Function {
    pub fn new(f: impl Fn(&Value) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// 以 `this` 调用钩子
    pub fn call(&self, this: &Value) -> Value {
        (self.0)(this)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function")
    }
}

/// 有序序列（共享句柄）
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

/// 键值映射（共享句柄）；键唯一，顺序不影响检测，这里按键排序以便路径稳定
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<BTreeMap<String, Value>>>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, v: impl Into<Value>) {
        self.0.borrow_mut().push(v.into());
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// 元素快照；被调用方独占借用时返回 None
    pub(crate) fn snapshot(&self) -> Option<Vec<Value>> {
        self.0.try_borrow().ok().map(|v| v.clone())
    }
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖属性（键唯一）
    pub fn insert(&self, key: impl Into<String>, v: impl Into<Value>) {
        self.0.borrow_mut().insert(key.into(), v.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().remove(key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// 可调用的 `toJSON` 钩子；非函数值（如字符串）不算钩子
    pub(crate) fn to_json_hook(&self) -> Option<Function> {
        match self.0.try_borrow().ok()?.get(TO_JSON) {
            Some(Value::Function(f)) => Some(f.clone()),
            _ => None,
        }
    }

    /// 属性快照；被调用方独占借用时返回 None
    pub(crate) fn snapshot(&self) -> Option<Vec<(String, Value)>> {
        let map = self.0.try_borrow().ok()?;
        Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl Value {
    pub fn buffer(bytes: impl AsRef<[u8]>) -> Self {
        Value::Buffer(Rc::from(bytes.as_ref()))
    }

    pub fn array_buffer(bytes: impl AsRef<[u8]>) -> Self {
        Value::ArrayBuffer(Rc::from(bytes.as_ref()))
    }

    pub fn blob(bytes: impl AsRef<[u8]>, mime: Option<&str>) -> Self {
        Value::Blob(Blob {
            kind: BlobKind::Blob,
            data: Rc::from(bytes.as_ref()),
            mime: mime.map(str::to_string),
            name: None,
        })
    }

    pub fn file(bytes: impl AsRef<[u8]>, name: &str, mime: Option<&str>) -> Self {
        Value::Blob(Blob {
            kind: BlobKind::File,
            data: Rc::from(bytes.as_ref()),
            mime: mime.map(str::to_string),
            name: Some(name.to_string()),
        })
    }

    /// 由若干元素构造数组
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let arr = Array::new();
        for v in items {
            arr.push(v);
        }
        Value::Array(arr)
    }

    /// 由若干键值对构造对象
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let obj = Object::new();
        for (k, v) in entries {
            obj.insert(k, v);
        }
        Value::Object(obj)
    }

    pub fn function(f: impl Fn(&Value) -> Value + 'static) -> Self {
        Value::Function(Function::new(f))
    }

    /// 是否与 `other` 为同一节点（仅容器有身份）
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// 简短类型名（日志与报告使用）
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Buffer(_) => "Buffer",
            Value::ArrayBuffer(_) => "ArrayBuffer",
            Value::Blob(b) => match b.kind {
                BlobKind::Blob => "Blob",
                BlobKind::File => "File",
            },
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Debug for Value {
    // 容器只打印长度，避免在环形结构上无限展开
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Function(_) => f.write_str("[Function]"),
            Value::Buffer(b) => write!(f, "<Buffer {} bytes>", b.len()),
            Value::ArrayBuffer(b) => write!(f, "ArrayBuffer {{ byteLength: {} }}", b.len()),
            Value::Blob(b) => write!(f, "{:?} {{ size: {} }}", b.kind, b.data.len()),
            Value::Array(a) => match a.0.try_borrow() {
                Ok(v) => write!(f, "[Array({})]", v.len()),
                Err(_) => f.write_str("[Array]"),
            },
            Value::Object(o) => match o.0.try_borrow() {
                Ok(m) => write!(f, "[Object({})]", m.len()),
                Err(_) => f.write_str("[Object]"),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloned_handles_share_identity() {
        let obj = Object::new();
        let alias = obj.clone();
        alias.insert("a", 1);
        assert_eq!(obj.len(), 1);
        assert!(obj.ptr_eq(&alias));
        assert_eq!(obj.identity(), alias.identity());
    }

    #[test]
    fn structurally_equal_objects_are_distinct() {
        let a = Value::object([("x", 1)]);
        let b = Value::object([("x", 1)]);
        assert!(!a.same_ref(&b));
        assert!(a.same_ref(&a.clone()));
    }

    #[test]
    fn non_callable_to_json_is_not_a_hook() {
        let obj = Object::new();
        obj.insert(TO_JSON, "{\"a\": \"a\"}");
        assert!(obj.to_json_hook().is_none());
        obj.insert(TO_JSON, Value::function(|_| Value::Null));
        assert!(obj.to_json_hook().is_some());
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let obj = Object::new();
        obj.insert("k", 1);
        obj.insert("k", "two");
        assert_eq!(obj.len(), 1);
        assert!(matches!(obj.get("k"), Some(Value::String(s)) if s == "two"));
    }

    #[test]
    fn debug_on_cycle_terminates() {
        let obj = Object::new();
        obj.insert("self", obj.clone());
        assert_eq!(format!("{:?}", Value::Object(obj)), "[Object(1)]");
    }
}
