//! Ordered arrays keyed by integers or strings.
//!
//! Iteration always follows insertion order, never key order. Integer keys
//! drive an auto-increment cursor (`next_index`) used by `push`: it is one
//! past the largest integer key ever inserted, never below zero, and never
//! decreases (removals do not rewind it).

use std::fmt;

use rustc_hash::FxHashMap;

use crate::value::{Heap, Value};

/// Key of an array entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayKey {
    Int(i64),
    Str(Heap<str>),
}

impl ArrayKey {
    /// Build a string key, normalizing canonical decimal integers to `Int`.
    ///
    /// `"7"` and `"-3"` become integer keys; `"07"`, `"+7"`, `"-0"` and
    /// out-of-range digit strings stay strings.
    pub fn string(s: &str) -> Self {
        match parse_canonical_int(s) {
            Some(n) => ArrayKey::Int(n),
            None => ArrayKey::Str(Heap::from_string(s.to_owned())),
        }
    }

    /// Convert a value used as an array offset into a key.
    ///
    /// Returns `None` for values that cannot be used as keys (arrays,
    /// objects, generators).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(ArrayKey::Int(*n)),
            Value::Str(s) => Some(ArrayKey::string(s)),
            Value::Bool(b) => Some(ArrayKey::Int(i64::from(*b))),
            Value::Null => Some(ArrayKey::string("")),
            Value::Float(f) if f.is_finite() => Some(ArrayKey::Int(truncate_float(*f))),
            Value::Resource(r) => i64::try_from(r.id()).ok().map(ArrayKey::Int),
            Value::Reference(cell) => ArrayKey::from_value(&cell.get()),
            _ => None,
        }
    }

    /// The key as a runtime value.
    pub fn to_value(&self) -> Value {
        match self {
            ArrayKey::Int(n) => Value::Int(*n),
            ArrayKey::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl From<i64> for ArrayKey {
    fn from(n: i64) -> Self {
        ArrayKey::Int(n)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey::string(s)
    }
}

impl fmt::Debug for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(n) => write!(f, "{n}"),
            ArrayKey::Str(s) => write!(f, "{:?}", &**s),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(n) => write!(f, "{n}"),
            ArrayKey::Str(s) => write!(f, "{s}"),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "float offsets truncate toward zero, saturating at the i64 bounds"
)]
fn truncate_float(f: f64) -> i64 {
    f.trunc() as i64
}

fn parse_canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let first = *digits.as_bytes().first()?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if first == b'0' && (digits.len() > 1 || s.starts_with('-')) {
        return None;
    }
    s.parse().ok()
}

/// Ordered mapping from `ArrayKey` to `Value`.
#[derive(Clone, Default)]
pub struct Array {
    entries: Vec<(ArrayKey, Value)>,
    index: FxHashMap<ArrayKey, usize>,
    next_index: i64,
}

impl Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the array has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key the next `push` will use, or `None` once the cursor is exhausted.
    pub fn next_index(&self) -> Option<i64> {
        (self.next_index != i64::MAX || !self.index.contains_key(&ArrayKey::Int(i64::MAX)))
            .then_some(self.next_index)
    }

    /// Append `value` under the next auto-increment key.
    ///
    /// Returns the key used, or `None` when no integer key is left.
    pub fn push(&mut self, value: Value) -> Option<i64> {
        let key = self.next_index()?;
        self.insert(ArrayKey::Int(key), value);
        Some(key)
    }

    /// Insert or overwrite an entry.
    ///
    /// Overwriting keeps the entry's original position.
    pub fn insert(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Int(n) = key {
            if n >= self.next_index {
                self.next_index = n.saturating_add(1);
            }
        }
        if let Some(&pos) = self.index.get(&key) {
            self.entries[pos].1 = value;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
        }
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Whether an entry exists for `key`.
    pub fn contains_key(&self, key: &ArrayKey) -> bool {
        self.index.contains_key(key)
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &ArrayKey) -> Option<Value> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(k) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut array = Array::new();
        for value in iter {
            // A fresh array cannot exhaust the i64 key space.
            let _ = array.push(value);
        }
        array
    }
}

impl FromIterator<(ArrayKey, Value)> for Array {
    fn from_iter<I: IntoIterator<Item = (ArrayKey, Value)>>(iter: I) -> Self {
        let mut array = Array::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}
