//! 数值序列
//!
//! `Series` 有两种模式:
//! - 普通模式: 追加增长，下标直接对应
//! - 定长模式: 内部为 [`RingBuffer`]，写满后覆盖最旧值
//!
//! 批量运算 (切片、map/reduce、逐元素运算、聚合) 见 [`ops`]。

pub mod ops;

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::common::{approx_eq, RingBuffer};
use crate::error::{Result, StudyError, MAX_PERIOD};

pub use ops::{average, hlc3};

#[derive(Debug, Clone)]
enum Storage {
    Plain(Vec<f64>),
    Capped(RingBuffer),
}

/// 有序数值序列
#[derive(Debug, Clone)]
pub struct Series {
    storage: Storage,
}

impl Default for Series {
    fn default() -> Self {
        Self::new()
    }
}

impl Series {
    /// 空的普通序列
    pub fn new() -> Self {
        Self {
            storage: Storage::Plain(Vec::new()),
        }
    }

    /// 预分配容量的普通序列
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Storage::Plain(Vec::with_capacity(capacity)),
        }
    }

    /// 定长序列 (环形缓冲区)
    pub fn capped(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_PERIOD {
            return Err(StudyError::invalid_parameter(format!(
                "capped series capacity must be within 1..={}, got {}",
                MAX_PERIOD, capacity
            )));
        }
        Ok(Self {
            storage: Storage::Capped(RingBuffer::new(capacity)),
        })
    }

    /// 从浮点数组构造，依次应用 `transform`
    pub fn from_fn<F>(values: &[f64], transform: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        values.iter().map(|v| transform(*v)).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Plain(v) => v.len(),
            Storage::Capped(rb) => rb.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 是否为定长模式
    #[inline]
    pub fn is_capped(&self) -> bool {
        matches!(self.storage, Storage::Capped(_))
    }

    /// 定长模式返回固定容量，普通模式返回当前分配的容量
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Plain(v) => v.capacity(),
            Storage::Capped(rb) => rb.capacity(),
        }
    }

    /// 获取指定索引的值 (0 = 最旧)，越界返回 `None`
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        match &self.storage {
            Storage::Plain(v) => v.get(index).copied(),
            Storage::Capped(rb) => rb.get(index),
        }
    }

    /// 支持负索引 (-1 = 最新)
    pub fn at(&self, index: isize) -> Option<f64> {
        let idx = if index < 0 {
            self.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.get(idx)
    }

    /// 覆盖指定索引的值
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        match &mut self.storage {
            Storage::Plain(v) => {
                let len = v.len();
                let slot = v
                    .get_mut(index)
                    .ok_or(StudyError::IndexOutOfBounds { index, len })?;
                *slot = value;
                Ok(())
            }
            Storage::Capped(rb) => rb.set(index, value),
        }
    }

    /// 追加一个值
    ///
    /// 定长模式已满时覆盖最旧值并返回它，其余情况返回 `None`。
    #[inline]
    pub fn push(&mut self, value: f64) -> Option<f64> {
        match &mut self.storage {
            Storage::Plain(v) => {
                v.push(value);
                None
            }
            Storage::Capped(rb) => rb.push(value),
        }
    }

    /// 批量追加
    pub fn extend_from_slice(&mut self, values: &[f64]) -> &mut Self {
        match &mut self.storage {
            Storage::Plain(v) => v.extend_from_slice(values),
            Storage::Capped(rb) => {
                for value in values {
                    rb.push(*value);
                }
            }
        }
        self
    }

    pub fn first(&self) -> Option<f64> {
        self.get(0)
    }

    pub fn last(&self) -> Option<f64> {
        self.at(-1)
    }

    /// 迭代器 (从旧到新)
    pub fn iter(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match &self.storage {
            Storage::Plain(v) => Box::new(v.iter().copied()),
            Storage::Capped(rb) => Box::new(rb.iter()),
        }
    }

    /// 按时间顺序复制出来
    pub fn to_vec(&self) -> Vec<f64> {
        match &self.storage {
            Storage::Plain(v) => v.clone(),
            Storage::Capped(rb) => rb.to_vec(),
        }
    }

    /// 普通模式下直接借出底层切片
    pub fn as_slice(&self) -> Option<&[f64]> {
        match &self.storage {
            Storage::Plain(v) => Some(v),
            Storage::Capped(_) => None,
        }
    }

    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Plain(v) => v.clear(),
            Storage::Capped(rb) => rb.clear(),
        }
    }

    /// 只保留最旧的 `len` 个值
    pub fn truncate(&mut self, len: usize) {
        match &mut self.storage {
            Storage::Plain(v) => v.truncate(len),
            Storage::Capped(rb) => {
                if len < rb.len() {
                    let kept: Vec<f64> = rb.iter().take(len).collect();
                    rb.clear();
                    for v in kept {
                        rb.push(v);
                    }
                }
            }
        }
    }

    /// 逐元素近似相等 (默认误差 1e-7)
    pub fn approx_eq(&self, other: &Series) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| approx_eq(a, b))
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Self {
            storage: Storage::Plain(values),
        }
    }
}

impl From<&[f64]> for Series {
    fn from(values: &[f64]) -> Self {
        Self::from(values.to_vec())
    }
}

impl From<Series> for Vec<f64> {
    fn from(series: Series) -> Self {
        match series.storage {
            Storage::Plain(v) => v,
            Storage::Capped(rb) => rb.to_vec(),
        }
    }
}

impl FromIterator<f64> for Series {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v)?,
                None => write!(f, "{}", v)?,
            }
        }
        f.write_str("]")
    }
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for v in self.iter() {
            seq.serialize_element(&v)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<f64>::deserialize(deserializer).map(Series::from)
    }
}
