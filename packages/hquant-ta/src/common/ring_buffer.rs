//! 高性能环形缓冲区
//!
//! 特性:
//! - 固定容量，零分配
//! - O(1) push/get 操作
//! - push 返回被挤出的最旧值，便于调用方维护滚动和
//! - 内置 running_sum，O(1) 求和/均值 (Neumaier 补偿求和)

use crate::common::float::approx_eq;
use crate::error::{Result, StudyError};

/// 高性能环形缓冲区
///
/// 逻辑下标 0 为最旧值。写满之前逻辑下标就是物理下标；写满之后，
/// 逻辑下标 `i` 对应物理位置 `(cursor + i + 1) % capacity`，
/// 其中 `cursor` 是最近一次写入的位置 (即 `head - 1`)。
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<f64>,
    capacity: usize,
    head: usize,       // 下一个写入位置
    len: usize,        // 当前长度
    running_sum: f64,  // 用于 O(1) 均值计算
    compensation: f64, // running_sum 丢失的低位
}

impl RingBuffer {
    /// 创建指定容量的环形缓冲区
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            data: vec![0.0; capacity],
            capacity,
            head: 0,
            len: 0,
            running_sum: 0.0,
            compensation: 0.0,
        }
    }

    /// 补偿累加，大值进出窗口后求和仍然准确
    #[inline]
    fn accumulate(&mut self, value: f64) {
        let t = self.running_sum + value;
        if self.running_sum.abs() >= value.abs() {
            self.compensation += (self.running_sum - t) + value;
        } else {
            self.compensation += (value - t) + self.running_sum;
        }
        self.running_sum = t;
    }

    /// 添加值到缓冲区
    ///
    /// 未满时追加并返回 `None`；已满时覆盖最旧的值并返回它。
    #[inline]
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.len == self.capacity {
            let old = self.data[self.head];
            self.accumulate(-old);
            Some(old)
        } else {
            self.len += 1;
            None
        };

        self.data[self.head] = value;
        self.accumulate(value);
        self.head = (self.head + 1) % self.capacity;
        evicted
    }

    /// 逻辑下标 -> 物理下标
    #[inline]
    fn physical(&self, index: usize) -> usize {
        debug_assert!(index < self.len);
        (self.head + self.capacity - self.len + index) % self.capacity
    }

    /// 获取指定索引的值 (0 = 最旧)，越界返回 `None`
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.len {
            return None;
        }
        Some(self.data[self.physical(index)])
    }

    /// 支持负索引 (-1 = 最新)
    #[inline]
    pub fn at(&self, index: isize) -> Option<f64> {
        let idx = if index < 0 {
            self.len.checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.get(idx)
    }

    /// 覆盖指定索引的值
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        if index >= self.len {
            return Err(StudyError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let idx = self.physical(index);
        let old = self.data[idx];
        self.accumulate(-old);
        self.accumulate(value);
        self.data[idx] = value;
        Ok(())
    }

    /// 获取最新值
    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.at(-1)
    }

    /// 获取最旧值
    #[inline]
    pub fn first(&self) -> Option<f64> {
        self.get(0)
    }

    /// 获取累计和 (O(1))
    #[inline]
    pub fn sum(&self) -> f64 {
        self.running_sum + self.compensation
    }

    /// 获取均值 (O(1))
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.len == 0 {
            f64::NAN
        } else {
            self.sum() / self.len as f64
        }
    }

    /// 窗口最小值 (O(n))
    pub fn min(&self) -> Option<f64> {
        self.iter().reduce(f64::min)
    }

    /// 窗口最大值 (O(n))
    pub fn max(&self) -> Option<f64> {
        self.iter().reduce(f64::max)
    }

    /// 当前长度
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 是否已满
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// 容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 清空缓冲区
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.running_sum = 0.0;
        self.compensation = 0.0;
    }

    /// 迭代器 (从旧到新)
    pub fn iter(&self) -> RingBufferIter<'_> {
        RingBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// 按时间顺序复制出来
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// 逐元素近似相等
    pub fn approx_eq(&self, other: &RingBuffer) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| approx_eq(a, b))
    }
}

/// 环形缓冲区迭代器
pub struct RingBufferIter<'a> {
    buffer: &'a RingBuffer,
    index: usize,
}

impl<'a> Iterator for RingBufferIter<'a> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let val = self.buffer.get(self.index)?;
        self.index += 1;
        Some(val)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.buffer.len - self.index.min(self.buffer.len);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for RingBufferIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut buf = RingBuffer::new(3);
        assert_eq!(buf.push(1.0), None);
        assert_eq!(buf.push(2.0), None);
        assert_eq!(buf.push(3.0), None);

        assert_eq!(buf.get(0), Some(1.0)); // 最旧
        assert_eq!(buf.at(-1), Some(3.0)); // 最新
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.get(3), None);
        assert_eq!(buf.at(-4), None);
    }

    #[test]
    fn test_overflow_returns_evicted() {
        let mut buf = RingBuffer::new(3);
        buf.push(1.0);
        buf.push(2.0);
        buf.push(3.0);
        assert_eq!(buf.push(4.0), Some(1.0)); // 覆盖 1.0
        assert_eq!(buf.push(5.0), Some(2.0));

        assert_eq!(buf.first(), Some(3.0));
        assert_eq!(buf.last(), Some(5.0));
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_capacity_invariant() {
        // 推入 N+k 个值后，只保留最后 N 个且按时间顺序
        for k in 1..20 {
            let n = 5;
            let mut buf = RingBuffer::new(n);
            for i in 0..(n + k) {
                buf.push(i as f64);
            }
            let expected: Vec<f64> = (k..n + k).map(|i| i as f64).collect();
            assert_eq!(buf.to_vec(), expected);
            for (i, v) in expected.iter().enumerate() {
                assert_eq!(buf.get(i), Some(*v));
            }
        }
    }

    #[test]
    fn test_running_sum() {
        let mut buf = RingBuffer::new(3);
        buf.push(1.0);
        buf.push(2.0);
        buf.push(3.0);
        assert_eq!(buf.sum(), 6.0);
        assert_eq!(buf.mean(), 2.0);

        buf.push(4.0); // 覆盖 1.0, sum = 2+3+4 = 9
        assert_eq!(buf.sum(), 9.0);
        assert_eq!(buf.mean(), 3.0);
    }

    #[test]
    fn test_sum_after_large_value_leaves() {
        let mut buf = RingBuffer::new(3);
        buf.push(1e12 + 0.3);
        for v in [100.1, 100.2, 100.3, 100.4] {
            buf.push(v);
        }
        let direct: f64 = buf.iter().sum();
        assert!(approx_eq(buf.sum(), direct), "{} != {}", buf.sum(), direct);
        assert!(approx_eq(buf.mean(), direct / 3.0));
    }

    #[test]
    fn test_approx_eq() {
        let mut a = RingBuffer::new(3);
        let mut b = RingBuffer::new(5);
        for v in [1.0, 2.0, 3.0, 4.0] {
            a.push(v);
        }
        for v in [2.0, 3.0 + 1e-9, 4.0] {
            b.push(v);
        }
        assert!(a.approx_eq(&b));

        b.push(5.0);
        assert!(!a.approx_eq(&b));

        let mut c = RingBuffer::new(3);
        for v in [2.0, 3.1, 4.0] {
            c.push(v);
        }
        assert!(!a.approx_eq(&c));
    }

    #[test]
    fn test_set() {
        let mut buf = RingBuffer::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            buf.push(v);
        }
        buf.set(0, 10.0).unwrap(); // 2 -> 10
        assert_eq!(buf.to_vec(), vec![10.0, 3.0, 4.0]);
        assert_eq!(buf.sum(), 17.0);
        assert!(matches!(
            buf.set(3, 1.0),
            Err(StudyError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_min_max_and_clear() {
        let mut buf = RingBuffer::new(3);
        assert_eq!(buf.min(), None);
        for v in [5.0, 1.0, 3.0, 4.0] {
            buf.push(v);
        }
        assert_eq!(buf.min(), Some(1.0));
        assert_eq!(buf.max(), Some(4.0));

        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.mean().is_nan());
    }
}
