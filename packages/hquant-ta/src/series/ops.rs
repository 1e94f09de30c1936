//! 批量序列运算
//!
//! 所有返回新序列的运算都按时间顺序输出普通序列 (非定长)。

use super::Series;
use crate::error::{Result, StudyError};

impl Series {
    /// `[start, end)` 区间拷贝，越界部分被截断
    pub fn slice(&self, start: usize, end: usize) -> Series {
        let end = end.min(self.len());
        let start = start.min(end);
        self.iter().skip(start).take(end - start).collect()
    }

    /// 最新的 `n` 个值
    pub fn tail(&self, n: usize) -> Series {
        let len = self.len();
        self.slice(len.saturating_sub(n), len)
    }

    pub fn map<F>(&self, f: F) -> Series
    where
        F: Fn(f64) -> f64,
    {
        self.iter().map(f).collect()
    }

    /// 原地变换，保留定长模式
    pub fn map_in_place<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(f64) -> f64,
    {
        let mapped: Vec<f64> = self.iter().map(f).collect();
        self.replace_values(mapped);
        self
    }

    pub fn reduce<F>(&self, init: f64, f: F) -> f64
    where
        F: Fn(f64, f64) -> f64,
    {
        self.iter().fold(init, f)
    }

    /// 逐元素二元运算，长度必须一致
    pub fn zip_with<F>(&self, other: &Series, f: F) -> Result<Series>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.len() != other.len() {
            return Err(StudyError::length_mismatch(self.len(), other.len()));
        }
        Ok(self.iter().zip(other.iter()).map(|(a, b)| f(a, b)).collect())
    }

    pub fn add(&self, other: &Series) -> Result<Series> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Series) -> Result<Series> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &Series) -> Result<Series> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn div(&self, other: &Series) -> Result<Series> {
        self.zip_with(other, |a, b| a / b)
    }

    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// 均值，空序列为 NaN
    pub fn avg(&self) -> f64 {
        if self.is_empty() {
            return f64::NAN;
        }
        self.sum() / self.len() as f64
    }

    /// 最小值及其下标 (相同值取最早的)
    pub fn min(&self) -> Option<(usize, f64)> {
        self.iter()
            .enumerate()
            .fold(None, |acc, (i, v)| match acc {
                Some((_, m)) if m <= v => acc,
                _ => Some((i, v)),
            })
    }

    /// 最大值及其下标 (相同值取最早的)
    pub fn max(&self) -> Option<(usize, f64)> {
        self.iter()
            .enumerate()
            .fold(None, |acc, (i, v)| match acc {
                Some((_, m)) if m >= v => acc,
                _ => Some((i, v)),
            })
    }

    pub fn min_value(&self) -> Option<f64> {
        self.min().map(|(_, v)| v)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.max().map(|(_, v)| v)
    }

    fn last_two(&self) -> Result<(f64, f64)> {
        match (self.at(-2), self.at(-1)) {
            (Some(prev), Some(last)) => Ok((prev, last)),
            _ => Err(StudyError::insufficient_data(2, self.len())),
        }
    }

    /// 上穿: 上一根 `<=` 对方，最新一根 `>` 对方
    pub fn crossover(&self, other: &Series) -> Result<bool> {
        let (prev, last) = self.last_two()?;
        let (o_prev, o_last) = other.last_two()?;
        Ok(prev <= o_prev && last > o_last)
    }

    /// 下穿: 上一根 `>` 对方，最新一根 `<=` 对方
    pub fn crossunder(&self, other: &Series) -> Result<bool> {
        let (prev, last) = self.last_two()?;
        let (o_prev, o_last) = other.last_two()?;
        Ok(last <= o_last && prev > o_prev)
    }

    /// 从 `start` 开始把 `count` 个值设为 `value` (超出部分忽略)
    pub fn fill(&mut self, start: usize, count: usize, value: f64) -> &mut Self {
        let end = start.saturating_add(count).min(self.len());
        let mut values = self.to_vec();
        if start < end {
            values[start..end].fill(value);
        }
        self.replace_values(values);
        self
    }

    pub fn reverse(&mut self) -> &mut Self {
        let mut values = self.to_vec();
        values.reverse();
        self.replace_values(values);
        self
    }

    /// 分组聚合
    ///
    /// `pred(i, v)` 为真时，当前组 (含第 i 个值) 结束并用 `agg` 聚合；
    /// 剩余的尾部单独成组。
    pub fn group_by<P, A>(&self, pred: P, agg: A) -> Series
    where
        P: Fn(usize, f64) -> bool,
        A: Fn(&[f64]) -> f64,
    {
        self.segments(pred).iter().map(|seg| agg(seg.as_slice())).collect()
    }

    /// 按条件切分，切分规则同 [`Series::group_by`]
    pub fn split_by<P>(&self, pred: P) -> Vec<Series>
    where
        P: Fn(usize, f64) -> bool,
    {
        self.segments(pred).into_iter().map(Series::from).collect()
    }

    /// 按固定长度切分，最后一段可能较短
    pub fn split(&self, segment: usize) -> Result<Vec<Series>> {
        if segment == 0 {
            return Err(StudyError::invalid_parameter("split segment must be > 0"));
        }
        let n = segment - 1;
        Ok(self.split_by(|i, _| i % segment == n))
    }

    fn segments<P>(&self, pred: P) -> Vec<Vec<f64>>
    where
        P: Fn(usize, f64) -> bool,
    {
        let values = self.to_vec();
        let mut out = Vec::new();
        let mut last = 0;
        for (i, v) in values.iter().enumerate() {
            if pred(i, *v) {
                out.push(values[last..=i].to_vec());
                last = i + 1;
            }
        }
        if last < values.len() {
            out.push(values[last..].to_vec());
        }
        out
    }

    fn replace_values(&mut self, values: Vec<f64>) {
        if self.is_capped() {
            self.clear();
            self.extend_from_slice(&values);
        } else {
            *self = Series::from(values);
        }
    }
}

macro_rules! math_transforms {
    ($($(#[$doc:meta])* $name:ident => $f:path;)*) => {
        impl Series {
            $(
                $(#[$doc])*
                pub fn $name(&self) -> Series {
                    self.map($f)
                }
            )*
        }
    };
}

math_transforms! {
    acos => f64::acos;
    asin => f64::asin;
    atan => f64::atan;
    ceil => f64::ceil;
    cos => f64::cos;
    cosh => f64::cosh;
    exp => f64::exp;
    floor => f64::floor;
    /// 自然对数
    ln => f64::ln;
    log10 => f64::log10;
    sin => f64::sin;
    sinh => f64::sinh;
    sqrt => f64::sqrt;
    tan => f64::tan;
    tanh => f64::tanh;
}

/// 多个序列逐元素求平均
///
/// 输出长度为最长输入的长度，较短序列缺失的位置按 0 计。
pub fn average(series: &[&Series]) -> Series {
    let len = series.iter().map(|s| s.len()).max().unwrap_or(0);
    if series.is_empty() {
        return Series::new();
    }
    let n = series.len() as f64;
    (0..len)
        .map(|i| series.iter().filter_map(|s| s.get(i)).sum::<f64>() / n)
        .collect()
}

/// (high + low + close) / 3
pub fn hlc3(high: &Series, low: &Series, close: &Series) -> Series {
    average(&[high, low, close])
}
