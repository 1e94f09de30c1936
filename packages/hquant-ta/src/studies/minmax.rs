//! 滚动最小值 / 最大值
//!
//! 每次更新重新扫描窗口 (O(period))。

use super::{MultiStudy, Shape, Study, StudyMeta, StudyValue, MIN_PERIOD};
use crate::common::RingBuffer;
use crate::error::{check_arity, check_period, Result};

/// 作为单值指标时输出哪一端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
    /// 单值输出最小值，多值输出 `[min, max]`
    Both,
}

#[derive(Debug, Clone)]
pub struct MinMax {
    window: RingBuffer,
    extremum: Extremum,
    period: usize,
}

impl MinMax {
    pub fn new(period: usize) -> Result<Self> {
        Self::with_extremum(period, Extremum::Both)
    }

    pub fn min(period: usize) -> Result<Self> {
        Self::with_extremum(period, Extremum::Min)
    }

    pub fn max(period: usize) -> Result<Self> {
        Self::with_extremum(period, Extremum::Max)
    }

    pub fn with_extremum(period: usize, extremum: Extremum) -> Result<Self> {
        check_period(extremum.study_name(), period, MIN_PERIOD)?;
        Ok(Self {
            window: RingBuffer::new(period),
            extremum,
            period,
        })
    }

    /// 推进一个样本，返回 `(min, max)`
    #[inline]
    pub fn advance(&mut self, value: f64) -> (f64, f64) {
        self.window.push(value);
        (
            self.window.min().unwrap_or(value),
            self.window.max().unwrap_or(value),
        )
    }
}

impl Extremum {
    fn study_name(self) -> &'static str {
        match self {
            Extremum::Min => "MIN",
            Extremum::Max => "MAX",
            Extremum::Both => "MINMAX",
        }
    }
}

impl StudyMeta for MinMax {
    fn name(&self) -> &'static str {
        self.extremum.study_name()
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }
}

impl Study for MinMax {
    fn update(&mut self, value: f64) -> f64 {
        let (lo, hi) = self.advance(value);
        match self.extremum {
            Extremum::Max => hi,
            Extremum::Min | Extremum::Both => lo,
        }
    }

    fn period(&self) -> usize {
        self.period
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl MultiStudy for MinMax {
    fn shape(&self) -> Shape {
        Shape::Pair
    }

    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        check_arity(self.name(), 1, inputs.len())?;
        let (lo, hi) = self.advance(inputs[0]);
        Ok(StudyValue::pair(lo, hi))
    }

    fn scalar_lane(&self) -> usize {
        match self.extremum {
            Extremum::Max => 1,
            Extremum::Min | Extremum::Both => 0,
        }
    }

    fn periods(&self) -> Vec<usize> {
        vec![self.period]
    }

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_min_max() {
        let input = [5.0, 3.0, 8.0, 1.0, 4.0, 6.0, 7.0];
        let mut mm = MinMax::new(3).unwrap();
        let out: Vec<Vec<f64>> = input.iter().map(|v| mm.update_all(&[*v]).unwrap().to_vec()).collect();

        assert_eq!(out[0], vec![5.0, 5.0]);
        assert_eq!(out[2], vec![3.0, 8.0]);
        assert_eq!(out[3], vec![1.0, 8.0]);
        assert_eq!(out[5], vec![1.0, 6.0]);
        assert_eq!(out[6], vec![4.0, 7.0]);
    }

    #[test]
    fn test_scalar_modes() {
        let input = [5.0, 3.0, 8.0, 1.0];
        let mut lo = MinMax::min(2).unwrap();
        let mut hi = MinMax::max(2).unwrap();
        let lows: Vec<f64> = input.iter().map(|v| lo.update(*v)).collect();
        let highs: Vec<f64> = input.iter().map(|v| hi.update(*v)).collect();
        assert_eq!(lows, vec![5.0, 3.0, 3.0, 1.0]);
        assert_eq!(highs, vec![5.0, 5.0, 8.0, 8.0]);
        assert_eq!(hi.name(), "MAX");
    }

    #[test]
    fn test_invalid() {
        assert!(MinMax::max(1).is_err());
        let mut mm = MinMax::new(2).unwrap();
        assert!(mm.update_all(&[]).is_err());
    }
}
