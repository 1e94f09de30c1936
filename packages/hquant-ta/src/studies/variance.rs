//! 滚动均值 / 方差 / 标准差
//!
//! 每次更新都对窗口重新求和 (O(period))，不使用 running_sum。
//! variance = Σ(x − mean)² / n (两遍求和)。

use super::{MultiStudy, Shape, Study, StudyMeta, StudyValue, MIN_PERIOD};
use crate::common::RingBuffer;
use crate::error::{check_arity, check_period, Result};

/// 作为单值指标时输出哪一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceMode {
    Mean,
    Variance,
    StdDev,
}

impl VarianceMode {
    fn study_name(self) -> &'static str {
        match self {
            VarianceMode::Mean => "MEAN",
            VarianceMode::Variance => "VAR",
            VarianceMode::StdDev => "STDDEV",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Variance {
    window: RingBuffer,
    mode: VarianceMode,
    period: usize,
}

impl Variance {
    /// 方差 (多值输出为 `[variance, stddev, mean]`)
    pub fn new(period: usize) -> Result<Self> {
        Self::with_mode(period, VarianceMode::Variance)
    }

    /// 滚动均值
    pub fn mean(period: usize) -> Result<Self> {
        Self::with_mode(period, VarianceMode::Mean)
    }

    /// 滚动标准差
    pub fn std_dev(period: usize) -> Result<Self> {
        Self::with_mode(period, VarianceMode::StdDev)
    }

    pub fn with_mode(period: usize, mode: VarianceMode) -> Result<Self> {
        check_period(mode.study_name(), period, MIN_PERIOD)?;
        Ok(Self {
            window: RingBuffer::new(period),
            mode,
            period,
        })
    }

    pub fn mode(&self) -> VarianceMode {
        self.mode
    }

    /// 推进一个样本，返回 `(variance, stddev, mean)`
    #[inline]
    pub fn advance(&mut self, value: f64) -> (f64, f64, f64) {
        self.window.push(value);

        let n = self.window.len() as f64;
        let mean = self.window.iter().sum::<f64>() / n;
        let variance = self.window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (variance, variance.sqrt(), mean)
    }
}

impl StudyMeta for Variance {
    fn name(&self) -> &'static str {
        self.mode.study_name()
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }
}

impl Study for Variance {
    fn update(&mut self, value: f64) -> f64 {
        let (variance, std, mean) = self.advance(value);
        match self.mode {
            VarianceMode::Mean => mean,
            VarianceMode::Variance => variance,
            VarianceMode::StdDev => std,
        }
    }

    fn period(&self) -> usize {
        self.period
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl MultiStudy for Variance {
    fn shape(&self) -> Shape {
        Shape::Triple
    }

    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        check_arity(self.name(), 1, inputs.len())?;
        let (variance, std, mean) = self.advance(inputs[0]);
        Ok(StudyValue::triple(variance, std, mean))
    }

    fn scalar_lane(&self) -> usize {
        match self.mode {
            VarianceMode::Variance => 0,
            VarianceMode::StdDev => 1,
            VarianceMode::Mean => 2,
        }
    }

    fn periods(&self) -> Vec<usize> {
        vec![self.period]
    }

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy> {
        Box::new(self.clone())
    }
}
