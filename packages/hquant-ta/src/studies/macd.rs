//! MACD (移动平均收敛散度)
//!
//! MACD = MA(fast) - MA(slow)
//! Signal = MA(MACD, signal_period)
//! Histogram = MACD - Signal
//!
//! 三条均线可以是任意 [`MovingAverage`]，默认 EMA。

use super::ma::MaType;
use super::{MovingAverage, MultiStudy, Shape, Study, StudyMeta, StudyValue};
use crate::error::{check_arity, Result};

/// MACD 指标
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Box<dyn MovingAverage>,
    slow: Box<dyn MovingAverage>,
    signal: Box<dyn MovingAverage>,
}

impl Macd {
    /// 使用 EMA 创建 MACD (通常 12, 26, 9)
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        Self::with_type(fast, slow, signal, MaType::Ema)
    }

    /// 三条均线使用同一种类型
    pub fn with_type(fast: usize, slow: usize, signal: usize, ma: MaType) -> Result<Self> {
        Ok(Self::with_averages(ma.create(fast)?, ma.create(slow)?, ma.create(signal)?))
    }

    /// 直接给定三条均线，fast 周期大于 slow 时自动交换
    pub fn with_averages(
        fast: Box<dyn MovingAverage>,
        slow: Box<dyn MovingAverage>,
        signal: Box<dyn MovingAverage>,
    ) -> Self {
        let (fast, slow) = if slow.period() < fast.period() {
            (slow, fast)
        } else {
            (fast, slow)
        };
        tracing::debug!(
            fast = fast.period(),
            slow = slow.period(),
            signal = signal.period(),
            "creating MACD"
        );
        Self { fast, slow, signal }
    }

    /// 推进一个样本，返回 `(macd, signal, histogram)`
    #[inline]
    pub fn advance(&mut self, value: f64) -> (f64, f64, f64) {
        let macd = self.fast.update(value) - self.slow.update(value);
        let signal = self.signal.update(macd);
        (macd, signal, macd - signal)
    }
}

impl StudyMeta for Macd {
    fn name(&self) -> &'static str {
        "MACD"
    }

    fn warmup(&self) -> usize {
        self.fast
            .warmup()
            .max(self.slow.warmup())
            .max(self.signal.warmup())
    }
}

impl Study for Macd {
    /// 返回柱状图 (histogram)
    fn update(&mut self, value: f64) -> f64 {
        self.advance(value).2
    }

    /// 信号线周期
    fn period(&self) -> usize {
        self.signal.period()
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl MultiStudy for Macd {
    fn shape(&self) -> Shape {
        Shape::Triple
    }

    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        check_arity("MACD", 1, inputs.len())?;
        let (macd, signal, hist) = self.advance(inputs[0]);
        Ok(StudyValue::triple(macd, signal, hist))
    }

    fn scalar_lane(&self) -> usize {
        2
    }

    /// `[slow, fast, signal]`
    fn periods(&self) -> Vec<usize> {
        vec![self.slow.period(), self.fast.period(), self.signal.period()]
    }

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy> {
        Box::new(self.clone())
    }
}
