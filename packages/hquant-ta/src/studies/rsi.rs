//! 相对强弱指数 (RSI)
//!
//! RSI = 100 * 平均涨幅 / (平均涨幅 + 平均跌幅)
//!
//! 前 period 个差值取简单平均作为种子，之后使用 Wilder 平滑法。

use super::{MovingAverage, Study, StudyMeta, MIN_PERIOD};
use crate::error::{check_period, Result};

/// 无涨跌时的中性值
const NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
enum RsiStage {
    /// 第一个样本，只记录价格
    Seed,
    /// 累加前 period 个差值
    Accumulating { seen: usize },
    /// Wilder 平滑
    Smoothing,
}

/// 相对强弱指数
#[derive(Debug, Clone)]
pub struct Rsi {
    // 先对输入做一次平滑 (RSIExt)
    ext: Option<Box<dyn MovingAverage>>,
    stage: RsiStage,
    prev: f64,
    smooth_up: f64,
    smooth_down: f64,
    last: f64,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self> {
        check_period("RSI", period, MIN_PERIOD)?;
        Ok(Self::build(None, period))
    }

    /// 输入先经过指定均线，周期取均线的周期
    pub fn with_average(ma: Box<dyn MovingAverage>) -> Result<Self> {
        let period = ma.period();
        check_period("RSI", period, MIN_PERIOD)?;
        tracing::debug!(ma = ma.name(), period, "creating smoothed RSI");
        Ok(Self::build(Some(ma), period))
    }

    fn build(ext: Option<Box<dyn MovingAverage>>, period: usize) -> Self {
        Self {
            ext,
            stage: RsiStage::Seed,
            prev: 0.0,
            smooth_up: 0.0,
            smooth_down: 0.0,
            last: NEUTRAL,
            period,
        }
    }

    /// 是否为 RSIExt
    pub fn is_smoothed(&self) -> bool {
        self.ext.is_some()
    }
}

impl StudyMeta for Rsi {
    fn name(&self) -> &'static str {
        "RSI"
    }

    fn warmup(&self) -> usize {
        self.period
    }
}

impl Study for Rsi {
    fn update(&mut self, value: f64) -> f64 {
        let v = match self.ext.as_mut() {
            Some(ma) => ma.update(value),
            None => value,
        };
        let prev = self.prev;
        self.prev = v;

        let up = (v - prev).max(0.0);
        let down = (prev - v).max(0.0);
        let per = self.period as f64;

        self.stage = match self.stage {
            RsiStage::Seed => RsiStage::Accumulating { seen: 0 },
            RsiStage::Accumulating { seen } => {
                self.smooth_up += up;
                self.smooth_down += down;
                let seen = seen + 1;
                if seen == self.period {
                    self.smooth_up /= per;
                    self.smooth_down /= per;
                    RsiStage::Smoothing
                } else {
                    RsiStage::Accumulating { seen }
                }
            }
            RsiStage::Smoothing => {
                self.smooth_up += (up - self.smooth_up) / per;
                self.smooth_down += (down - self.smooth_down) / per;
                RsiStage::Smoothing
            }
        };

        let total = self.smooth_up + self.smooth_down;
        if total == 0.0 {
            return self.last;
        }
        self.last = 100.0 * self.smooth_up / total;
        self.last
    }

    fn period(&self) -> usize {
        self.period
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}
