//! 布林带指标
//!
//! 中轨默认为滚动均值，也可以换成任意移动平均线。
//! 上轨 = 中轨 + std * up，下轨 = 中轨 + std * down (down 为负)。

use super::ma::{MaFactory, MaType};
use super::variance::Variance;
use super::{MovingAverage, MultiStudy, Shape, Study, StudyMeta, StudyValue};
use crate::error::{check_arity, Result, StudyError};

/// 常用标准差倍数
pub const DEFAULT_WIDTH: f64 = 2.0;

/// 布林带指标
#[derive(Debug, Clone)]
pub struct Bollinger {
    std: Variance,
    // None 时中轨为 std 窗口的均值
    mid: Option<Box<dyn MovingAverage>>,
    up: f64,
    down: f64,
    period: usize,
}

impl Bollinger {
    /// 上下轨倍数 `±2`，中轨为均值
    pub fn standard(period: usize) -> Result<Self> {
        Self::new(period, DEFAULT_WIDTH, DEFAULT_WIDTH)
    }

    /// 自定义倍数，`down` 统一取负值
    pub fn new(period: usize, up: f64, down: f64) -> Result<Self> {
        Self::build(period, up, down, None)
    }

    /// 中轨使用指定类型的均线
    pub fn with_average(period: usize, up: f64, down: f64, ma: MaType) -> Result<Self> {
        Self::build(period, up, down, Some(ma.create(period)?))
    }

    /// 中轨由工厂按周期创建
    pub fn with_factory(period: usize, up: f64, down: f64, factory: &MaFactory) -> Result<Self> {
        Self::build(period, up, down, Some(factory(period)?))
    }

    fn build(period: usize, up: f64, down: f64, mid: Option<Box<dyn MovingAverage>>) -> Result<Self> {
        if !up.is_finite() || !down.is_finite() {
            return Err(StudyError::invalid_parameter(format!(
                "Bollinger widths must be finite, got up={} down={}",
                up, down
            )));
        }
        let std = Variance::std_dev(period)?;
        tracing::debug!(
            period,
            up,
            down,
            mid = ?mid.as_ref().map(|m| m.name()),
            "creating Bollinger bands"
        );
        Ok(Self {
            std,
            mid,
            up,
            down: if down > 0.0 { -down } else { down },
            period,
        })
    }

    /// 推进一个样本，返回 `(upper, mid, lower)`
    #[inline]
    pub fn advance(&mut self, value: f64) -> (f64, f64, f64) {
        let (_, sd, mean) = self.std.advance(value);
        let mid = match self.mid.as_mut() {
            Some(ma) => ma.update(value),
            None => mean,
        };
        (mid + sd * self.up, mid, mid + sd * self.down)
    }
}

impl StudyMeta for Bollinger {
    fn name(&self) -> &'static str {
        "BOLL"
    }

    fn warmup(&self) -> usize {
        let std = self.period - 1;
        match &self.mid {
            Some(ma) => std.max(ma.warmup()),
            None => std,
        }
    }
}

impl Study for Bollinger {
    /// 返回上轨
    fn update(&mut self, value: f64) -> f64 {
        self.advance(value).0
    }

    fn period(&self) -> usize {
        self.period
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl MultiStudy for Bollinger {
    fn shape(&self) -> Shape {
        Shape::Triple
    }

    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        check_arity("BOLL", 1, inputs.len())?;
        let (upper, mid, lower) = self.advance(inputs[0]);
        Ok(StudyValue::triple(upper, mid, lower))
    }

    fn periods(&self) -> Vec<usize> {
        vec![self.period; 3]
    }

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy> {
        Box::new(self.clone())
    }
}
