//! 技术指标 (study)
//!
//! 每个指标都是一个有状态的增量计算对象:
//! - `update` 推进一个样本并返回当前值，O(1)
//! - `setup` 对历史数据逐个调用 `update`，去掉预热段后返回
//!
//! 指标的"形状"是一个封闭集合 ([`Shape`])：单值指标实现 [`Study`]，
//! 多值/多输入指标实现 [`MultiStudy`]，两者都支持的指标同时实现两个 trait。

mod apply;
mod boll;
mod locked;
mod ma;
mod macd;
mod minmax;
mod rsi;
mod staged;
mod variance;
mod vwap;

use std::fmt;
use std::ops::Index;

use crate::error::{check_arity, Result};

pub use apply::{apply_multi, apply_study, setup, setup_multi};
pub use boll::{Bollinger, DEFAULT_WIDTH};
pub use locked::Locked;
pub use ma::{Ema, MaFactory, MaType, Sma, Wma};
pub use macd::Macd;
pub use minmax::{Extremum, MinMax};
pub use rsi::Rsi;
pub use staged::{Dema, Tema};
pub use variance::{Variance, VarianceMode};
pub use vwap::{Vwap, VwapBands};

/// 所有指标允许的最小周期
pub const MIN_PERIOD: usize = 2;

/// 指标的公共信息
pub trait StudyMeta: Send + fmt::Debug {
    /// 指标名称 (日志用)
    fn name(&self) -> &'static str;

    /// 预热长度: `setup` 丢弃的前导输出个数
    fn warmup(&self) -> usize;
}

/// 单输入单输出指标
pub trait Study: StudyMeta {
    /// 推进一个样本，返回当前指标值
    fn update(&mut self, value: f64) -> f64;

    /// 创建时的周期
    fn period(&self) -> usize;

    /// 深拷贝当前状态
    fn boxed_clone(&self) -> Box<dyn Study>;

    /// 对历史数据批量计算，结果与逐个 `update` 完全一致
    fn setup(&mut self, input: &[f64]) -> Vec<f64> {
        setup(self, input)
    }
}

/// 移动平均线，可以互相替换 (MACD / 布林带 / DEMA 的组成部分)
pub trait MovingAverage: Study {
    fn clone_average(&self) -> Box<dyn MovingAverage>;

    /// 已收到至少 `period()` 个样本
    fn is_primed(&self) -> bool;
}

/// 多输入或多输出指标
pub trait MultiStudy: StudyMeta {
    /// 每个样本需要的输入个数
    fn arity(&self) -> usize {
        1
    }

    fn shape(&self) -> Shape;

    /// 推进一个样本，返回全部输出
    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue>;

    /// 归约为单值时使用的输出通道
    fn scalar_lane(&self) -> usize {
        0
    }

    /// 推进一个样本，只返回归约后的单值 (例如 VWAP、MACD 柱)
    fn update_scalar(&mut self, inputs: &[f64]) -> Result<f64> {
        let lane = self.scalar_lane();
        Ok(self.update_all(inputs)?[lane])
    }

    /// 内部各子指标的周期
    fn periods(&self) -> Vec<usize>;

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy>;

    /// 按列批量计算，每个输出通道一列，已去掉预热段
    fn setup_all(&mut self, inputs: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
        setup_multi(self, inputs)
    }
}

impl Clone for Box<dyn Study> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

impl Clone for Box<dyn MovingAverage> {
    fn clone(&self) -> Self {
        self.clone_average()
    }
}

impl Clone for Box<dyn MultiStudy> {
    fn clone(&self) -> Self {
        self.boxed_clone_multi()
    }
}

impl StudyMeta for Box<dyn Study> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn warmup(&self) -> usize {
        (**self).warmup()
    }
}

impl Study for Box<dyn Study> {
    fn update(&mut self, value: f64) -> f64 {
        (**self).update(value)
    }

    fn period(&self) -> usize {
        (**self).period()
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        (**self).boxed_clone()
    }
}

impl StudyMeta for Box<dyn MovingAverage> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn warmup(&self) -> usize {
        (**self).warmup()
    }
}

impl Study for Box<dyn MovingAverage> {
    fn update(&mut self, value: f64) -> f64 {
        (**self).update(value)
    }

    fn period(&self) -> usize {
        (**self).period()
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        (**self).boxed_clone()
    }
}

impl MovingAverage for Box<dyn MovingAverage> {
    fn clone_average(&self) -> Box<dyn MovingAverage> {
        (**self).clone_average()
    }

    fn is_primed(&self) -> bool {
        (**self).is_primed()
    }
}

impl StudyMeta for Box<dyn MultiStudy> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn warmup(&self) -> usize {
        (**self).warmup()
    }
}

impl MultiStudy for Box<dyn MultiStudy> {
    fn arity(&self) -> usize {
        (**self).arity()
    }

    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        (**self).update_all(inputs)
    }

    fn scalar_lane(&self) -> usize {
        (**self).scalar_lane()
    }

    fn periods(&self) -> Vec<usize> {
        (**self).periods()
    }

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy> {
        (**self).boxed_clone_multi()
    }
}

/// 输出形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Shape {
    Scalar = 1,
    Pair = 2,
    Triple = 3,
}

impl Shape {
    /// 输出通道数
    #[inline]
    pub fn lanes(self) -> usize {
        self as usize
    }
}

/// 定长的小向量输出
#[derive(Debug, Clone, Copy)]
pub struct StudyValue {
    shape: Shape,
    lanes: [f64; 3],
}

impl StudyValue {
    pub fn scalar(v: f64) -> Self {
        Self {
            shape: Shape::Scalar,
            lanes: [v, f64::NAN, f64::NAN],
        }
    }

    pub fn pair(a: f64, b: f64) -> Self {
        Self {
            shape: Shape::Pair,
            lanes: [a, b, f64::NAN],
        }
    }

    pub fn triple(a: f64, b: f64, c: f64) -> Self {
        Self {
            shape: Shape::Triple,
            lanes: [a, b, c],
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn get(&self, lane: usize) -> Option<f64> {
        self.as_slice().get(lane).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.lanes[..self.shape.lanes()]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }
}

impl PartialEq for StudyValue {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Index<usize> for StudyValue {
    type Output = f64;

    fn index(&self, lane: usize) -> &f64 {
        &self.as_slice()[lane]
    }
}

/// 配置构建出来的指标：单值或多值
#[derive(Debug, Clone)]
pub enum AnyStudy {
    Scalar(Box<dyn Study>),
    Multi(Box<dyn MultiStudy>),
}

impl AnyStudy {
    pub fn name(&self) -> &'static str {
        match self {
            AnyStudy::Scalar(s) => s.name(),
            AnyStudy::Multi(s) => s.name(),
        }
    }

    pub fn warmup(&self) -> usize {
        match self {
            AnyStudy::Scalar(s) => s.warmup(),
            AnyStudy::Multi(s) => s.warmup(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            AnyStudy::Scalar(_) => 1,
            AnyStudy::Multi(s) => s.arity(),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            AnyStudy::Scalar(_) => Shape::Scalar,
            AnyStudy::Multi(s) => s.shape(),
        }
    }

    /// 统一的推进接口
    pub fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        match self {
            AnyStudy::Scalar(s) => {
                check_arity(s.name(), 1, inputs.len())?;
                Ok(StudyValue::scalar(s.update(inputs[0])))
            }
            AnyStudy::Multi(s) => s.update_all(inputs),
        }
    }

    /// 统一的批量接口，每个输出通道一列
    pub fn setup_all(&mut self, inputs: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
        match self {
            AnyStudy::Scalar(s) => {
                check_arity(s.name(), 1, inputs.len())?;
                Ok(vec![s.setup(inputs[0])])
            }
            AnyStudy::Multi(s) => s.setup_all(inputs),
        }
    }

    pub fn as_scalar(&mut self) -> Option<&mut dyn Study> {
        match self {
            AnyStudy::Scalar(s) => Some(s.as_mut()),
            AnyStudy::Multi(_) => None,
        }
    }

    pub fn as_multi(&mut self) -> Option<&mut dyn MultiStudy> {
        match self {
            AnyStudy::Scalar(_) => None,
            AnyStudy::Multi(s) => Some(s.as_mut()),
        }
    }
}
