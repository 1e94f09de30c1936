//! 浮点数组一次性计算
//!
//! 每个函数创建一个新的指标，对整个数组运行 `setup`，结果已去掉预热段。

use crate::error::Result;
use crate::studies::{MaType, MultiStudy, Rsi, Study, Variance};

/// 指定类型的移动平均
pub fn moving_average(data: &[f64], ma: MaType, period: usize) -> Result<Vec<f64>> {
    Ok(ma.create(period)?.setup(data))
}

pub fn sma(data: &[f64], period: usize) -> Result<Vec<f64>> {
    moving_average(data, MaType::Sma, period)
}

pub fn ema(data: &[f64], period: usize) -> Result<Vec<f64>> {
    moving_average(data, MaType::Ema, period)
}

pub fn wma(data: &[f64], period: usize) -> Result<Vec<f64>> {
    moving_average(data, MaType::Wma, period)
}

pub fn dema(data: &[f64], period: usize) -> Result<Vec<f64>> {
    moving_average(data, MaType::Dema, period)
}

pub fn tema(data: &[f64], period: usize) -> Result<Vec<f64>> {
    moving_average(data, MaType::Tema, period)
}

pub fn rsi(data: &[f64], period: usize) -> Result<Vec<f64>> {
    Ok(Rsi::new(period)?.setup(data))
}

pub fn std_dev(data: &[f64], period: usize) -> Result<Vec<f64>> {
    Ok(Variance::std_dev(period)?.setup(data))
}

/// 返回 `[variance, stddev, mean]` 三列
pub fn variance(data: &[f64], period: usize) -> Result<Vec<Vec<f64>>> {
    Variance::new(period)?.setup_all(&[data])
}
