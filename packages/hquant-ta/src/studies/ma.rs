//! 移动平均线: SMA / EMA / WMA
//!
//! 优化: O(1) 增量计算
//! - SMA 使用环形缓冲区的补偿滑动和
//! - EMA 预热阶段输出已有样本的均值，满周期后以 SMA 为种子递推
//! - WMA 维护加权和与窗口和，每步平移一次权重

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::staged::{Dema, Tema};
use super::{MovingAverage, Study, StudyMeta, MIN_PERIOD};
use crate::common::RingBuffer;
use crate::error::{check_period, Result, StudyError};

/// 按周期构造移动平均线的工厂
pub type MaFactory = dyn Fn(usize) -> Result<Box<dyn MovingAverage>> + Send + Sync;

/// 简单移动平均
#[derive(Debug, Clone)]
pub struct Sma {
    window: RingBuffer,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self> {
        check_period("SMA", period, MIN_PERIOD)?;
        Ok(Self {
            window: RingBuffer::new(period),
            period,
        })
    }
}

impl StudyMeta for Sma {
    fn name(&self) -> &'static str {
        "SMA"
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }
}

impl Study for Sma {
    #[inline]
    fn update(&mut self, value: f64) -> f64 {
        self.window.push(value);
        // 未满时按已有样本数求均值
        self.window.mean()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl MovingAverage for Sma {
    fn clone_average(&self) -> Box<dyn MovingAverage> {
        Box::new(self.clone())
    }
    fn is_primed(&self) -> bool {
        self.window.is_full()
    }
}

#[derive(Debug, Clone, Copy)]
enum EmaStage {
    /// 前 period 个样本: 累加求均值
    Priming { sum: f64, seen: usize },
    /// 递推: prev + k * (v - prev)
    Active { prev: f64 },
}

/// 指数移动平均
#[derive(Debug, Clone)]
pub struct Ema {
    stage: EmaStage,
    k: f64,
    period: usize,
}

impl Ema {
    /// 标准平滑系数 `2 / (period + 1)`
    pub fn new(period: usize) -> Result<Self> {
        Self::custom(period, 0.0)
    }

    /// 自定义平滑系数，`k == 0` 时使用标准值
    pub fn custom(period: usize, k: f64) -> Result<Self> {
        check_period("EMA", period, MIN_PERIOD)?;
        if !k.is_finite() || k < 0.0 || k > 1.0 {
            return Err(StudyError::invalid_parameter(format!(
                "EMA smoothing factor must be within [0, 1], got {}",
                k
            )));
        }
        let k = if k == 0.0 {
            2.0 / (period as f64 + 1.0)
        } else {
            k
        };
        Ok(Self {
            stage: EmaStage::Priming { sum: 0.0, seen: 0 },
            k,
            period,
        })
    }

    /// 平滑系数
    pub fn k(&self) -> f64 {
        self.k
    }
}

impl StudyMeta for Ema {
    fn name(&self) -> &'static str {
        "EMA"
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }
}

impl Study for Ema {
    #[inline]
    fn update(&mut self, value: f64) -> f64 {
        let (next, out) = match self.stage {
            EmaStage::Priming { sum, seen } => {
                let sum = sum + value;
                let seen = seen + 1;
                let mean = sum / seen as f64;
                if seen == self.period {
                    (EmaStage::Active { prev: mean }, mean)
                } else {
                    (EmaStage::Priming { sum, seen }, mean)
                }
            }
            EmaStage::Active { prev } => {
                let ema = prev + self.k * (value - prev);
                (EmaStage::Active { prev: ema }, ema)
            }
        };
        self.stage = next;
        out
    }

    fn period(&self) -> usize {
        self.period
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl MovingAverage for Ema {
    fn clone_average(&self) -> Box<dyn MovingAverage> {
        Box::new(self.clone())
    }
    fn is_primed(&self) -> bool {
        matches!(self.stage, EmaStage::Active { .. })
    }
}

/// 线性加权移动平均 (最新样本权重为 period)
#[derive(Debug, Clone)]
pub struct Wma {
    window: RingBuffer,
    weighted_sum: f64,
    // 最新 period-1 个样本的和
    sum: f64,
    weight: f64,
    period: usize,
}

impl Wma {
    /// 标准权重和 `period * (period + 1) / 2`
    pub fn new(period: usize) -> Result<Self> {
        Self::custom(period, 0.0)
    }

    /// 自定义归一化分母，`weight == 0` 时使用标准值
    pub fn custom(period: usize, weight: f64) -> Result<Self> {
        check_period("WMA", period, MIN_PERIOD)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(StudyError::invalid_parameter(format!(
                "WMA weight must be a non-negative number, got {}",
                weight
            )));
        }
        let weight = if weight == 0.0 {
            triangular(period)
        } else {
            weight
        };
        Ok(Self {
            window: RingBuffer::new(period),
            weighted_sum: 0.0,
            sum: 0.0,
            weight,
            period,
        })
    }
}

#[inline]
fn triangular(n: usize) -> f64 {
    let n = n as f64;
    n * (n + 1.0) / 2.0
}

impl StudyMeta for Wma {
    fn name(&self) -> &'static str {
        "WMA"
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }
}

impl Study for Wma {
    #[inline]
    fn update(&mut self, value: f64) -> f64 {
        self.window.push(value);
        let seen = self.window.len();

        if seen < self.period {
            // 预热: 权重即位置 1..seen，输出已有样本的加权均值
            self.weighted_sum += value * seen as f64;
            self.sum += value;
            return self.weighted_sum / triangular(seen);
        }

        self.weighted_sum += value * self.period as f64;
        self.sum += value;
        let out = self.weighted_sum / self.weight;

        // 所有权重减一，最旧的样本权重归零
        self.weighted_sum -= self.sum;
        self.sum -= self.window.first().unwrap_or(0.0);
        out
    }

    fn period(&self) -> usize {
        self.period
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl MovingAverage for Wma {
    fn clone_average(&self) -> Box<dyn MovingAverage> {
        Box::new(self.clone())
    }
    fn is_primed(&self) -> bool {
        self.window.is_full()
    }
}

/// 移动平均类型 (配置/MACD/布林带中选择均线)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    Sma,
    #[default]
    Ema,
    Wma,
    Dema,
    Tema,
}

impl MaType {
    pub const ALL: [MaType; 5] = [MaType::Sma, MaType::Ema, MaType::Wma, MaType::Dema, MaType::Tema];

    /// 按周期构造
    pub fn create(self, period: usize) -> Result<Box<dyn MovingAverage>> {
        tracing::debug!(ma = %self, period, "creating moving average");
        let ma: Box<dyn MovingAverage> = match self {
            MaType::Sma => Box::new(Sma::new(period)?),
            MaType::Ema => Box::new(Ema::new(period)?),
            MaType::Wma => Box::new(Wma::new(period)?),
            MaType::Dema => Box::new(Dema::new(period)?),
            MaType::Tema => Box::new(Tema::new(period)?),
        };
        Ok(ma)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MaType::Sma => "sma",
            MaType::Ema => "ema",
            MaType::Wma => "wma",
            MaType::Dema => "dema",
            MaType::Tema => "tema",
        }
    }
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaType {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self> {
        MaType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StudyError::invalid_parameter(format!("unknown moving average type: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{approx_eq, slice_approx_eq};

    fn feed<S: Study>(study: &mut S, input: &[f64]) -> Vec<f64> {
        input.iter().map(|v| study.update(*v)).collect()
    }

    #[test]
    fn test_sma_basic() {
        let mut sma = Sma::new(5).unwrap();
        let input: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let out = feed(&mut sma, &input);
        // 未满时按已有样本求均值
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 1.5);
        assert!(slice_approx_eq(&out[4..], &[3.0, 4.0, 5.0, 6.0, 7.0, 8.0]));
    }

    #[test]
    fn test_sma_after_spike() {
        let mut sma = Sma::new(3).unwrap();
        let mut input = vec![1e12 + 0.3, 1e12 + 0.7];
        input.extend((0..50).map(|i| 100.0 + (i % 7) as f64 * 0.3));
        let out = feed(&mut sma, &input);
        for t in 4..input.len() {
            let expected = input[t - 2..=t].iter().sum::<f64>() / 3.0;
            assert!(approx_eq(out[t], expected), "t={} {} != {}", t, out[t], expected);
        }
    }

    #[test]
    fn test_triangular_does_not_overflow() {
        assert_eq!(triangular(3), 6.0);
        let n = u32::MAX as f64 + 1.0;
        assert_eq!(triangular(1 << 32), n * (n + 1.0) / 2.0);
    }

    #[test]
    fn test_is_primed() {
        for ma in MaType::ALL {
            let mut avg = ma.create(3).unwrap();
            assert!(!avg.is_primed(), "{}", ma);
            avg.update(1.0);
            avg.update(2.0);
            assert!(!avg.is_primed(), "{}", ma);
            avg.update(3.0);
            assert!(avg.is_primed(), "{}", ma);
        }
    }

    #[test]
    fn test_sma_setup_trims_warmup() {
        let mut sma = Sma::new(5).unwrap();
        let input: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let out = sma.setup(&input);
        assert_eq!(out, vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_invalid_period() {
        assert!(matches!(
            Sma::new(1),
            Err(StudyError::InvalidPeriod { study: "SMA", period: 1, min: 2 })
        ));
        assert!(Ema::new(0).is_err());
        assert!(Wma::new(1).is_err());
        assert!(Ema::custom(3, 1.5).is_err());
        assert!(Wma::custom(3, -1.0).is_err());
    }

    #[test]
    fn test_ema_priming_and_seed() {
        let mut ema = Ema::new(3).unwrap();
        assert_eq!(ema.update(1.0), 1.0);
        assert_eq!(ema.update(2.0), 1.5);
        // 第 period 个样本: SMA 种子
        assert_eq!(ema.update(3.0), 2.0);
        // k = 0.5
        assert_eq!(ema.update(4.0), 3.0);
        assert_eq!(ema.update(6.0), 4.5);
    }

    #[test]
    fn test_ema_custom_k() {
        let mut ema = Ema::custom(2, 0.1).unwrap();
        assert_eq!(ema.k(), 0.1);
        ema.update(10.0);
        ema.update(10.0);
        assert!(approx_eq(ema.update(20.0), 11.0));
    }

    #[test]
    fn test_ema_converges_on_constant() {
        let mut ema = Ema::new(10).unwrap();
        let mut last = 0.0;
        for _ in 0..200 {
            last = ema.update(42.0);
        }
        assert!(approx_eq(last, 42.0));
    }

    #[test]
    fn test_wma_matches_direct_formula() {
        let period = 4;
        let input: Vec<f64> = (0..30).map(|i| ((i * 7) % 11) as f64 + 0.5).collect();
        let mut wma = Wma::new(period).unwrap();
        let out = feed(&mut wma, &input);

        for t in (period - 1)..input.len() {
            let window = &input[t + 1 - period..=t];
            let expected: f64 = window
                .iter()
                .enumerate()
                .map(|(i, v)| v * (i + 1) as f64)
                .sum::<f64>()
                / triangular(period);
            assert!(approx_eq(out[t], expected), "t={} {} != {}", t, out[t], expected);
        }
    }

    #[test]
    fn test_wma_priming() {
        let mut wma = Wma::new(3).unwrap();
        assert_eq!(wma.update(3.0), 3.0);
        // (3*1 + 6*2) / 3
        assert_eq!(wma.update(6.0), 5.0);
    }

    #[test]
    fn test_clone_independence() {
        let input = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0];
        for ma in MaType::ALL {
            let mut a = ma.create(3).unwrap();
            feed(&mut a, &input);
            let mut b = a.clone();
            let mut reference = a.clone();

            // a 和 b 各自走不同的数据
            feed(&mut a, &[100.0, -50.0, 300.0]);
            let from_b = feed(&mut b, &[2.0, 3.0, 4.0]);
            let from_reference = feed(&mut reference, &[2.0, 3.0, 4.0]);
            assert_eq!(from_b, from_reference, "{}", ma);
        }
    }

    #[test]
    fn test_constant_input() {
        for ma in MaType::ALL {
            for period in [2, 3, 7] {
                let mut study = ma.create(period).unwrap();
                let out = study.setup(&[3.25; 40]);
                assert!(out.iter().all(|v| approx_eq(*v, 3.25)), "{} {}", ma, period);
            }
        }
    }

    #[test]
    fn test_ma_type_parse() {
        assert_eq!("SMA".parse::<MaType>().unwrap(), MaType::Sma);
        assert_eq!(" tema ".parse::<MaType>().unwrap(), MaType::Tema);
        assert!("kama".parse::<MaType>().is_err());
        assert_eq!(MaType::default(), MaType::Ema);

        let t: MaType = serde_json::from_str("\"wma\"").unwrap();
        assert_eq!(t, MaType::Wma);
        assert_eq!(serde_json::to_string(&MaType::Dema).unwrap(), "\"dema\"");
    }

    #[test]
    fn test_factory_closure() {
        let factory: Box<MaFactory> = Box::new(|p| MaType::Wma.create(p));
        let ma = factory(5).unwrap();
        assert_eq!(ma.name(), "WMA");
        assert_eq!(ma.period(), 5);
    }
}
