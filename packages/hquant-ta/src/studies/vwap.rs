//! 成交量加权平均价 (VWAP) 及其标准差通道
//!
//! 输入每个样本两个值 `[volume, price]`，输出 `[vwap, upper, lower]`:
//! - vwap  = Σ(volume * price) / Σvolume (全部样本)
//! - upper = vwap + std * up
//! - lower = vwap + std * down
//!
//! std 是 vwap 的滚动标准差，窗口为 `(up - down) / 2`。

use super::variance::Variance;
use super::{MultiStudy, Shape, StudyMeta, StudyValue, MIN_PERIOD};
use crate::error::{check_arity, Result, StudyError, MAX_PERIOD};

/// VWAP 通道
#[derive(Debug, Clone)]
pub struct VwapBands {
    std: Variance,
    up: f64,
    down: f64,
    sum: f64,
    total: f64,
    window: usize,
}

/// 对称通道 `±period` 的 VWAP
pub type Vwap = VwapBands;

impl VwapBands {
    /// `up < down` 时自动交换
    pub fn new(up: f64, down: f64) -> Result<Self> {
        if !up.is_finite() || !down.is_finite() {
            return Err(StudyError::invalid_parameter(format!(
                "VWAP bands must be finite, got up={} down={}",
                up, down
            )));
        }
        let (up, down) = if up < down { (down, up) } else { (up, down) };

        let half = (up - down) / 2.0;
        if half > MAX_PERIOD as f64 {
            tracing::warn!(up, down, "rejected VWAP bands");
            return Err(StudyError::invalid_parameter(format!(
                "VWAP band width {} exceeds {}",
                half, MAX_PERIOD
            )));
        }
        // 截断
        let window = half as usize;
        if window < MIN_PERIOD {
            tracing::warn!(up, down, window, "rejected VWAP bands");
            return Err(StudyError::invalid_period("VWAP", window, MIN_PERIOD));
        }

        Ok(Self {
            std: Variance::std_dev(window)?,
            up,
            down,
            sum: 0.0,
            total: 0.0,
            window,
        })
    }

    /// 等价于 `VwapBands::new(period, -period)`
    pub fn with_period(period: usize) -> Result<Self> {
        let d = period as f64;
        Self::new(d, -d)
    }

    /// 推进一个样本，返回当前 vwap
    pub fn update_pair(&mut self, volume: f64, price: f64) -> f64 {
        self.advance(volume, price).0
    }

    fn advance(&mut self, volume: f64, price: f64) -> (f64, f64, f64) {
        self.sum += volume * price;
        self.total += volume;

        // 尚无成交量时退化为价格本身
        let vwap = if self.total == 0.0 { price } else { self.sum / self.total };
        let (_, std, _) = self.std.advance(vwap);
        (vwap, vwap + std * self.up, vwap + std * self.down)
    }

    pub fn bands(&self) -> (f64, f64) {
        (self.up, self.down)
    }
}

impl StudyMeta for VwapBands {
    fn name(&self) -> &'static str {
        "VWAP"
    }

    fn warmup(&self) -> usize {
        self.window - 1
    }
}

impl MultiStudy for VwapBands {
    fn arity(&self) -> usize {
        2
    }

    fn shape(&self) -> Shape {
        Shape::Triple
    }

    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        check_arity("VWAP", 2, inputs.len())?;
        let (vwap, upper, lower) = self.advance(inputs[0], inputs[1]);
        Ok(StudyValue::triple(vwap, upper, lower))
    }

    fn periods(&self) -> Vec<usize> {
        vec![self.window]
    }

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::approx_eq;

    #[test]
    fn test_vwap_basic() {
        let mut vwap = Vwap::with_period(2).unwrap();
        let volumes = [2.5, 7.5];
        let prices = [268.0, 269.0];

        let mut last = 0.0;
        for (v, p) in volumes.iter().zip(prices.iter()) {
            last = vwap.update_scalar(&[*v, *p]).unwrap();
        }
        assert!(approx_eq(last, 268.75));
    }

    #[test]
    fn test_vwap_bands() {
        let mut bands = VwapBands::new(-2.0, 2.0).unwrap();
        assert_eq!(bands.bands(), (2.0, -2.0));
        assert_eq!(bands.periods(), vec![2]);

        let first = bands.update_all(&[1.0, 10.0]).unwrap();
        // 只有一个样本，std = 0
        assert_eq!(first.as_slice(), &[10.0, 10.0, 10.0]);

        let second = bands.update_all(&[1.0, 20.0]).unwrap();
        // vwap 序列 [10, 15]，std = 2.5
        assert!(approx_eq(second[0], 15.0));
        assert!(approx_eq(second[1], 20.0));
        assert!(approx_eq(second[2], 10.0));
    }

    #[test]
    fn test_vwap_arity() {
        let mut vwap = Vwap::with_period(3).unwrap();
        assert!(matches!(
            vwap.update_all(&[1.0]),
            Err(StudyError::InvalidArity { expected: 2, got: 1, .. })
        ));
        assert!(vwap.update_all(&[1.0, 2.0, 3.0]).is_err());
        assert_eq!(vwap.update_pair(2.0, 5.0), 5.0);
    }

    #[test]
    fn test_vwap_invalid_window() {
        assert!(VwapBands::new(1.0, -1.0).is_err());
        assert!(Vwap::with_period(1).is_err());
        assert!(VwapBands::new(f64::NAN, 1.0).is_err());
        assert!(matches!(
            VwapBands::new(1e300, -1e300),
            Err(StudyError::InvalidParameter { .. })
        ));
        assert!(Vwap::with_period(usize::MAX).is_err());
    }

    #[test]
    fn test_vwap_zero_volume() {
        let mut vwap = Vwap::with_period(2).unwrap();
        assert_eq!(vwap.update_pair(0.0, 12.0), 12.0);
    }
}
