//! 多级平滑均线: DEMA / TEMA
//!
//! 第一级均线直接吃原始数据。第一级预热完成 (`is_primed`) 的瞬间，
//! 后续各级由第一级的深拷贝得到，此后逐级串联:
//! - DEMA = 2·e1 − e2
//! - TEMA = 3·e1 − 3·e2 + e3
//!
//! 预热期间直接输出第一级的值。

use super::ma::MaType;
use super::{MovingAverage, Study, StudyMeta, MIN_PERIOD};
use crate::error::{check_period, Result};

#[derive(Debug, Clone, Copy)]
enum Stage {
    Warming,
    Active,
}

/// DEMA/TEMA 共用的级联状态
#[derive(Debug, Clone)]
struct Cascade {
    first: Box<dyn MovingAverage>,
    rest: Vec<Box<dyn MovingAverage>>,
    coefficients: &'static [f64],
    stage: Stage,
    period: usize,
}

impl Cascade {
    fn new(name: &'static str, first: Box<dyn MovingAverage>, coefficients: &'static [f64]) -> Result<Self> {
        let period = first.period();
        check_period(name, period, MIN_PERIOD)?;
        Ok(Self {
            first,
            rest: Vec::with_capacity(coefficients.len() - 1),
            coefficients,
            stage: Stage::Warming,
            period,
        })
    }

    #[inline]
    fn update(&mut self, value: f64) -> f64 {
        let e1 = self.first.update(value);

        match self.stage {
            Stage::Warming => {
                // 由第一级自己的状态决定，已喂过数据的均线也适用
                if self.first.is_primed() {
                    self.rest = (1..self.coefficients.len())
                        .map(|_| self.first.clone_average())
                        .collect();
                    self.stage = Stage::Active;
                }
                e1
            }
            Stage::Active => {
                let mut input = e1;
                let mut out = self.coefficients[0] * e1;
                for (ma, c) in self.rest.iter_mut().zip(&self.coefficients[1..]) {
                    input = ma.update(input);
                    out += c * input;
                }
                out
            }
        }
    }
}

macro_rules! cascade_study {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $coefficients:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            inner: Cascade,
        }

        impl $ty {
            /// 以 EMA 为基础均线
            pub fn new(period: usize) -> Result<Self> {
                Self::with_type(MaType::Ema, period)
            }

            /// 以指定类型的均线为基础
            pub fn with_type(ma: MaType, period: usize) -> Result<Self> {
                check_period($name, period, MIN_PERIOD)?;
                Self::with_average(ma.create(period)?)
            }

            /// 以任意均线实例为第一级
            ///
            /// 第一级已经预热完成时，下一个样本就开始串联。
            pub fn with_average(first: Box<dyn MovingAverage>) -> Result<Self> {
                Ok(Self {
                    inner: Cascade::new($name, first, $coefficients)?,
                })
            }
        }

        impl StudyMeta for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn warmup(&self) -> usize {
                self.inner.period
            }
        }

        impl Study for $ty {
            #[inline]
            fn update(&mut self, value: f64) -> f64 {
                self.inner.update(value)
            }

            fn period(&self) -> usize {
                self.inner.period
            }

            fn boxed_clone(&self) -> Box<dyn Study> {
                Box::new(self.clone())
            }
        }

        impl MovingAverage for $ty {
            fn clone_average(&self) -> Box<dyn MovingAverage> {
                Box::new(self.clone())
            }

            fn is_primed(&self) -> bool {
                matches!(self.inner.stage, Stage::Active)
            }
        }
    };
}

cascade_study!(
    /// 双重指数移动平均
    Dema,
    "DEMA",
    &[2.0, -1.0]
);

cascade_study!(
    /// 三重指数移动平均
    Tema,
    "TEMA",
    &[3.0, -3.0, 1.0]
);
