//! 指标配置
//!
//! JSON 中用 `"type"` 字段区分指标:
//!
//! ```json
//! [
//!   { "type": "ema", "period": 12 },
//!   { "type": "macd", "fast": 12, "slow": 26, "signal": 9 },
//!   { "type": "bollinger", "period": 20, "average": "sma" },
//!   { "type": "vwap", "period": 20 }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::studies::{
    AnyStudy, Bollinger, Dema, Ema, Macd, MaType, MinMax, Rsi, Sma, Tema, Variance, Vwap, VwapBands,
    Wma,
};

fn default_width() -> f64 {
    crate::studies::DEFAULT_WIDTH
}

/// 单个指标的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudySpec {
    Sma {
        period: usize,
    },
    Ema {
        period: usize,
        /// 0 表示 `2 / (period + 1)`
        #[serde(default)]
        k: f64,
    },
    Wma {
        period: usize,
        /// 0 表示 `period * (period + 1) / 2`
        #[serde(default)]
        weight: f64,
    },
    Dema {
        period: usize,
        #[serde(default)]
        average: MaType,
    },
    Tema {
        period: usize,
        #[serde(default)]
        average: MaType,
    },
    Rsi {
        period: usize,
        /// 设置后输入先经过该均线 (周期相同)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        average: Option<MaType>,
    },
    Mean {
        period: usize,
    },
    Variance {
        period: usize,
    },
    StdDev {
        period: usize,
    },
    Min {
        period: usize,
    },
    Max {
        period: usize,
    },
    MinMax {
        period: usize,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        #[serde(default)]
        average: MaType,
    },
    Vwap {
        period: usize,
    },
    VwapBands {
        up: f64,
        down: f64,
    },
    Bollinger {
        period: usize,
        #[serde(default = "default_width")]
        up: f64,
        #[serde(default = "default_width")]
        down: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        average: Option<MaType>,
    },
}

impl StudySpec {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 解析一个配置数组并全部构建
    pub fn build_all(json: &str) -> Result<Vec<AnyStudy>> {
        let specs: Vec<StudySpec> = serde_json::from_str(json)?;
        specs.iter().map(StudySpec::build).collect()
    }

    /// 构建指标；支持多值输出的指标构建为 [`AnyStudy::Multi`]
    pub fn build(&self) -> Result<AnyStudy> {
        tracing::debug!(spec = ?self, "building study");
        let study = match *self {
            StudySpec::Sma { period } => AnyStudy::Scalar(Box::new(Sma::new(period)?)),
            StudySpec::Ema { period, k } => AnyStudy::Scalar(Box::new(Ema::custom(period, k)?)),
            StudySpec::Wma { period, weight } => AnyStudy::Scalar(Box::new(Wma::custom(period, weight)?)),
            StudySpec::Dema { period, average } => AnyStudy::Scalar(Box::new(Dema::with_type(average, period)?)),
            StudySpec::Tema { period, average } => AnyStudy::Scalar(Box::new(Tema::with_type(average, period)?)),
            StudySpec::Rsi { period, average } => {
                let rsi = match average {
                    Some(ma) => Rsi::with_average(ma.create(period)?)?,
                    None => Rsi::new(period)?,
                };
                AnyStudy::Scalar(Box::new(rsi))
            }
            StudySpec::Mean { period } => AnyStudy::Scalar(Box::new(Variance::mean(period)?)),
            StudySpec::Variance { period } => AnyStudy::Multi(Box::new(Variance::new(period)?)),
            StudySpec::StdDev { period } => AnyStudy::Scalar(Box::new(Variance::std_dev(period)?)),
            StudySpec::Min { period } => AnyStudy::Scalar(Box::new(MinMax::min(period)?)),
            StudySpec::Max { period } => AnyStudy::Scalar(Box::new(MinMax::max(period)?)),
            StudySpec::MinMax { period } => AnyStudy::Multi(Box::new(MinMax::new(period)?)),
            StudySpec::Macd {
                fast,
                slow,
                signal,
                average,
            } => AnyStudy::Multi(Box::new(Macd::with_type(fast, slow, signal, average)?)),
            StudySpec::Vwap { period } => AnyStudy::Multi(Box::new(Vwap::with_period(period)?)),
            StudySpec::VwapBands { up, down } => AnyStudy::Multi(Box::new(VwapBands::new(up, down)?)),
            StudySpec::Bollinger {
                period,
                up,
                down,
                average,
            } => {
                let boll = match average {
                    Some(ma) => Bollinger::with_average(period, up, down, ma)?,
                    None => Bollinger::new(period, up, down)?,
                };
                AnyStudy::Multi(Box::new(boll))
            }
        };
        Ok(study)
    }
}
