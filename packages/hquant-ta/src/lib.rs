//! hquant-ta: 增量技术指标计算库
//!
//! 两种等价的计算方式:
//! - 批量: 对历史数组一次性计算 (`setup`)
//! - 实时: 每来一个新样本调用一次 `update`，O(1) 返回最新指标值
//!
//! 批量结果与逐个 `update` 的结果逐项相同 (去掉预热段)。
//!
//! ```
//! use hquant_ta::{Sma, Study};
//!
//! let mut sma = Sma::new(3).unwrap();
//! let history = sma.setup(&[1.0, 2.0, 3.0, 4.0]);
//! assert_eq!(history, vec![2.0, 3.0]);
//! assert_eq!(sma.update(5.0), 4.0);
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod floats;
pub mod series;
pub mod studies;

pub use common::{approx_eq, RingBuffer, EPSILON};
pub use config::StudySpec;
pub use error::{Result, StudyError, MAX_PERIOD};
pub use series::Series;
pub use studies::{
    AnyStudy, Bollinger, Dema, Ema, Locked, MaFactory, MaType, Macd, MinMax, MovingAverage, MultiStudy, Rsi,
    Shape, Sma, Study, StudyMeta, StudyValue, Tema, Variance, Vwap, VwapBands, Wma,
};
