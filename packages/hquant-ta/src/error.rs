//! 错误类型

use thiserror::Error;

/// crate 统一结果类型
pub type Result<T> = std::result::Result<T, StudyError>;

/// 指标计算错误
///
/// 全部属于调用方错误 (参数、输入个数、长度)，没有可重试的瞬时错误。
#[derive(Debug, Error)]
pub enum StudyError {
    /// 周期小于最小值 (构造时)
    #[error("{study}: invalid period {period}, must be >= {min}")]
    InvalidPeriod {
        study: &'static str,
        period: usize,
        min: usize,
    },

    /// 多输入指标收到的输入个数不对 (例如 VWAP 需要 [volume, price])
    #[error("{study}: expected {expected} input value(s), got {got}")]
    InvalidArity {
        study: &'static str,
        expected: usize,
        got: usize,
    },

    /// 两个序列长度不一致
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// 下标越界
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 数据不足
    #[error("insufficient data: need at least {required} elements, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// 其它非法参数
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// 配置解析失败
    #[error("invalid study config: {0}")]
    Config(#[from] serde_json::Error),
}

impl StudyError {
    pub fn invalid_period(study: &'static str, period: usize, min: usize) -> Self {
        Self::InvalidPeriod { study, period, min }
    }

    pub fn invalid_arity(study: &'static str, expected: usize, got: usize) -> Self {
        Self::InvalidArity {
            study,
            expected,
            got,
        }
    }

    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}

/// 周期上限，窗口缓冲区按周期预分配
pub const MAX_PERIOD: usize = 1 << 24;

/// 检查周期 (所有指标的最小周期为 2，最大为 [`MAX_PERIOD`])
pub(crate) fn check_period(study: &'static str, period: usize, min: usize) -> Result<()> {
    if period < min {
        tracing::warn!(study, period, min, "rejected study period");
        return Err(StudyError::invalid_period(study, period, min));
    }
    if period > MAX_PERIOD {
        tracing::warn!(study, period, max = MAX_PERIOD, "rejected study period");
        return Err(StudyError::invalid_parameter(format!(
            "{}: period {} exceeds {}",
            study, period, MAX_PERIOD
        )));
    }
    Ok(())
}

/// 检查输入个数
pub(crate) fn check_arity(study: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        tracing::warn!(study, expected, got, "rejected study input");
        return Err(StudyError::invalid_arity(study, expected, got));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_period() {
        assert!(check_period("SMA", 2, 2).is_ok());
        let err = check_period("SMA", 1, 2).unwrap_err();
        assert!(matches!(
            err,
            StudyError::InvalidPeriod {
                study: "SMA",
                period: 1,
                min: 2
            }
        ));
        assert_eq!(err.to_string(), "SMA: invalid period 1, must be >= 2");

        assert!(check_period("SMA", MAX_PERIOD, 2).is_ok());
        assert!(matches!(
            check_period("SMA", MAX_PERIOD + 1, 2),
            Err(StudyError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_check_arity() {
        assert!(check_arity("VWAP", 2, 2).is_ok());
        assert!(matches!(
            check_arity("VWAP", 2, 3),
            Err(StudyError::InvalidArity { expected: 2, got: 3, .. })
        ));
    }
}
