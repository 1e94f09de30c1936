//! 批量 / 流式适配
//!
//! 批量计算就是逐个调用 `update`，再去掉预热段，
//! 因此批量结果与流式结果逐项相同。

use super::ma::MaType;
use super::{MovingAverage, MultiStudy, Study};
use crate::error::{check_arity, Result, StudyError};
use crate::series::Series;

/// 逐个推进，返回全部输出 (不去掉预热段)
pub fn apply_study<S: Study + ?Sized>(study: &mut S, input: &[f64]) -> Vec<f64> {
    input.iter().map(|v| study.update(*v)).collect()
}

/// 逐个推进，去掉前 `warmup()` 个输出
pub fn setup<S: Study + ?Sized>(study: &mut S, input: &[f64]) -> Vec<f64> {
    let warmup = study.warmup();
    let mut out = apply_study(study, input);
    tracing::trace!(study = study.name(), len = input.len(), warmup, "batch setup");
    out.drain(..warmup.min(out.len()));
    out
}

/// 按列推进多输入/多输出指标，每个输出通道一列 (不去掉预热段)
pub fn apply_multi<S: MultiStudy + ?Sized>(study: &mut S, inputs: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
    check_arity(study.name(), study.arity(), inputs.len())?;

    let rows = inputs.first().map_or(0, |c| c.len());
    if let Some(bad) = inputs.iter().find(|c| c.len() != rows) {
        return Err(StudyError::length_mismatch(rows, bad.len()));
    }

    let lanes = study.shape().lanes();
    let mut columns: Vec<Vec<f64>> = (0..lanes).map(|_| Vec::with_capacity(rows)).collect();
    let mut row = Vec::with_capacity(inputs.len());

    for i in 0..rows {
        row.clear();
        row.extend(inputs.iter().map(|c| c[i]));
        let value = study.update_all(&row)?;
        for (column, v) in columns.iter_mut().zip(value.as_slice()) {
            column.push(*v);
        }
    }
    Ok(columns)
}

/// 按列推进，每列去掉前 `warmup()` 个输出
pub fn setup_multi<S: MultiStudy + ?Sized>(study: &mut S, inputs: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
    let warmup = study.warmup();
    let mut columns = apply_multi(study, inputs)?;
    tracing::trace!(
        study = study.name(),
        rows = columns.first().map_or(0, |c| c.len()),
        warmup,
        "batch multi setup"
    );
    for column in columns.iter_mut() {
        column.drain(..warmup.min(column.len()));
    }
    Ok(columns)
}

impl Series {
    /// 对整个序列运行指标，返回去掉预热段的结果
    pub fn apply<S: Study + ?Sized>(&self, study: &mut S) -> Series {
        match self.as_slice() {
            Some(values) => Series::from(study.setup(values)),
            None => Series::from(study.setup(&self.to_vec())),
        }
    }

    /// 计算移动平均线，同时返回可以继续流式推进的指标
    pub fn moving_average(&self, ma: MaType, period: usize) -> Result<(Series, Box<dyn MovingAverage>)> {
        let mut study = ma.create(period)?;
        let out = self.apply(&mut study);
        Ok((out, study))
    }

    pub fn sma(&self, period: usize) -> Result<Series> {
        Ok(self.moving_average(MaType::Sma, period)?.0)
    }

    pub fn ema(&self, period: usize) -> Result<Series> {
        Ok(self.moving_average(MaType::Ema, period)?.0)
    }

    pub fn wma(&self, period: usize) -> Result<Series> {
        Ok(self.moving_average(MaType::Wma, period)?.0)
    }

    pub fn dema(&self, period: usize) -> Result<Series> {
        Ok(self.moving_average(MaType::Dema, period)?.0)
    }

    pub fn tema(&self, period: usize) -> Result<Series> {
        Ok(self.moving_average(MaType::Tema, period)?.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::slice_approx_eq;
    use crate::studies::{Bollinger, Macd, MinMax, Rsi, StudyMeta, Variance, Vwap, VwapBands};

    fn prices(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 50.0 + (i as f64 * 0.7).sin() * 4.0 + ((i * 7) % 5) as f64 * 0.3)
            .collect()
    }

    fn scalar_studies() -> Vec<Box<dyn Study>> {
        let mut studies: Vec<Box<dyn Study>> = Vec::new();
        for ma in MaType::ALL {
            studies.push(ma.create(6).unwrap().boxed_clone());
        }
        studies.push(Box::new(Rsi::new(5).unwrap()));
        studies.push(Box::new(Rsi::with_average(MaType::Wma.create(4).unwrap()).unwrap()));
        studies.push(Box::new(Variance::mean(5).unwrap()));
        studies.push(Box::new(Variance::new(5).unwrap()));
        studies.push(Box::new(Variance::std_dev(5).unwrap()));
        studies.push(Box::new(MinMax::min(4).unwrap()));
        studies.push(Box::new(MinMax::max(4).unwrap()));
        studies.push(Box::new(Macd::new(4, 9, 3).unwrap()));
        studies.push(Box::new(Bollinger::standard(5).unwrap()));
        studies
    }

    #[test]
    fn test_batch_stream_equivalence() {
        let input = prices(80);
        for study in scalar_studies() {
            let mut streaming = study.clone();
            let mut batch = study;

            let stream: Vec<f64> = input.iter().map(|v| streaming.update(*v)).collect();
            let warmup = batch.warmup();
            let out = batch.setup(&input);

            assert_eq!(out.len(), input.len() - warmup, "{}", batch.name());
            assert_eq!(out.as_slice(), &stream[warmup..], "{}", batch.name());
        }
    }

    #[test]
    fn test_setup_short_input() {
        let mut sma = MaType::Sma.create(5).unwrap();
        assert!(sma.setup(&[1.0, 2.0]).is_empty());
        assert!(sma.setup(&[]).is_empty());
    }

    #[test]
    fn test_multi_batch_stream_equivalence() {
        let input = prices(60);
        let mut multis: Vec<Box<dyn MultiStudy>> = vec![
            Box::new(Macd::new(5, 10, 4).unwrap()),
            Box::new(Bollinger::standard(6).unwrap()),
            Box::new(Variance::new(4).unwrap()),
            Box::new(MinMax::new(4).unwrap()),
        ];

        for study in multis.iter_mut() {
            let mut streaming = study.clone();
            let warmup = study.warmup();
            let lanes = study.shape().lanes();
            let columns = study.setup_all(&[&input]).unwrap();
            assert_eq!(columns.len(), lanes);

            let rows: Vec<_> = input.iter().map(|v| streaming.update_all(&[*v]).unwrap()).collect();
            for (lane, column) in columns.iter().enumerate() {
                let expected: Vec<f64> = rows[warmup..].iter().map(|r| r[lane]).collect();
                assert_eq!(column, &expected, "{} lane {}", study.name(), lane);
            }
        }
    }

    #[test]
    fn test_vwap_batch_stream_equivalence() {
        let prices = prices(60);
        let volumes: Vec<f64> = (0..60).map(|i| 1.0 + ((i * 3) % 7) as f64).collect();
        let mut batch = VwapBands::new(3.0, -2.0).unwrap();
        let mut streaming = batch.clone();
        let warmup = batch.warmup();

        let columns = setup_multi(&mut batch, &[&volumes, &prices]).unwrap();
        assert_eq!(columns.len(), 3);

        let rows: Vec<_> = volumes
            .iter()
            .zip(&prices)
            .map(|(v, p)| streaming.update_all(&[*v, *p]).unwrap())
            .collect();
        for (lane, column) in columns.iter().enumerate() {
            let expected: Vec<f64> = rows[warmup..].iter().map(|r| r[lane]).collect();
            assert_eq!(column, &expected, "lane {}", lane);
        }
    }

    #[test]
    fn test_apply_multi_vwap() {
        let volumes = [2.5, 7.5, 5.0];
        let prices = [268.0, 269.0, 270.0];
        let mut vwap = Vwap::with_period(2).unwrap();

        let out = apply_multi(&mut vwap, &[&volumes, &prices]).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].len(), 3);
        assert!(slice_approx_eq(&out[0][..2], &[268.0, 268.75]));

        let trimmed = setup_multi(&mut Vwap::with_period(2).unwrap(), &[&volumes, &prices]).unwrap();
        assert_eq!(trimmed[0].len(), 2);
    }

    #[test]
    fn test_apply_multi_errors() {
        let mut vwap = Vwap::with_period(2).unwrap();
        assert!(matches!(
            apply_multi(&mut vwap, &[&[1.0]]),
            Err(StudyError::InvalidArity { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            apply_multi(&mut vwap, &[&[1.0, 2.0], &[1.0]]),
            Err(StudyError::LengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_series_apply() {
        let s: Series = (1..=10).map(|i| i as f64).collect();
        let out = s.sma(5).unwrap();
        assert_eq!(out.to_vec(), vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);

        let (ema, mut live) = s.moving_average(MaType::Ema, 3).unwrap();
        assert_eq!(ema.len(), 8);
        // 流式继续推进
        let next = live.update(11.0);
        assert!(next > ema.last().unwrap());

        let mut capped = Series::capped(4).unwrap();
        capped.extend_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut sma = MaType::Sma.create(2).unwrap();
        assert_eq!(capped.apply(&mut sma).to_vec(), vec![3.5, 4.5, 5.5]);

        assert!(s.wma(1).is_err());
        assert_eq!(s.dema(3).unwrap().len(), 7);
        assert_eq!(s.tema(3).unwrap().len(), 7);
    }
}
