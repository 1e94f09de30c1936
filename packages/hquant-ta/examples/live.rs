//! 从 JSON 配置构建一组指标，先用历史数据预热，再逐条推进实时数据
//!
//! RUST_LOG=hquant_ta=debug cargo run --example live

use hquant_ta::{Result, StudySpec};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"[
    { "type": "ema", "period": 20 },
    { "type": "rsi", "period": 14 },
    { "type": "macd", "fast": 12, "slow": 26, "signal": 9 },
    { "type": "bollinger", "period": 20, "average": "sma" },
    { "type": "vwap", "period": 20 }
]"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut studies = StudySpec::build_all(CONFIG)?;

    let closes: Vec<f64> = (0..300).map(|i| 100.0 + (i as f64 * 0.05).sin() * 8.0).collect();
    let volumes: Vec<f64> = (0..300).map(|i| 1000.0 + ((i * 37) % 200) as f64).collect();
    let (history, live) = closes.split_at(250);
    let (history_vol, live_vol) = volumes.split_at(250);

    // 预热
    for study in studies.iter_mut() {
        let columns = if study.arity() == 2 {
            study.setup_all(&[history_vol, history])?
        } else {
            study.setup_all(&[history])?
        };
        tracing::info!(study = study.name(), outputs = columns[0].len(), "warmed up");
    }

    // 实时推进
    for (close, volume) in live.iter().zip(live_vol) {
        let mut line = format!("close={:.2}", close);
        for study in studies.iter_mut() {
            let value = if study.arity() == 2 {
                study.update_all(&[*volume, *close])?
            } else {
                study.update_all(&[*close])?
            };
            let lanes: Vec<String> = value.as_slice().iter().map(|v| format!("{:.2}", v)).collect();
            line.push_str(&format!(" {}=[{}]", study.name(), lanes.join(", ")));
        }
        println!("{}", line);
    }

    Ok(())
}
