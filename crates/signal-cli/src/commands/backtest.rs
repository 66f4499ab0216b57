//! 백테스트 명령어.
//!
//! 저장된 모델로 바 이력의 마지막 N일을 채점하고 백테스트를 실행합니다.
//! 결과는 `backtest_results_{N}d.csv`로 저장됩니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 최근 30일 백테스트
//! signal backtest
//!
//! # 최근 7일, 수수료/슬리피지 포함
//! signal backtest -d 7 --commission 0.05 --slippage 0.1
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use signal_analytics::{
    score_rows, BacktestEngine, BacktestReport, FeatureEngine, LinearTrendForecaster,
    SoftmaxClassifier,
};
use signal_core::{BacktestCostConfig, Bar, FeatureConfig, SignalConfig};
use tracing::{debug, info, warn};

use crate::store::read_bars;

/// 백테스트 CLI 설정
#[derive(Debug, Clone)]
pub struct BacktestCliConfig {
    /// 마지막 바 기준 조회 일수
    pub days: u32,
    /// 바 이력 CSV 경로
    pub bars_path: PathBuf,
    /// 모델 파일 경로
    pub model_path: PathBuf,
    /// 결과 CSV를 저장할 디렉토리
    pub output_dir: PathBuf,
    /// 시그널 설정
    pub signal: SignalConfig,
    /// feature 설정
    pub features: FeatureConfig,
    /// 수수료/슬리피지
    pub costs: BacktestCostConfig,
}

impl BacktestCliConfig {
    /// 결과 CSV 경로.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("backtest_results_{}d.csv", self.days))
    }
}

/// 마지막 바 시각으로부터 `days`일 이내의 바만 남깁니다.
pub fn last_days(bars: &[Bar], days: u32) -> &[Bar] {
    let Some(last) = bars.last() else {
        return bars;
    };
    let cutoff = last.timestamp - Duration::days(i64::from(days));
    let start = bars.partition_point(|bar| bar.timestamp < cutoff);
    &bars[start..]
}

/// 백테스트를 실행합니다.
///
/// 거래가 하나도 없으면 CSV를 쓰지 않습니다.
pub fn run_backtest(config: &BacktestCliConfig) -> Result<BacktestReport> {
    if config.days == 0 {
        bail!("--days는 1 이상이어야 합니다");
    }
    info!(
        days = config.days,
        commission = config.costs.commission,
        slippage = config.costs.slippage,
        "Starting backtest"
    );

    let model = SoftmaxClassifier::load(&config.model_path).with_context(|| {
        format!(
            "모델 로드 실패: {} (먼저 `signal train`을 실행하세요)",
            config.model_path.display()
        )
    })?;

    let history = read_bars(&config.bars_path)
        .with_context(|| format!("바 이력 읽기 실패: {}", config.bars_path.display()))?;
    let bars = last_days(&history, config.days);
    info!("Loaded {} bars for backtest", bars.len());

    let engine = FeatureEngine::new(
        config.features.clone(),
        Arc::new(LinearTrendForecaster::new()),
    );
    let rows = engine.engineer(bars).context("feature 계산 실패")?;
    if rows.is_empty() {
        warn!(
            bars = bars.len(),
            required = engine.min_bars_required(),
            "No history for backtest"
        );
    }

    let scored = score_rows(&rows, &model).context("모델 채점 실패")?;
    debug!(scored = scored.len(), "Scored bars");

    let report = BacktestEngine::from_config(&config.signal, &config.costs)
        .run(&scored)
        .context("백테스트 실행 실패")?;

    if report.trades.is_empty() {
        info!("No trades in backtest");
        return Ok(report);
    }

    let output = config.output_path();
    report
        .save_csv(&output)
        .with_context(|| format!("결과 저장 실패: {}", output.display()))?;
    info!("Backtest results saved to {}", output.display());

    Ok(report)
}
