//! 백테스트 엔진.
//!
//! 바를 시간 순서대로 하나씩 처리하는 2-상태 기계입니다.
//!
//! ```text
//!        BUY/SELL 판정
//!   FLAT ────────────▶ IN-TRADE
//!    ▲                    │
//!    └──── STOP/TARGET ───┘
//! ```
//!
//! - 진입 바에서는 청산 조건을 확인하지 않습니다.
//! - 청산 바에서는 새 진입을 평가하지 않습니다.
//! - 손절을 익절보다 먼저 확인합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{BacktestCostConfig, ExitReason, OpenPosition, SignalConfig, Trade};
use thiserror::Error;
use tracing::{debug, info};

use super::report::BacktestReport;
use crate::decision::SignalDecision;
use crate::ml::{Classifier, FeatureRow, MlError, MlResult};
use crate::stop_target::StopTargetCalculator;

/// 백테스트 에러
#[derive(Debug, Error)]
pub enum BacktestError {
    /// 설정 오류
    #[error("백테스트 설정 오류: {0}")]
    ConfigError(String),

    /// 데이터 오류
    #[error("데이터 오류: {0}")]
    DataError(String),

    /// 분류기/피처 오류
    #[error("ML 오류: {0}")]
    Ml(#[from] MlError),

    /// 리포트 내보내기 오류
    #[error("리포트 내보내기 오류: {0}")]
    ExportError(String),
}

impl From<csv::Error> for BacktestError {
    fn from(err: csv::Error) -> Self {
        BacktestError::ExportError(err.to_string())
    }
}

impl From<std::io::Error> for BacktestError {
    fn from(err: std::io::Error) -> Self {
        BacktestError::ExportError(err.to_string())
    }
}

/// 백테스트 결과 타입
pub type BacktestResult<T> = Result<T, BacktestError>;

/// 분류기 확률이 붙은 바.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredBar {
    /// 바 타임스탬프
    pub timestamp: DateTime<Utc>,
    /// 종가
    pub close: f64,
    /// 변동성 (ATR)
    pub atr: f64,
    /// 매수 확률
    pub p_buy: f64,
    /// 매도 확률
    pub p_sell: f64,
}

/// feature 행마다 분류기 확률을 계산합니다.
pub fn score_rows(rows: &[FeatureRow], classifier: &dyn Classifier) -> MlResult<Vec<ScoredBar>> {
    rows.iter()
        .map(|row| {
            let probs = classifier.predict_probabilities(&row.features)?;
            Ok(ScoredBar {
                timestamp: row.timestamp,
                close: row.close,
                atr: row.features.atr,
                p_buy: probs.buy,
                p_sell: probs.sell,
            })
        })
        .collect()
}

/// 시뮬레이션 포지션 상태.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PositionState {
    /// 포지션 없음
    #[default]
    Flat,
    /// 포지션 보유 중
    InTrade(OpenPosition),
}

/// 백테스팅 엔진
///
/// 설정만 보관하므로 같은 입력으로 여러 번 실행해도 결과가 같습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestEngine {
    decision: SignalDecision,
    calculator: StopTargetCalculator,
    costs: BacktestCostConfig,
}

impl Default for BacktestEngine {
    fn default() -> Self {
        Self::new(
            SignalDecision::default(),
            StopTargetCalculator::default(),
            BacktestCostConfig::default(),
        )
    }
}

impl BacktestEngine {
    /// 새로운 백테스트 엔진을 생성합니다.
    pub fn new(
        decision: SignalDecision,
        calculator: StopTargetCalculator,
        costs: BacktestCostConfig,
    ) -> Self {
        Self {
            decision,
            calculator,
            costs,
        }
    }

    /// 설정에서 생성합니다.
    pub fn from_config(signal: &SignalConfig, costs: &BacktestCostConfig) -> Self {
        Self::new(
            SignalDecision::from_config(signal),
            StopTargetCalculator::from_config(signal),
            costs.clone(),
        )
    }

    /// 비용 설정 반환.
    pub fn costs(&self) -> &BacktestCostConfig {
        &self.costs
    }

    /// 백테스트를 실행합니다.
    ///
    /// 빈 입력은 빈 원장을 반환합니다. 시간순으로 정렬되지 않았거나
    /// 유한하지 않은 값이 있으면 `DataError`입니다.
    pub fn run(&self, bars: &[ScoredBar]) -> BacktestResult<BacktestReport> {
        validate_bars(bars)?;
        info!(bars = bars.len(), "백테스트 시작");

        let mut state = PositionState::Flat;
        let mut trades: Vec<Trade> = Vec::new();

        for bar in bars {
            state = match state {
                PositionState::InTrade(position) => match position.exit_trigger(bar.close) {
                    Some(reason) => {
                        let trade = self.close_position(&position, bar, reason);
                        debug!(
                            side = %trade.side,
                            reason = %trade.reason,
                            pnl = trade.pnl,
                            "포지션 청산"
                        );
                        trades.push(trade);
                        PositionState::Flat
                    }
                    None => PositionState::InTrade(position),
                },
                PositionState::Flat => match self.decision.decide(bar.p_buy, bar.p_sell).as_side() {
                    Some(side) => {
                        let levels = self.calculator.levels(bar.close, side, bar.atr);
                        debug!(
                            %side,
                            entry = bar.close,
                            stop = levels.stop,
                            target = levels.target,
                            "포지션 진입"
                        );
                        PositionState::InTrade(OpenPosition {
                            side,
                            entry_price: bar.close,
                            entry_time: bar.timestamp,
                            stop: levels.stop,
                            target: levels.target,
                        })
                    }
                    None => PositionState::Flat,
                },
            };
        }

        let open_position = match state {
            PositionState::InTrade(position) => Some(position),
            PositionState::Flat => None,
        };

        let report = BacktestReport::new(trades, open_position, bars.len());
        info!(
            trades = report.trades.len(),
            total_pnl = report.total_pnl(),
            open_position = report.open_position.is_some(),
            "백테스트 완료"
        );
        Ok(report)
    }

    fn close_position(
        &self,
        position: &OpenPosition,
        bar: &ScoredBar,
        reason: ExitReason,
    ) -> Trade {
        let exit_price = position.exit_level(reason);
        let move_ = exit_price - position.entry_price;
        let pnl = move_ * position.side.sign()
            - self.costs.commission
            - self.costs.slippage * move_.abs();

        Trade {
            side: position.side,
            entry_price: position.entry_price,
            entry_time: position.entry_time,
            stop: position.stop,
            target: position.target,
            exit_price,
            exit_time: bar.timestamp,
            reason,
            pnl,
        }
    }
}

fn validate_bars(bars: &[ScoredBar]) -> BacktestResult<()> {
    for window in bars.windows(2) {
        if window[0].timestamp >= window[1].timestamp {
            return Err(BacktestError::DataError(
                "바 데이터가 시간순으로 정렬되어 있지 않습니다".to_string(),
            ));
        }
    }
    if let Some(bar) = bars
        .iter()
        .find(|b| !b.close.is_finite() || !b.atr.is_finite())
    {
        return Err(BacktestError::DataError(format!(
            "유한하지 않은 종가/ATR: {}",
            bar.timestamp
        )));
    }
    Ok(())
}
