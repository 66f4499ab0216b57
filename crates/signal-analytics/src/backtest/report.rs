//! 백테스트 리포트.
//!
//! 거래 원장, 누적 손익 곡선, 요약 통계와 CSV 내보내기를 제공합니다.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{ExitReason, OpenPosition, Side, Trade};

use super::engine::BacktestResult;

/// 백테스트 결과 리포트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// 청산이 끝난 거래 (시간순)
    pub trades: Vec<Trade>,
    /// 거래별 누적 손익 (원장 순서)
    pub equity_curve: Vec<f64>,
    /// 시계열 끝까지 청산되지 않은 포지션
    pub open_position: Option<OpenPosition>,
    /// 처리한 바 수
    pub data_points: usize,
}

/// 요약 통계
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// 총 거래 수
    pub trades: usize,
    /// 수익 거래 수
    pub wins: usize,
    /// 손실/본전 거래 수
    pub losses: usize,
    /// 승률 (0.0 ~ 1.0)
    pub win_rate: f64,
    /// 총 손익
    pub total_pnl: f64,
    /// 최대 낙폭 (누적 손익 기준 절대값)
    pub max_drawdown: f64,
}

impl std::fmt::Display for BacktestSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "백테스트 결과 요약\n\
             ═══════════════════════════════════════\n\
             총 거래: {}\n\
             승/패: {} / {}\n\
             승률: {:.1}%\n\
             ───────────────────────────────────────\n\
             총 손익: {:.5}\n\
             최대 낙폭: {:.5}\n\
             ═══════════════════════════════════════",
            self.trades,
            self.wins,
            self.losses,
            self.win_rate * 100.0,
            self.total_pnl,
            self.max_drawdown,
        )
    }
}

/// CSV 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 진입 시각
    pub open_time: DateTime<Utc>,
    /// 방향
    pub side: Side,
    /// 진입가
    pub entry: f64,
    /// 손절가
    pub sl: f64,
    /// 익절가
    pub tp: f64,
    /// 청산가
    pub exit: f64,
    /// 청산 시각
    pub exit_time: DateTime<Utc>,
    /// 손익
    pub pnl: f64,
    /// 청산 사유
    pub reason: ExitReason,
    /// 누적 손익
    pub cumulative_equity: f64,
}

impl BacktestReport {
    /// 원장에서 리포트를 만들고 누적 손익 곡선을 계산합니다.
    pub fn new(trades: Vec<Trade>, open_position: Option<OpenPosition>, data_points: usize) -> Self {
        let equity_curve = trades
            .iter()
            .scan(0.0, |equity, trade| {
                *equity += trade.pnl;
                Some(*equity)
            })
            .collect();

        Self {
            trades,
            equity_curve,
            open_position,
            data_points,
        }
    }

    /// 총 손익.
    pub fn total_pnl(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(0.0)
    }

    /// 누적 손익 곡선의 최대 낙폭 (시작 자산 0 기준).
    pub fn max_drawdown(&self) -> f64 {
        let mut peak = 0.0_f64;
        let mut max_dd = 0.0_f64;
        for &equity in &self.equity_curve {
            peak = peak.max(equity);
            max_dd = max_dd.max(peak - equity);
        }
        max_dd
    }

    /// 요약 통계 계산.
    pub fn summary(&self) -> BacktestSummary {
        let trades = self.trades.len();
        let wins = self.trades.iter().filter(|t| t.is_win()).count();
        BacktestSummary {
            trades,
            wins,
            losses: trades - wins,
            win_rate: if trades == 0 {
                0.0
            } else {
                wins as f64 / trades as f64
            },
            total_pnl: self.total_pnl(),
            max_drawdown: self.max_drawdown(),
        }
    }

    /// 내보내기용 행 목록.
    pub fn records(&self) -> Vec<TradeRecord> {
        self.trades
            .iter()
            .zip(self.equity_curve.iter())
            .map(|(trade, &equity)| TradeRecord {
                open_time: trade.entry_time,
                side: trade.side,
                entry: trade.entry_price,
                sl: trade.stop,
                tp: trade.target,
                exit: trade.exit_price,
                exit_time: trade.exit_time,
                pnl: trade.pnl,
                reason: trade.reason,
                cumulative_equity: equity,
            })
            .collect()
    }

    /// CSV로 기록합니다. 거래가 없어도 헤더는 기록됩니다.
    pub fn write_csv<W: Write>(&self, writer: W) -> BacktestResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record([
            "open_time",
            "side",
            "entry",
            "sl",
            "tp",
            "exit",
            "exit_time",
            "pnl",
            "reason",
            "cumulative_equity",
        ])?;
        for record in self.records() {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// CSV 파일로 저장합니다.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> BacktestResult<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)
    }
}
