//! 바 병합 명령어.
//!
//! 새로 받은 바 CSV를 이력 파일에 병합합니다. 타임스탬프가 겹치면
//! 새 파일의 값을 유지하고, 결과는 시간순으로 다시 기록합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! signal merge -i new_bars.csv
//! signal merge -i new_bars.csv --history data/hist.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use signal_core::merge_bars;
use tracing::{debug, info};

use crate::store::{read_bars, write_bars};

/// 병합 명령 설정
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// 새 바 CSV 경로
    pub input: PathBuf,
    /// 이력 CSV 경로 (없으면 새로 생성)
    pub history: PathBuf,
}

/// 병합 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// 기존 이력 바 수
    pub existing: usize,
    /// 입력 파일 바 수
    pub incoming: usize,
    /// 병합 후 바 수
    pub total: usize,
}

impl MergeStats {
    /// 새로 추가된 바 수 (덮어쓴 바 제외).
    pub fn added(&self) -> usize {
        self.total.saturating_sub(self.existing)
    }
}

/// 병합을 실행합니다.
pub fn run_merge(config: &MergeConfig) -> Result<MergeStats> {
    let incoming = read_bars(&config.input)
        .with_context(|| format!("입력 파일 읽기 실패: {}", config.input.display()))?;

    let existing = if config.history.exists() {
        read_bars(&config.history)
            .with_context(|| format!("이력 파일 읽기 실패: {}", config.history.display()))?
    } else {
        debug!(path = %config.history.display(), "이력 파일이 없어 새로 생성합니다");
        Vec::new()
    };

    let merged = merge_bars(&existing, &incoming);
    write_bars(&config.history, &merged)
        .with_context(|| format!("이력 파일 쓰기 실패: {}", config.history.display()))?;

    let stats = MergeStats {
        existing: existing.len(),
        incoming: incoming.len(),
        total: merged.len(),
    };
    info!(
        existing = stats.existing,
        incoming = stats.incoming,
        total = stats.total,
        "Appended {} new bars",
        stats.added()
    );
    Ok(stats)
}
