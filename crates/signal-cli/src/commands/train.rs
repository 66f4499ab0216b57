//! 학습 명령어.
//!
//! 바 이력으로 feature와 라벨을 만들고 소프트맥스 분류기를 학습해
//! 모델 파일로 저장합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! signal train
//! signal train --epochs 1000 --learning-rate 0.05 -o models/boom300.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use signal_analytics::{
    FeatureEngine, Labeler, LinearTrendForecaster, SoftmaxParams, Trainer, TrainingReport,
};
use signal_core::{FeatureConfig, SignalConfig};
use tracing::info;

use crate::store::read_bars;

/// 학습 명령 설정
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// 바 이력 CSV 경로
    pub bars_path: PathBuf,
    /// 모델 저장 경로
    pub model_path: PathBuf,
    /// 시그널/라벨 설정
    pub signal: SignalConfig,
    /// feature 설정
    pub features: FeatureConfig,
    /// 학습 하이퍼파라미터
    pub params: SoftmaxParams,
    /// 검증 구간 비율
    pub holdout_ratio: f64,
    /// 진행 표시 여부
    pub show_progress: bool,
}

/// 학습을 실행하고 모델을 저장합니다.
pub fn run_train(config: &TrainConfig) -> Result<TrainingReport> {
    let bars = read_bars(&config.bars_path)
        .with_context(|| format!("바 이력 읽기 실패: {}", config.bars_path.display()))?;
    info!(bars = bars.len(), path = %config.bars_path.display(), "Loaded bar history");

    let engine = FeatureEngine::new(
        config.features.clone(),
        Arc::new(LinearTrendForecaster::new()),
    );
    let trainer = Trainer::new(engine, Labeler::from_config(&config.signal), config.params)
        .with_holdout_ratio(config.holdout_ratio);

    let pb = if config.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("{}개 바로 분류기 학습 중...", bars.len()));
        Some(pb)
    } else {
        None
    };

    let result = trainer.train(&bars);
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let (model, report) = result.context("분류기 학습 실패")?;

    model
        .save(&config.model_path)
        .with_context(|| format!("모델 저장 실패: {}", config.model_path.display()))?;
    info!(path = %config.model_path.display(), "Model saved");

    Ok(report)
}

/// 학습 결과를 출력합니다.
pub fn print_report(report: &TrainingReport) {
    println!("\n분류기 학습 결과");
    println!("═══════════════════════════════════════");
    println!(
        "샘플: {} (학습 {} / 검증 {})",
        report.samples, report.train_samples, report.holdout_samples
    );
    println!(
        "라벨 분포: NEUTRAL {} / UP {} / DOWN {}",
        report.class_counts.neutral, report.class_counts.up, report.class_counts.down
    );
    println!("학습 정확도: {:.1}%", report.train_accuracy * 100.0);
    match report.holdout_accuracy {
        Some(acc) => println!("검증 정확도: {:.1}%", acc * 100.0),
        None => println!("검증 정확도: -"),
    }
    println!("═══════════════════════════════════════");
}
