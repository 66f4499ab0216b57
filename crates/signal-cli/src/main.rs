//! 시그널 엔진 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 새로 받은 1분봉을 이력에 병합
//! signal merge -i new_bars.csv
//!
//! # 이력 전체로 분류기 학습
//! signal train
//!
//! # 최근 30일 백테스트 (수수료/슬리피지 포함)
//! signal backtest -d 30 --commission 0.05 --slippage 0.1
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use signal_analytics::SoftmaxParams;
use signal_cli::commands::backtest::{run_backtest, BacktestCliConfig};
use signal_cli::commands::merge::{run_merge, MergeConfig};
use signal_cli::commands::train::{print_report, run_train, TrainConfig};
use signal_core::{init_logging, AppConfig, BacktestCostConfig};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "signal")]
#[command(about = "Signal engine CLI - 1분봉 ML 시그널 학습/백테스트 도구", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/default.toml, 없으면 기본값)
    #[arg(short, long, global = true, env = "SIGNAL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 새 바 CSV를 이력 파일에 병합
    Merge {
        /// 새 바 CSV 경로
        #[arg(short, long)]
        input: PathBuf,

        /// 이력 CSV 경로 (기본: 설정의 paths.bars)
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// 바 이력으로 분류기 학습
    Train {
        /// 모델 저장 경로 (기본: 설정의 paths.model)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 전체 배치 반복 횟수
        #[arg(long, default_value = "500")]
        epochs: usize,

        /// 학습률
        #[arg(long, default_value = "0.1")]
        learning_rate: f64,

        /// L2 정규화 강도
        #[arg(long, default_value = "0.0001")]
        l2: f64,

        /// 검증 구간 비율
        #[arg(long, default_value = "0.2")]
        holdout: f64,
    },

    /// 저장된 모델로 최근 N일 백테스트
    Backtest {
        /// 조회 일수
        #[arg(short, long, default_value = "30")]
        days: u32,

        /// 거래당 고정 수수료 (기본: 설정의 backtest.commission)
        #[arg(long)]
        commission: Option<f64>,

        /// 가격 이동폭 대비 슬리피지 비율 (기본: 설정의 backtest.slippage)
        #[arg(long)]
        slippage: Option<f64>,

        /// 결과 CSV 디렉토리
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("설정 로드 실패")?;
    init_logging(&config.logging).map_err(|e| anyhow!(e))?;

    match cli.command {
        Commands::Merge { input, history } => {
            let merge = MergeConfig {
                input,
                history: history.unwrap_or_else(|| config.paths.bars.clone()),
            };

            match run_merge(&merge) {
                Ok(stats) => {
                    println!(
                        "\n✅ 병합 완료: {} → {} 바 (신규 {})",
                        stats.existing,
                        stats.total,
                        stats.added()
                    );
                }
                Err(e) => {
                    error!("Merge failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Train {
            output,
            epochs,
            learning_rate,
            l2,
            holdout,
        } => {
            let train = TrainConfig {
                bars_path: config.paths.bars.clone(),
                model_path: output.unwrap_or_else(|| config.paths.model.clone()),
                signal: config.signal.clone(),
                features: config.features.clone(),
                params: SoftmaxParams {
                    learning_rate,
                    epochs,
                    l2,
                },
                holdout_ratio: holdout,
                show_progress: true,
            };

            match run_train(&train) {
                Ok(report) => {
                    print_report(&report);
                    info!("✅ Model saved to {}", train.model_path.display());
                }
                Err(e) => {
                    error!("Training failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Backtest {
            days,
            commission,
            slippage,
            output_dir,
        } => {
            let backtest = BacktestCliConfig {
                days,
                bars_path: config.paths.bars.clone(),
                model_path: config.paths.model.clone(),
                output_dir,
                signal: config.signal.clone(),
                features: config.features.clone(),
                costs: BacktestCostConfig {
                    commission: commission.unwrap_or(config.backtest.commission),
                    slippage: slippage.unwrap_or(config.backtest.slippage),
                },
            };

            match run_backtest(&backtest) {
                Ok(report) => {
                    println!("\n{}", report.summary());
                    if let Some(position) = &report.open_position {
                        println!(
                            "미청산 포지션: {} @ {:.5} (SL {:.5} / TP {:.5})",
                            position.side, position.entry_price, position.stop, position.target
                        );
                    }
                    if !report.trades.is_empty() {
                        println!("결과 저장: {}", backtest.output_path().display());
                    }
                }
                Err(e) => {
                    error!("Backtest failed: {:#}", e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
