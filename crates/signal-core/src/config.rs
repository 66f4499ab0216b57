//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 모든 설정은 시작 시 한 번 로드되어 불변 값으로 각 컴포넌트에 전달됩니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SignalError, SignalResult};

/// 기본 추적 종목.
pub const DEFAULT_INSTRUMENT: &str = "Boom 300 Index";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 시그널/라벨/손절·익절 설정
    pub signal: SignalConfig,
    /// feature 계산 설정
    pub features: FeatureConfig,
    /// 백테스트 비용 설정
    pub backtest: BacktestCostConfig,
    /// 서버 설정
    pub server: ServerConfig,
    /// 파일 경로 설정
    pub paths: PathsConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 시그널 파이프라인 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    /// 추적 종목 이름 (라이브 요청의 `symbol`과 정확히 일치해야 함)
    pub instrument: String,
    /// 라벨 계산용 전방 바 수
    pub lookahead: usize,
    /// 라벨 수익률 임계값 (0.0015 = 0.15%)
    pub label_threshold: f64,
    /// 진입 확률 임계값
    pub decision_threshold: f64,
    /// 손절 ATR 배수
    pub sl_mult: f64,
    /// 익절 ATR 배수
    pub tp_mult: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            instrument: DEFAULT_INSTRUMENT.to_string(),
            lookahead: 10,
            label_threshold: 0.0015,
            decision_threshold: 0.55,
            sl_mult: 1.0,
            tp_mult: 2.0,
        }
    }
}

/// feature 계산 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// 수익률 스파이크 정규화용 롤링 표준편차 윈도우
    pub spike_window: usize,
    /// MACD 단기 EMA 기간
    pub macd_fast: usize,
    /// MACD 장기 EMA 기간
    pub macd_slow: usize,
    /// MACD 시그널 기간
    pub macd_signal: usize,
    /// RSI 기간
    pub rsi_period: usize,
    /// ATR 기간
    pub atr_period: usize,
    /// 엔벨로프 EMA 기간
    pub envelope_period: usize,
    /// 엔벨로프 폭 (0.003 = ±0.3%)
    pub envelope_pct: f64,
    /// 표준편차 하한
    pub std_floor: f64,
    /// 이 길이를 초과하는 시계열에서만 예측 모델을 호출
    pub forecast_min_len: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            spike_window: 20,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            atr_period: 14,
            envelope_period: 20,
            envelope_pct: 0.003,
            std_floor: 1e-9,
            forecast_min_len: 200,
        }
    }
}

impl FeatureConfig {
    /// 모든 지표가 정의되는 첫 바의 인덱스를 반환합니다.
    pub fn warmup_index(&self) -> usize {
        [
            // diff 한 칸 + 롤링 윈도우
            self.spike_window,
            (self.macd_slow.max(self.macd_fast) + self.macd_signal).saturating_sub(2),
            self.rsi_period,
            self.atr_period.saturating_sub(1),
            self.envelope_period.saturating_sub(1),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// feature 행을 하나 만들기 위해 필요한 최소 바 수 (가장 긴 롤링 윈도우).
    pub fn min_bars_required(&self) -> usize {
        self.warmup_index() + 1
    }
}

/// 백테스트 비용 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BacktestCostConfig {
    /// 거래당 고정 수수료 (가격 단위)
    pub commission: f64,
    /// 가격 이동폭 대비 슬리피지 비율
    pub slippage: f64,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 추론 요청 타임아웃 (밀리초)
    pub request_timeout_ms: u64,
    /// `/analyze` 요청 바디 최대 크기 (바이트)
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_ms: 2000,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// 파일 경로 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// 과거 바 CSV 파일
    pub bars: PathBuf,
    /// 학습된 분류기 파일
    pub model: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            bars: PathBuf::from("hist.csv"),
            model: PathBuf::from("model.json"),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `SIGNAL__SECTION__KEY` 형식으로 파일 값을 덮어씁니다.
    pub fn load(path: Option<&Path>) -> SignalResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        } else {
            builder = builder.add_source(config::File::with_name("config/default").required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("SIGNAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// 설정 값의 범위를 검증합니다.
    pub fn validate(&self) -> SignalResult<()> {
        let s = &self.signal;
        if s.instrument.trim().is_empty() {
            return Err(SignalError::Config("instrument는 비어 있을 수 없습니다".to_string()));
        }
        if s.lookahead == 0 {
            return Err(SignalError::Config("lookahead는 0보다 커야 합니다".to_string()));
        }
        if !(s.label_threshold > 0.0 && s.label_threshold < 1.0) {
            return Err(SignalError::Config(format!(
                "label_threshold는 (0, 1) 범위여야 합니다: {}",
                s.label_threshold
            )));
        }
        if !(s.decision_threshold > 0.0 && s.decision_threshold < 1.0) {
            return Err(SignalError::Config(format!(
                "decision_threshold는 (0, 1) 범위여야 합니다: {}",
                s.decision_threshold
            )));
        }
        if s.sl_mult < 0.0 || s.tp_mult < 0.0 {
            return Err(SignalError::Config("손절/익절 배수는 0 이상이어야 합니다".to_string()));
        }

        let f = &self.features;
        let periods = [
            ("spike_window", f.spike_window),
            ("macd_fast", f.macd_fast),
            ("macd_slow", f.macd_slow),
            ("macd_signal", f.macd_signal),
            ("rsi_period", f.rsi_period),
            ("atr_period", f.atr_period),
            ("envelope_period", f.envelope_period),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(SignalError::Config(format!("{}는 0보다 커야 합니다", name)));
            }
        }
        if f.spike_window < 2 {
            return Err(SignalError::Config("spike_window는 2 이상이어야 합니다".to_string()));
        }
        if f.macd_fast > f.macd_slow {
            return Err(SignalError::Config(
                "macd_fast는 macd_slow보다 클 수 없습니다".to_string(),
            ));
        }
        if !(f.envelope_pct >= 0.0 && f.envelope_pct < 1.0) {
            return Err(SignalError::Config(format!(
                "envelope_pct는 [0, 1) 범위여야 합니다: {}",
                f.envelope_pct
            )));
        }
        if f.std_floor <= 0.0 {
            return Err(SignalError::Config("std_floor는 0보다 커야 합니다".to_string()));
        }

        if self.server.max_body_bytes == 0 {
            return Err(SignalError::Config("max_body_bytes는 0보다 커야 합니다".to_string()));
        }

        let b = &self.backtest;
        if b.commission < 0.0 || b.slippage < 0.0 {
            return Err(SignalError::Config("수수료/슬리피지는 0 이상이어야 합니다".to_string()));
        }

        Ok(())
    }
}
