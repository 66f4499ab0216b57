//! 바 이력 CSV 저장소.
//!
//! 헤더는 `timestamp,open,high,low,close,volume` 입니다.
//! 타임스탬프는 RFC 3339, Unix 초, `YYYY-MM-DD HH:MM:SS`(UTC) 형식을 읽을 수 있으며
//! 쓸 때는 항상 RFC 3339(초 단위, `Z`)로 기록합니다.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{Bar, SignalError, SignalResult};

/// CSV 한 행.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BarRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

impl BarRecord {
    fn into_bar(self, line: usize) -> SignalResult<Bar> {
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            SignalError::Data(format!(
                "{}행: 타임스탬프를 해석할 수 없습니다: {}",
                line, self.timestamp
            ))
        })?;
        Ok(Bar::new(
            timestamp, self.open, self.high, self.low, self.close, self.volume,
        ))
    }
}

impl From<&Bar> for BarRecord {
    fn from(bar: &Bar) -> Self {
        Self {
            timestamp: bar.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// 타임스탬프 문자열을 UTC 시각으로 변환합니다.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn csv_error(err: csv::Error) -> SignalError {
    SignalError::Data(format!("CSV 에러: {}", err))
}

/// 리더에서 바를 읽습니다. 파일 순서를 그대로 유지합니다.
pub fn read_bars_from<R: Read>(reader: R) -> SignalResult<Vec<Bar>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, result) in csv_reader.deserialize::<BarRecord>().enumerate() {
        let record = result.map_err(csv_error)?;
        // 헤더가 1행
        bars.push(record.into_bar(i + 2)?);
    }
    Ok(bars)
}

/// CSV 파일에서 바를 읽습니다.
pub fn read_bars(path: impl AsRef<Path>) -> SignalResult<Vec<Bar>> {
    let file = File::open(path.as_ref())?;
    read_bars_from(file)
}

/// 바를 CSV로 씁니다.
pub fn write_bars_to<W: Write>(writer: W, bars: &[Bar]) -> SignalResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for bar in bars {
        csv_writer.serialize(BarRecord::from(bar)).map_err(csv_error)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 바를 CSV 파일로 저장합니다 (덮어쓰기).
pub fn write_bars(path: impl AsRef<Path>, bars: &[Bar]) -> SignalResult<()> {
    let file = File::create(path.as_ref())?;
    write_bars_to(file, bars)
}
