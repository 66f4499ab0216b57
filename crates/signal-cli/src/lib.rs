//! 시그널 엔진 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 바 이력 CSV 병합
//! - 분류기 학습
//! - 백테스트 실행 및 결과 저장

pub mod commands;
pub mod store;
