//! jprops - JSON <-> PROPERTIES CONVERTER
//!
//! 중첩된 JSON 파일과 점(.) 경로 키를 가진 `key=value` properties 파일을 상호 변환하고,
//! 여러 파일을 하나로 병합하거나 병합 파일을 원본별로 다시 나누는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🔁 **무손실 왕복 변환**: `inflate(deflate(v)) == v`, 키 순서 보존
//! - 🔤 **키 이스케이프**: `.`, `=`, `\` 를 포함한 키, 숫자 모양 객체 키, 빈 키 지원
//! - 🧩 **병합 / 역병합**: 원본 파일 이름 접두사로 키 충돌 없이 병합하고 다시 분리
//! - 🚀 **병렬 처리**: Rayon을 활용한 파일 단위 병렬 변환, 파일별 오류 격리
//! - 🔍 **패턴 필터링**: glob 형식의 파일 이름 필터링
//! - 🎨 **컬러 출력**: 진행률 표시와 처리 통계
//!
//! # 예제
//!
//! ```bash
//! # JSON → properties, 하나의 파일로 병합
//! jprops --src ./i18n --dist ./out --merge all.properties
//!
//! # properties → JSON, 병합 파일도 원본별로 복원
//! jprops --src ./out --dist ./i18n --reverse --merge all.properties
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod flatten;
pub mod merger;
pub mod pattern;
pub mod processor;
pub mod stats;

// Re-exports for convenient access
pub use cli::Args;
pub use config::{Config, Options};
pub use error::{ConvertError, Result};
pub use flatten::{deflate, inflate, FlatEntry, Unflattener};
pub use merger::{Collection, Merger};
pub use pattern::FileFilter;
pub use processor::{process, BatchReport, MergeOutcome, ProcessResult};
pub use stats::{format_bytes, Statistics};
