//! 에러 타입 정의 모듈
//!
//! jprops에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// jprops에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 구분자 `=`가 없는 properties 라인
    #[error("잘못된 항목 (라인 {line}): {content}")]
    MalformedEntry { line: usize, content: String },

    /// 같은 노드를 객체와 배열(또는 값)로 동시에 사용하는 경로
    #[error("경로 충돌 (라인 {line}): {key}")]
    PathConflict { line: usize, key: String },

    /// 같은 이름으로 두 번 등록된 컬렉션
    #[error("이미 등록된 원본입니다: {origin}")]
    DuplicateOrigin { origin: String },

    /// 원본 파일을 알 수 없는 병합 키
    #[error("원본을 알 수 없는 병합 키 (라인 {line}): {key}")]
    UnknownOriginPrefix { line: usize, key: String },

    /// UTF-8이 아니어서 병합 원본 이름으로 쓸 수 없는 파일 경로
    #[error("병합 원본 이름으로 쓸 수 없는 경로 (UTF-8 아님): {file}")]
    InvalidOriginName { file: PathBuf },

    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpenError { file: PathBuf, reason: String },

    /// JSON 파싱 실패
    #[error("JSON 파싱 실패 ({file}): {reason}")]
    ParseError { file: PathBuf, reason: String },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({file}): {reason}")]
    SerializeError { file: PathBuf, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    WriteError { file: PathBuf, reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 유효하지 않은 옵션 값
    #[error("유효하지 않은 옵션 ({option}): {reason}")]
    InvalidOption { option: String, reason: String },
}

/// jprops 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;
