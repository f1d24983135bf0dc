//! 변환 옵션 모듈
//!
//! 명시적인 기본값을 가진 변환 설정 구조체와 유효성 검사를 담당합니다.

use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// 기본 JSON 들여쓰기 폭
pub const DEFAULT_SPACES: usize = 4;
/// 허용하는 최대 JSON 들여쓰기 폭
pub const MAX_SPACES: usize = 16;
/// 기본 폴더 탐색 깊이 (소스 폴더 바로 아래만)
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// 소스/대상 폴더 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 소스 폴더 (기본값: 현재 작업 폴더)
    pub src: PathBuf,
    /// 대상 폴더 (기본값: 현재 작업 폴더)
    pub dist: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            src: cwd.clone(),
            dist: cwd,
        }
    }
}

/// 변환 옵션
#[derive(Debug, Clone)]
pub struct Options {
    /// 폴더 설정
    pub config: Config,
    /// true면 properties → JSON, false면 JSON → properties
    pub reverse: bool,
    /// 생성되는 JSON의 들여쓰기 폭 (0이면 한 줄)
    pub spaces: usize,
    /// 병합 파일 이름 (None이면 병합 안 함)
    pub merge: Option<String>,
    /// 파일 이름 글로브 패턴
    pub pattern: Option<String>,
    /// 최대 폴더 탐색 깊이
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: Config::default(),
            reverse: false,
            spaces: DEFAULT_SPACES,
            merge: None,
            pattern: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 소스 폴더 설정
    pub fn with_src(mut self, src: impl Into<PathBuf>) -> Self {
        self.config.src = src.into();
        self
    }

    /// 대상 폴더 설정
    pub fn with_dist(mut self, dist: impl Into<PathBuf>) -> Self {
        self.config.dist = dist.into();
        self
    }

    /// 변환 방향 설정
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// JSON 들여쓰기 폭 설정
    pub fn with_spaces(mut self, spaces: usize) -> Self {
        self.spaces = spaces;
        self
    }

    /// 병합 파일 이름 설정 (빈 문자열이면 병합 안 함)
    pub fn with_merge(mut self, merge: Option<String>) -> Self {
        self.merge = merge.filter(|m| !m.is_empty());
        self
    }

    /// 파일 이름 패턴 설정
    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    /// 최대 탐색 깊이 설정
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 병합 파일 이름 (설정된 경우)
    pub fn merge_file(&self) -> Option<&str> {
        self.merge.as_deref()
    }

    /// 파일 처리 전에 옵션 유효성 검사
    pub fn validate(&self) -> Result<()> {
        let src = &self.config.src;
        if !src.exists() {
            return Err(ConvertError::InputNotFound { path: src.clone() });
        }
        if !src.is_dir() {
            return Err(ConvertError::NotADirectory { path: src.clone() });
        }
        if self.config.dist.is_file() {
            return Err(ConvertError::NotADirectory {
                path: self.config.dist.clone(),
            });
        }

        if self.spaces > MAX_SPACES {
            return Err(ConvertError::InvalidOption {
                option: "spaces".to_string(),
                reason: format!("0에서 {} 사이여야 합니다 (입력값: {})", MAX_SPACES, self.spaces),
            });
        }

        if self.max_depth == 0 {
            return Err(ConvertError::InvalidOption {
                option: "max-depth".to_string(),
                reason: "1 이상이어야 합니다".to_string(),
            });
        }

        if let Some(merge) = self.merge_file() {
            let path = Path::new(merge);
            let plain_name = path.file_name().map(|n| n == path.as_os_str()).unwrap_or(false);
            if !plain_name {
                return Err(ConvertError::InvalidOption {
                    option: "merge".to_string(),
                    reason: format!("폴더 경로가 아닌 파일 이름이어야 합니다: {}", merge),
                });
            }
        }

        Ok(())
    }
}
