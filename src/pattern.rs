//! 파일 필터 모듈
//!
//! 확장자, glob 패턴, 제외 파일 이름으로 변환 대상 파일을 고릅니다.

use glob::Pattern;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// 변환 대상 파일 필터
#[derive(Debug, Clone)]
pub struct FileFilter {
    extension: String,
    pattern: Option<Pattern>,
    excluded: Option<String>,
}

impl FileFilter {
    /// 새 파일 필터 생성
    ///
    /// # Arguments
    /// * `extension` - 허용할 확장자 (점 없이, 대소문자 무시)
    /// * `pattern` - 파일 이름 글로브 패턴 (None이면 모든 이름 허용)
    ///
    /// # Examples
    /// ```
    /// use jprops::pattern::FileFilter;
    /// use std::path::Path;
    ///
    /// let filter = FileFilter::new("json", Some("*_en*")).unwrap();
    /// assert!(filter.matches(Path::new("messages_en.json")));
    /// assert!(!filter.matches(Path::new("messages_en.properties")));
    /// assert!(!filter.matches(Path::new("messages_ko.json")));
    /// ```
    pub fn new(extension: &str, pattern: Option<&str>) -> Result<Self> {
        let compiled = match pattern {
            Some(p) => Some(Pattern::new(p).map_err(|_| ConvertError::InvalidPattern {
                pattern: p.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            extension: extension.to_string(),
            pattern: compiled,
            excluded: None,
        })
    }

    /// 특정 파일(소스 폴더 기준 상대 경로)을 대상에서 제외
    pub fn excluding(mut self, name: impl Into<String>) -> Self {
        self.excluded = Some(name.into());
        self
    }

    /// 소스 폴더 기준 상대 경로가 필터를 통과하는지 확인
    pub fn matches(&self, relative: &Path) -> bool {
        let extension_ok = relative
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false);
        if !extension_ok {
            return false;
        }

        if let Some(ref excluded) = self.excluded {
            if relative == Path::new(excluded) {
                return false;
            }
        }

        match &self.pattern {
            Some(p) => relative
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| p.matches(s))
                .unwrap_or(false),
            None => true,
        }
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}
