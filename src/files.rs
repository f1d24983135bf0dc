//! 파일 입출력 모듈
//!
//! 폴더 탐색, 파일 읽기/쓰기, JSON 텍스트 생성을 담당합니다.

use memmap2::Mmap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};
use crate::pattern::FileFilter;

/// JSON 파일 확장자
pub const JSON_EXTENSION: &str = "json";
/// properties 파일 확장자
pub const PROPERTIES_EXTENSION: &str = "properties";

/// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// 폴더에서 필터를 통과하는 파일 목록을 상대 경로로 반환
///
/// # Arguments
/// * `dir` - 탐색할 폴더
/// * `filter` - 확장자/패턴 필터
/// * `max_depth` - 최대 탐색 깊이 (1이면 `dir` 바로 아래만)
///
/// # Returns
/// 이름순으로 정렬된 상대 경로 목록
pub fn list_files(dir: &Path, filter: &FileFilter, max_depth: usize) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .filter(|relative| filter.matches(relative))
        .collect()
}

/// 파일 전체를 UTF-8 문자열로 읽기
pub fn read_file(dir: &Path, file: &Path) -> Result<String> {
    let path = dir.join(file);
    let open_error = |reason: String| ConvertError::FileOpenError {
        file: path.clone(),
        reason,
    };

    let file_size = fs::metadata(&path)
        .map(|m| m.len())
        .map_err(|e| open_error(e.to_string()))?;

    if file_size < MMAP_THRESHOLD {
        return fs::read_to_string(&path).map_err(|e| open_error(e.to_string()));
    }

    // 대용량 파일: 메모리 매핑 사용
    let handle = File::open(&path).map_err(|e| open_error(e.to_string()))?;
    let mmap = unsafe {
        Mmap::map(&handle).map_err(|e| open_error(format!("메모리 매핑 실패: {}", e)))?
    };
    std::str::from_utf8(&mmap)
        .map(str::to_string)
        .map_err(|e| open_error(format!("UTF-8 텍스트가 아닙니다: {}", e)))
}

/// 파일을 라인 단위로 읽기 (`\n`, `\r\n` 모두 허용)
pub fn read_lines(dir: &Path, file: &Path) -> Result<Vec<String>> {
    let content = read_file(dir, file)?;
    Ok(content.lines().map(str::to_string).collect())
}

/// 파일 쓰기 (상위 폴더가 없으면 생성)
///
/// # Returns
/// 쓴 바이트 수
pub fn write_file(dir: &Path, file: &Path, content: &str) -> Result<u64> {
    let path = dir.join(file);
    let write_error = |e: std::io::Error| ConvertError::WriteError {
        file: path.clone(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(&path, content).map_err(write_error)?;

    Ok(content.len() as u64)
}

/// JSON 값을 지정한 들여쓰기 폭으로 직렬화 (0이면 한 줄)
///
/// # Examples
/// ```
/// use jprops::files::render_json;
/// use serde_json::json;
/// use std::path::Path;
///
/// let text = render_json(&json!({"a": 1}), 2, Path::new("a.json")).unwrap();
/// assert_eq!(text, "{\n  \"a\": 1\n}\n");
/// ```
pub fn render_json(value: &Value, spaces: usize, file: &Path) -> Result<String> {
    let serialize_error = |e: serde_json::Error| ConvertError::SerializeError {
        file: file.to_path_buf(),
        reason: e.to_string(),
    };

    let mut text = if spaces == 0 {
        serde_json::to_string(value).map_err(serialize_error)?
    } else {
        let indent = " ".repeat(spaces);
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer).map_err(serialize_error)?;
        String::from_utf8(buf).map_err(|e| ConvertError::SerializeError {
            file: file.to_path_buf(),
            reason: e.to_string(),
        })?
    };

    text.push('\n');
    Ok(text)
}

/// 같은 이름에 확장자만 바꾼 출력 파일 경로
pub fn output_name(file: &Path, extension: &str) -> PathBuf {
    file.with_extension(extension)
}

/// 병합 원본 이름으로부터 JSON 출력 파일 경로 생성 (`.json`이 없으면 덧붙임)
pub fn json_name_for_origin(origin: &str) -> PathBuf {
    let path = Path::new(origin);
    let is_json = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case(JSON_EXTENSION))
        .unwrap_or(false);

    if is_json {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{}.{}", origin, JSON_EXTENSION))
    }
}
