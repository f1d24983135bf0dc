//! 변환 처리 모듈
//!
//! 개별 파일의 읽기 → 변환 → 쓰기와, 폴더 단위 일괄 변환/병합을 담당합니다.
//! 파일 하나의 실패는 다른 파일의 처리를 중단시키지 않고 결과에 기록됩니다.

use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::Options;
use crate::error::{ConvertError, Result};
use crate::files::{self, JSON_EXTENSION, PROPERTIES_EXTENSION};
use crate::flatten::{self, FlatEntry};
use crate::merger::Merger;
use crate::pattern::FileFilter;

/// 파일 처리 결과
#[derive(Debug)]
pub struct ProcessResult {
    /// 소스 폴더 기준 입력 파일 경로
    pub file: PathBuf,
    /// 대상 폴더 기준 출력 파일 경로 (성공 시)
    pub output: Option<PathBuf>,
    /// 평탄화된 항목 (JSON → properties 성공 시)
    pub entries: Vec<FlatEntry>,
    /// 처리한 항목 수
    pub entry_count: usize,
    /// 에러 메시지 (실패 시)
    pub error: Option<String>,
    /// 읽은 바이트
    pub bytes_read: u64,
    /// 쓴 바이트
    pub bytes_written: u64,
}

impl ProcessResult {
    /// 실패 결과 생성
    pub fn failure(file: PathBuf, error: &ConvertError) -> Self {
        Self {
            file,
            output: None,
            entries: Vec::new(),
            entry_count: 0,
            error: Some(error.to_string()),
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// 성공 여부
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 병합/역병합 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// 병합 파일 이름
    pub file: PathBuf,
    /// 포함된 원본 이름 (순서 유지)
    pub origins: Vec<String>,
    /// 병합 파일의 항목 수
    pub entry_count: usize,
}

/// 일괄 변환 결과
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 파일별 결과 (목록 순서)
    pub results: Vec<ProcessResult>,
    /// 병합/역병합 결과 (병합 옵션이 있고 성공한 경우)
    pub merge: Option<MergeOutcome>,
    /// 파일 단위로 격리된 에러 (파일 경로, 메시지)
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// 성공한 파일 수
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// 에러가 하나도 없는지 확인
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// JSON 파일 하나를 properties 파일로 평탄화
///
/// # Arguments
/// * `src` - 소스 폴더
/// * `dist` - 대상 폴더
/// * `file` - 소스 폴더 기준 JSON 파일 경로
pub fn deflate_file(src: &Path, dist: &Path, file: &Path) -> ProcessResult {
    match deflate_file_internal(src, dist, file) {
        Ok(result) => result,
        Err(e) => ProcessResult::failure(file.to_path_buf(), &e),
    }
}

fn deflate_file_internal(src: &Path, dist: &Path, file: &Path) -> Result<ProcessResult> {
    let content = files::read_file(src, file)?;
    let json: Value = serde_json::from_str(&content).map_err(|e| ConvertError::ParseError {
        file: file.to_path_buf(),
        reason: e.to_string(),
    })?;

    let entries = flatten::deflate(&json);
    let output = files::output_name(file, PROPERTIES_EXTENSION);
    let bytes_written = files::write_file(dist, &output, &flatten::to_properties(&entries))?;

    Ok(ProcessResult {
        file: file.to_path_buf(),
        output: Some(output),
        entry_count: entries.len(),
        entries,
        error: None,
        bytes_read: content.len() as u64,
        bytes_written,
    })
}

/// properties 파일 하나를 JSON 파일로 복원
///
/// # Arguments
/// * `src` - 소스 폴더
/// * `dist` - 대상 폴더
/// * `file` - 소스 폴더 기준 properties 파일 경로
/// * `spaces` - JSON 들여쓰기 폭
pub fn inflate_file(src: &Path, dist: &Path, file: &Path, spaces: usize) -> ProcessResult {
    match inflate_file_internal(src, dist, file, spaces) {
        Ok(result) => result,
        Err(e) => ProcessResult::failure(file.to_path_buf(), &e),
    }
}

fn inflate_file_internal(
    src: &Path,
    dist: &Path,
    file: &Path,
    spaces: usize,
) -> Result<ProcessResult> {
    let content = files::read_file(src, file)?;
    let lines: Vec<&str> = content.lines().collect();
    let entry_count = lines.iter().filter(|l| !l.trim().is_empty()).count();

    let json = flatten::inflate(&lines)?;
    let output = files::output_name(file, JSON_EXTENSION);
    let text = files::render_json(&json, spaces, &output)?;
    let bytes_written = files::write_file(dist, &output, &text)?;

    Ok(ProcessResult {
        file: file.to_path_buf(),
        output: Some(output),
        entries: Vec::new(),
        entry_count,
        error: None,
        bytes_read: content.len() as u64,
        bytes_written,
    })
}

/// 옵션에 따라 변환할 파일 목록 수집
///
/// 역방향 변환에서는 병합 파일을 개별 변환 대상에서 제외합니다.
pub fn collect_files(options: &Options) -> Result<Vec<PathBuf>> {
    let extension = if options.reverse {
        PROPERTIES_EXTENSION
    } else {
        JSON_EXTENSION
    };

    let mut filter = FileFilter::new(extension, options.pattern.as_deref())?;
    if let (true, Some(merge)) = (options.reverse, options.merge_file()) {
        filter = filter.excluding(merge);
    }

    Ok(files::list_files(
        &options.config.src,
        &filter,
        options.max_depth,
    ))
}

/// 옵션에 따라 폴더 전체를 변환
///
/// 옵션 에러는 파일 처리 전에 바로 반환되고, 파일/병합 에러는 `BatchReport`에 모입니다.
pub fn process(options: &Options) -> Result<BatchReport> {
    options.validate()?;
    let files = collect_files(options)?;
    Ok(process_files(options, files, |_| {}))
}

/// 수집된 파일 목록을 병렬로 변환하고 병합/역병합까지 수행
///
/// # Arguments
/// * `options` - 검증된 변환 옵션
/// * `files` - 소스 폴더 기준 파일 목록
/// * `on_file` - 파일 하나의 처리가 끝날 때마다 호출 (완료 순서는 보장하지 않음)
pub fn process_files<F>(options: &Options, files: Vec<PathBuf>, on_file: F) -> BatchReport
where
    F: Fn(&ProcessResult) + Sync,
{
    let src = options.config.src.as_path();
    let dist = options.config.dist.as_path();

    let results: Vec<ProcessResult> = files
        .into_par_iter()
        .map(|file| {
            let result = if options.reverse {
                inflate_file(src, dist, &file, options.spaces)
            } else {
                // 병합 원본 이름이 될 수 없는 파일은 변환 전에 실패로 기록
                match options.merge_file().map(|_| origin_name(&file)) {
                    Some(Err(e)) => ProcessResult::failure(file.clone(), &e),
                    _ => deflate_file(src, dist, &file),
                }
            };
            on_file(&result);
            result
        })
        .collect();

    let mut report = BatchReport::default();
    for result in &results {
        if let Some(ref error) = result.error {
            report.errors.push((result.file.clone(), error.clone()));
        }
    }
    report.results = results;

    if let Some(merge) = options.merge_file() {
        let outcome = if options.reverse {
            reverse_merge(src, dist, merge, options.spaces)
        } else {
            merge_results(&mut report.results, dist, merge)
        };
        match outcome {
            Ok(outcome) => report.merge = Some(outcome),
            Err(e) => report.errors.push((PathBuf::from(merge), e.to_string())),
        }
    }

    report
}

/// 성공한 결과를 목록 순서대로 병합기에 등록하고 병합 파일 쓰기
fn merge_results(
    results: &mut [ProcessResult],
    dist: &Path,
    merge: &str,
) -> Result<MergeOutcome> {
    let mut merger = Merger::new();
    for result in results.iter_mut().filter(|r| r.is_success()) {
        let origin = origin_name(&result.file)?.to_string();
        merger.add_collection(origin, std::mem::take(&mut result.entries))?;
    }

    let merged = merger.merge_to(dist, merge)?;
    Ok(MergeOutcome {
        file: PathBuf::from(merge),
        origins: merger.origins().map(str::to_string).collect(),
        entry_count: merged.len(),
    })
}

/// 파일 경로를 병합 원본 이름으로 변환
///
/// 손실 변환은 서로 다른 파일을 같은 원본으로 만들 수 있으므로 UTF-8 경로만 허용합니다.
fn origin_name(file: &Path) -> Result<&str> {
    file.to_str().ok_or_else(|| ConvertError::InvalidOriginName {
        file: file.to_path_buf(),
    })
}

/// 병합 파일을 원본별 JSON 파일로 역병합
fn reverse_merge(src: &Path, dist: &Path, merge: &str, spaces: usize) -> Result<MergeOutcome> {
    let documents = Merger::new().reverse(src, dist, merge, spaces)?;
    let entry_count = documents
        .iter()
        .map(|(_, value)| flatten::deflate(value).len())
        .sum();

    Ok(MergeOutcome {
        file: PathBuf::from(merge),
        origins: documents.into_iter().map(|(origin, _)| origin).collect(),
        entry_count,
    })
}
