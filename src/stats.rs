//! 통계 및 유틸리티 모듈
//!
//! 처리 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::processor::ProcessResult;

/// 처리 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 파일 수
    pub total_files: usize,
    /// 성공 처리 수
    pub success_count: AtomicUsize,
    /// 에러 발생 수
    pub error_count: AtomicUsize,
    /// 처리한 총 항목 수
    pub entry_count: AtomicUsize,
    /// 읽은 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 파일 하나의 처리 결과 반영
    pub fn record(&self, result: &ProcessResult) {
        if result.is_success() {
            self.increment_success();
        } else {
            self.increment_error();
        }
        self.add_entries(result.entry_count);
        self.add_bytes_read(result.bytes_read);
        self.add_bytes_written(result.bytes_written);
    }

    /// 성공 카운트 증가
    pub fn increment_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 에러 카운트 증가
    pub fn increment_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 항목 수 추가
    pub fn add_entries(&self, count: usize) {
        self.entry_count.fetch_add(count, Ordering::Relaxed);
    }

    /// 읽은 바이트 추가
    pub fn add_bytes_read(&self, bytes: u64) {
        self.total_bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// 쓴 바이트 추가
    pub fn add_bytes_written(&self, bytes: u64) {
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// 성공 수 반환
    pub fn get_success_count(&self) -> usize {
        self.success_count.load(Ordering::Relaxed)
    }

    /// 에러 수 반환
    pub fn get_error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// 항목 수 반환
    pub fn get_entry_count(&self) -> usize {
        self.entry_count.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        let success = self.get_success_count();
        let errors = self.get_error_count();
        let bytes_read = self.total_bytes_read.load(Ordering::Relaxed);
        let bytes_written = self.total_bytes_written.load(Ordering::Relaxed);

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 파일:    {}",
            "📁".bright_cyan(),
            self.total_files
        );
        println!(
            "  {} 성공:         {}",
            "✅".bright_green(),
            success.to_string().green()
        );

        if errors > 0 {
            println!(
                "  {} 실패:         {}",
                "❌".bright_red(),
                errors.to_string().red()
            );
        } else {
            println!("  {} 실패:         {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 항목 수:      {}",
            "🔑".bright_yellow(),
            self.get_entry_count()
        );
        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(bytes_written)
        );

        if self.total_files > 0 {
            let success_rate = (success as f64 / self.total_files as f64) * 100.0;
            println!(
                "  {} 성공률:       {:.1}%",
                "📈".bright_white(),
                success_rate
            );
        }

        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use jprops::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
