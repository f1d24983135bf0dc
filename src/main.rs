//! jprops - JSON <-> PROPERTIES CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use jprops::{
    cli::Args,
    config::Options,
    processor::{collect_files, process_files, BatchReport},
    stats::Statistics,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("스레드 풀 초기화 실패")?;
    }

    // 옵션 확인 (파일 처리 전)
    let options = args.to_options();
    options.validate().context("옵션 확인 실패")?;

    // 헤더 출력
    print_header(&args, &options);

    // 변환 대상 파일 수집
    let files = collect_files(&options).context("파일 목록 수집 실패")?;

    if files.is_empty() && options.merge_file().is_none() {
        println!("{}", "⚠️ 처리할 파일이 없습니다.".yellow());
        return Ok(());
    }

    println!(
        "  {} 발견된 파일 수: {}",
        "📋".bright_white(),
        files.len().to_string().bright_green()
    );

    // 드라이런 모드
    if args.dry_run {
        print_dry_run(&files, &options);
        return Ok(());
    }

    // 통계 초기화
    let stats = Statistics::new(files.len());

    run_conversion(&args, &options, files, &stats)
}

/// 헤더 출력
fn print_header(args: &Args, options: &Options) {
    let direction = if options.reverse {
        "properties → JSON"
    } else {
        "JSON → properties"
    };

    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🔁 JSON <-> PROPERTIES CONVERTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 소스 폴더: {:?}", "📂".bright_cyan(), options.config.src);
    println!("  {} 대상 폴더: {:?}", "📄".bright_green(), options.config.dist);
    println!("  {} 방향: {}", "⚙️".bright_yellow(), direction);

    if options.reverse {
        println!("  {} 들여쓰기: {}", "📏".bright_white(), options.spaces);
    }

    if let Some(merge) = options.merge_file() {
        println!("  {} 병합 파일: {}", "🧩".bright_magenta(), merge);
    }

    if let Some(ref pattern) = options.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 드라이런 출력
fn print_dry_run(files: &[PathBuf], options: &Options) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, path) in files.iter().enumerate() {
        println!("  {}. {:?}", i + 1, path);
    }
    if let Some(merge) = options.merge_file() {
        let action = if options.reverse { "역병합" } else { "병합" };
        println!("  {} {} 대상: {}", "🧩".bright_magenta(), action, merge);
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 변환 실행
fn run_conversion(
    args: &Args,
    options: &Options,
    files: Vec<PathBuf>,
    stats: &Statistics,
) -> Result<()> {
    // 진행률 바 설정
    let pb = create_progress_bar(files.len())?;

    println!("\n{}", "⚡ 병렬 처리 중...".bright_cyan());

    let report = process_files(options, files, |result| {
        stats.record(result);
        pb.inc(1);

        if args.verbose && result.is_success() {
            pb.println(format!(
                "  {} {:?} → {:?} ({} 항목)",
                "✓".green(),
                result.file,
                result.output.as_deref().unwrap_or(Path::new("")),
                result.entry_count
            ));
        }
    });

    pb.finish_with_message("완료!");

    print_merge(&report, options.reverse);

    // 에러 출력
    print_errors(&report.errors, args.verbose);

    // 로그 파일 작성
    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &report.errors)?;
    }

    // 통계 출력
    stats.print_summary();

    if report.is_clean() {
        println!(
            "\n{} 변환 완료: {:?}\n",
            "✅".bright_green(),
            options.config.dist
        );
    } else {
        println!(
            "\n{} {} 개의 오류가 있습니다.\n",
            "⚠️".bright_yellow(),
            report.errors.len().to_string().red()
        );
    }

    Ok(())
}

/// 병합/역병합 결과 출력
fn print_merge(report: &BatchReport, reverse: bool) {
    let Some(ref outcome) = report.merge else {
        return;
    };

    let action = if reverse { "역병합" } else { "병합" };
    println!(
        "\n{} {} 완료: {:?} ({} 개 원본, {} 항목)",
        "🧩".bright_magenta(),
        action,
        outcome.file,
        outcome.origins.len().to_string().bright_green(),
        outcome.entry_count
    );
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .context("진행률 바 템플릿 오류")?
            .progress_chars("█▓▒░"),
    );
    Ok(pb)
}

/// 에러 목록 출력
fn print_errors(errors: &[(PathBuf, String)], verbose: bool) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "❌ 오류 발생 파일:".bright_red());
    for (path, error) in errors {
        println!("  {} {:?}", "•".red(), path);
        if verbose {
            println!("    {}", error.dimmed());
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, errors: &[(PathBuf, String)]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("로그 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "jprops 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for (path, error) in errors {
        writeln!(log_file, "\n파일: {:?}", path)?;
        writeln!(log_file, "에러: {}", error)?;
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
