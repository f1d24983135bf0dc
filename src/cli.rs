//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Options, DEFAULT_MAX_DEPTH, DEFAULT_SPACES};

/// jprops CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "jprops",
    author = "YourName <your@email.com>",
    version,
    about = "JSON <-> PROPERTIES CONVERTER - JSON 파일과 properties 파일을 상호 변환하고 병합하는 CLI 도구",
    long_about = r#"
JSON <-> PROPERTIES CONVERTER
=============================

소스 폴더의 JSON 파일을 점(.) 경로 키를 가진 properties 파일로 평탄화하거나,
properties 파일을 다시 중첩된 JSON 파일로 복원합니다.

특징:
  • 키 순서 보존, 무손실 왕복 변환
  • 여러 파일을 원본 이름 접두사로 구분해 하나의 파일로 병합
  • 병합 파일을 원본별 JSON 파일로 역병합
  • 병렬 처리 및 파일별 오류 격리

예제:
  jprops --src ./i18n --dist ./out
  jprops --src ./i18n --dist ./out --merge all.properties
  jprops --src ./out --dist ./i18n --reverse --merge all.properties
  jprops --src ./out --dist ./i18n --reverse --spaces 2
"#
)]
pub struct Args {
    /// 소스 폴더 경로 (기본값: 현재 폴더)
    #[arg(short, long)]
    pub src: Option<PathBuf>,

    /// 대상 폴더 경로 (기본값: 현재 폴더)
    #[arg(short, long)]
    pub dist: Option<PathBuf>,

    /// properties → JSON 방향으로 변환
    #[arg(short, long)]
    pub reverse: bool,

    /// 생성되는 JSON의 들여쓰기 폭 (0이면 한 줄)
    #[arg(long, default_value_t = DEFAULT_SPACES)]
    pub spaces: usize,

    /// 병합 파일 이름 (지정하지 않으면 병합 안 함)
    #[arg(short, long)]
    pub merge: Option<String>,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "messages_*", "data?.json")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 최대 폴더 탐색 깊이 (1이면 소스 폴더 바로 아래만)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl Args {
    /// 명령줄 인자를 변환 옵션으로 변환 (지정하지 않은 값은 기본값)
    pub fn to_options(&self) -> Options {
        let mut options = Options::new()
            .with_reverse(self.reverse)
            .with_spaces(self.spaces)
            .with_merge(self.merge.clone())
            .with_pattern(self.pattern.clone())
            .with_max_depth(self.max_depth);

        if let Some(ref src) = self.src {
            options = options.with_src(src);
        }
        if let Some(ref dist) = self.dist {
            options = options.with_dist(dist);
        }

        options
    }
}
