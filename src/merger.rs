//! 병합 모듈
//!
//! 여러 파일의 평탄화 결과를 원본 이름 접두사로 구분하여 하나의 properties 파일로 합치고,
//! 병합된 파일을 다시 원본별 JSON 문서로 나눕니다.
//!
//! 병합 키는 `이스케이프된 원본 이름` + `.` + `원래 키` 형식입니다.
//! 원본 이름은 키 세그먼트와 같은 규칙으로 이스케이프되므로 `en.json` 같은 이름도
//! 첫 번째 이스케이프되지 않은 `.` 기준으로 정확히 분리됩니다.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Component, Path};

use crate::error::{ConvertError, Result};
use crate::files;
use crate::flatten::{
    escape_segment, split_first_segment, to_properties, unescape_segment, FlatEntry, Unflattener,
    SEPARATOR,
};

/// 원본 파일 하나의 평탄화 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// 원본 파일 이름
    pub origin: String,
    /// 순회 순서대로의 항목
    pub entries: Vec<FlatEntry>,
}

/// 컬렉션을 등록 순서대로 모아 병합/역병합하는 병합기
#[derive(Debug, Default)]
pub struct Merger {
    collections: Vec<Collection>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 원본 이름으로 컬렉션 등록
    ///
    /// # Errors
    /// 같은 이름이 이미 등록되어 있으면 `DuplicateOrigin`
    pub fn add_collection(
        &mut self,
        origin: impl Into<String>,
        entries: Vec<FlatEntry>,
    ) -> Result<()> {
        let origin = origin.into();
        if self.collection(&origin).is_some() {
            return Err(ConvertError::DuplicateOrigin { origin });
        }
        self.collections.push(Collection { origin, entries });
        Ok(())
    }

    /// 원본 이름으로 등록된 컬렉션 조회
    pub fn collection(&self, origin: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.origin == origin)
    }

    /// 등록 순서대로의 원본 이름
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.origin.as_str())
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// 모든 컬렉션을 원본 이름 접두사를 붙여 하나의 항목 목록으로 병합
    ///
    /// 등록 순서, 그 안에서는 순회 순서를 유지합니다.
    ///
    /// # Examples
    /// ```
    /// use jprops::flatten::FlatEntry;
    /// use jprops::merger::Merger;
    ///
    /// let mut merger = Merger::new();
    /// merger.add_collection("f1", vec![FlatEntry::new("a", "1")]).unwrap();
    /// merger.add_collection("f2", vec![FlatEntry::new("a", "2")]).unwrap();
    ///
    /// let merged: Vec<String> = merger.merge().iter().map(|e| e.to_string()).collect();
    /// assert_eq!(merged, ["f1.a=1", "f2.a=2"]);
    /// ```
    pub fn merge(&self) -> Vec<FlatEntry> {
        self.collections
            .iter()
            .flat_map(|collection| {
                let prefix = escape_segment(&collection.origin);
                collection.entries.iter().map(move |entry| {
                    FlatEntry::new(
                        format!("{}{}{}", prefix, SEPARATOR, entry.key),
                        entry.value.clone(),
                    )
                })
            })
            .collect()
    }

    /// 병합 결과를 `dist/merge_file`에 쓰고 반환
    pub fn merge_to(&self, dist: &Path, merge_file: &str) -> Result<Vec<FlatEntry>> {
        let merged = self.merge();
        files::write_file(dist, Path::new(merge_file), &to_properties(&merged))?;
        Ok(merged)
    }

    /// 병합된 라인 목록을 원본별 JSON 값으로 복원
    ///
    /// 원본은 처음 등장한 순서대로 반환됩니다. 컬렉션이 등록된 병합기에서는
    /// 등록된 원본만 허용합니다.
    ///
    /// # Errors
    /// * `MalformedEntry` - `=`가 없는 라인
    /// * `UnknownOriginPrefix` - 원본 접두사를 찾을 수 없는 키
    /// * `PathConflict` - 원본 문서 안의 구조 충돌
    pub fn reverse_entries<I, S>(&self, lines: I) -> Result<Vec<(String, Value)>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Unflattener)> = Vec::new();

        for (index, line) in lines.into_iter().enumerate() {
            let line_no = index + 1;
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }

            let entry = FlatEntry::parse(line, line_no)?;
            let (origin, key) = self.attribute(&entry.key, line_no)?;

            let pos = match positions.get(&origin) {
                Some(&pos) => pos,
                None => {
                    groups.push((origin.clone(), Unflattener::new()));
                    positions.insert(origin, groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[pos]
                .1
                .insert(line_no, &FlatEntry::new(key, entry.value))?;
        }

        Ok(groups
            .into_iter()
            .map(|(origin, unflattener)| (origin, unflattener.finish()))
            .collect())
    }

    /// 병합 키에서 원본 이름과 원래 키를 분리
    fn attribute<'k>(&self, key: &'k str, line: usize) -> Result<(String, &'k str)> {
        let unknown = || ConvertError::UnknownOriginPrefix {
            line,
            key: key.to_string(),
        };

        let (raw_origin, rest) = split_first_segment(key).ok_or_else(unknown)?;
        let origin = unescape_segment(raw_origin)
            .filter(|origin| !origin.is_empty())
            .ok_or_else(unknown)?;

        if !is_relative_origin(&origin) {
            return Err(unknown());
        }

        if !self.is_empty() && self.collection(&origin).is_none() {
            return Err(unknown());
        }

        Ok((origin, rest))
    }

    /// `src/merge_file`을 읽어 원본별 JSON 파일을 `dist`에 쓰기
    ///
    /// # Arguments
    /// * `src` - 병합 파일이 있는 폴더
    /// * `dist` - 원본별 JSON 파일을 쓸 폴더
    /// * `merge_file` - 병합 파일 이름
    /// * `spaces` - JSON 들여쓰기 폭
    ///
    /// # Returns
    /// 원본 이름과 복원된 JSON 값 목록
    pub fn reverse(
        &self,
        src: &Path,
        dist: &Path,
        merge_file: &str,
        spaces: usize,
    ) -> Result<Vec<(String, Value)>> {
        let lines = files::read_lines(src, Path::new(merge_file))?;
        let documents = self.reverse_entries(&lines)?;

        for (origin, value) in &documents {
            let target = files::json_name_for_origin(origin);
            let text = files::render_json(value, spaces, &target)?;
            files::write_file(dist, &target, &text)?;
        }

        Ok(documents)
    }
}

/// 원본 이름이 대상 폴더 안의 상대 경로인지 확인 (`..`, 절대 경로 거부)
fn is_relative_origin(origin: &str) -> bool {
    Path::new(origin).components().all(|component| {
        !matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::deflate;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn lines(entries: &[FlatEntry]) -> Vec<String> {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_duplicate_origin() {
        let mut merger = Merger::new();
        merger.add_collection("f1", vec![]).unwrap();

        let err = merger.add_collection("f1", vec![]).unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateOrigin { ref origin } if origin == "f1"));
        assert_eq!(merger.len(), 1);
    }

    #[test]
    fn test_merge_keys_are_unique_per_origin() {
        let mut merger = Merger::new();
        merger
            .add_collection("f1", deflate(&json!({"a": {"b": 1}})))
            .unwrap();
        merger
            .add_collection("f2", deflate(&json!({"a": {"b": 2}})))
            .unwrap();

        assert_eq!(lines(&merger.merge()), vec!["f1.a.b=1", "f2.a.b=2"]);
    }

    #[test]
    fn test_merge_escapes_origin_names() {
        let mut merger = Merger::new();
        merger
            .add_collection("en.json", vec![FlatEntry::new("title", "Hello")])
            .unwrap();

        assert_eq!(lines(&merger.merge()), vec!["en\\.json.title=Hello"]);
    }

    #[test]
    fn test_merge_preserves_registration_order() {
        let mut merger = Merger::new();
        merger.add_collection("z", deflate(&json!({"k": [1, 2]}))).unwrap();
        merger.add_collection("a", deflate(&json!({"k": 3}))).unwrap();

        assert_eq!(lines(&merger.merge()), vec!["z.k.0=1", "z.k.1=2", "a.k=3"]);
        assert_eq!(merger.origins().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_reverse_recovers_documents() {
        let first = json!({"a": 1, "nested": {"x.y": [true, null]}});
        let second = json!({"a": 2, "empty": {}});

        let mut merger = Merger::new();
        merger.add_collection("f1.json", deflate(&first)).unwrap();
        merger.add_collection("f2.json", deflate(&second)).unwrap();
        let merged = lines(&merger.merge());

        let documents = Merger::new().reverse_entries(&merged).unwrap();
        assert_eq!(
            documents,
            vec![
                ("f1.json".to_string(), first),
                ("f2.json".to_string(), second)
            ]
        );
    }

    #[test]
    fn test_reverse_root_scalar_origin() {
        let mut merger = Merger::new();
        merger.add_collection("scalar", deflate(&json!("text"))).unwrap();
        let merged = lines(&merger.merge());
        assert_eq!(merged, vec!["scalar.=text"]);

        let documents = Merger::new().reverse_entries(&merged).unwrap();
        assert_eq!(documents, vec![("scalar".to_string(), json!("text"))]);
    }

    #[test]
    fn test_reverse_unknown_prefix() {
        let err = Merger::new().reverse_entries(["noprefix=1"]).unwrap_err();
        assert!(matches!(err, ConvertError::UnknownOriginPrefix { line: 1, .. }));

        let err = Merger::new().reverse_entries(["\\e.a=1"]).unwrap_err();
        assert!(matches!(err, ConvertError::UnknownOriginPrefix { .. }));
    }

    #[test]
    fn test_reverse_rejects_unregistered_origin() {
        let mut merger = Merger::new();
        merger.add_collection("f1", vec![]).unwrap();

        assert!(merger.reverse_entries(["f1.a=1"]).is_ok());
        let err = merger.reverse_entries(["f1.a=1", "f3.a=1"]).unwrap_err();
        assert!(matches!(err, ConvertError::UnknownOriginPrefix { line: 2, .. }));
    }

    #[test]
    fn test_reverse_rejects_parent_dir_origin() {
        let err = Merger::new()
            .reverse_entries(["\\.\\./evil.pwned=1"])
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownOriginPrefix { line: 1, .. }));

        let err = Merger::new()
            .reverse_entries(["ok.a=1", "sub/\\.\\./\\.\\./x.a=1"])
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownOriginPrefix { line: 2, .. }));
    }

    #[test]
    fn test_reverse_rejects_absolute_origin() {
        let err = Merger::new().reverse_entries(["/tmp/x.a=1"]).unwrap_err();
        assert!(matches!(err, ConvertError::UnknownOriginPrefix { line: 1, .. }));
    }

    #[test]
    fn test_reverse_accepts_nested_origin() {
        let documents = Merger::new()
            .reverse_entries(["sub/a\\.json.k=1"])
            .unwrap();
        assert_eq!(documents, vec![("sub/a.json".to_string(), json!({"k": 1}))]);
    }

    #[test]
    fn test_reverse_does_not_write_outside_dist() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dist = temp_dir.path().join("dist");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("all.properties"), "\\.\\./evil.pwned=1\n").unwrap();

        let err = Merger::new()
            .reverse(&src, &dist, "all.properties", 2)
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownOriginPrefix { line: 1, .. }));
        assert!(!temp_dir.path().join("evil.json").exists());
        assert!(!dist.exists());
    }

    #[test]
    fn test_reverse_malformed_line() {
        let err = Merger::new().reverse_entries(["f1.a=1", "broken"]).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedEntry { line: 2, .. }));
    }

    #[test]
    fn test_merge_to_and_reverse_files() {
        let temp_dir = TempDir::new().unwrap();
        let dist = temp_dir.path();

        let mut merger = Merger::new();
        merger
            .add_collection("en.json", deflate(&json!({"greeting": "hi"})))
            .unwrap();
        merger
            .add_collection("ko.json", deflate(&json!({"greeting": "안녕"})))
            .unwrap();
        merger.merge_to(dist, "all.properties").unwrap();

        let merged = fs::read_to_string(dist.join("all.properties")).unwrap();
        assert_eq!(merged, "en\\.json.greeting=hi\nko\\.json.greeting=안녕\n");

        let out = dist.join("out");
        let documents = Merger::new()
            .reverse(dist, &out, "all.properties", 2)
            .unwrap();
        assert_eq!(documents.len(), 2);

        let en = fs::read_to_string(out.join("en.json")).unwrap();
        assert_eq!(en, "{\n  \"greeting\": \"hi\"\n}\n");
        let ko: Value = serde_json::from_str(&fs::read_to_string(out.join("ko.json")).unwrap()).unwrap();
        assert_eq!(ko, json!({"greeting": "안녕"}));
    }
}
