//! 평탄화(deflate) / 복원(inflate) 모듈
//!
//! 중첩된 JSON 값과 `key=value` 형식의 평탄한 항목 목록을 상호 변환합니다.
//!
//! # 키 인코딩
//!
//! - 경로 세그먼트는 `.`으로 연결됩니다.
//! - 세그먼트 안의 `\`, `.`, `=`는 `\`로 이스케이프됩니다. 개행은 `\n`, `\r`로 씁니다.
//! - 배열 인덱스처럼 보이는 객체 키(`"5"`)는 앞에 `\`를 붙여(`\5`) 객체 키로 유지합니다.
//! - 빈 객체 키는 `\e`로 씁니다.
//! - 루트 경로는 빈 키입니다.
//!
//! # 값 인코딩
//!
//! `null`, `true`/`false`, 숫자는 serde_json의 표준 표기로 씁니다.
//! 빈 객체와 빈 배열은 `{}`, `[]` 표식 항목으로 씁니다.
//! 문자열은 그대로 쓰되, 리터럴로 읽힐 수 있거나 `"`로 시작하거나 개행을 포함하면
//! JSON 문자열 리터럴(`"true"`)로 씁니다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ConvertError, Result};

/// 경로 구분자
pub const SEPARATOR: char = '.';
/// 키와 값의 구분자
pub const ASSIGN: char = '=';
/// 이스케이프 문자
pub const ESCAPE: char = '\\';

const EMPTY_SEGMENT: &str = "\\e";
const EMPTY_OBJECT: &str = "{}";
const EMPTY_ARRAY: &str = "[]";

/// 배열 인덱스 사이의 빈칸을 `null`로 채울 수 있는 최대 크기
const MAX_ARRAY_GAP: usize = 1 << 16;

/// 평탄화된 하나의 `key=value` 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    /// 이스케이프된 점(.) 경로
    pub key: String,
    /// 표준 표기로 렌더링된 값
    pub value: String,
}

impl FlatEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// properties 라인 하나를 첫 번째 이스케이프되지 않은 `=` 기준으로 분리
    ///
    /// # Arguments
    /// * `line` - 파싱할 라인 (끝의 `\r`은 무시)
    /// * `line_no` - 에러 보고용 1부터 시작하는 라인 번호
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut escaped = false;

        for (i, c) in line.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                ESCAPE => escaped = true,
                ASSIGN => return Ok(Self::new(&line[..i], &line[i + 1..])),
                _ => {}
            }
        }

        Err(ConvertError::MalformedEntry {
            line: line_no,
            content: line.to_string(),
        })
    }
}

impl fmt::Display for FlatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, ASSIGN, self.value)
    }
}

/// 항목 목록을 properties 파일 내용으로 변환 (라인마다 `\n`)
pub fn to_properties(entries: &[FlatEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

/// JSON 값을 깊이 우선으로 순회하여 평탄한 항목 목록으로 변환
///
/// 객체 키는 삽입 순서대로, 배열 요소는 인덱스 순서대로 방문합니다.
///
/// # Examples
/// ```
/// use jprops::flatten::deflate;
/// use serde_json::json;
///
/// let lines: Vec<String> = deflate(&json!({"a": {"b": 1, "c": [true, "x"]}}))
///     .iter()
///     .map(|e| e.to_string())
///     .collect();
/// assert_eq!(lines, ["a.b=1", "a.c.0=true", "a.c.1=x"]);
/// ```
pub fn deflate(value: &Value) -> Vec<FlatEntry> {
    let mut acc = Vec::new();
    let mut path = Vec::new();
    deflate_inner(value, &mut path, &mut acc);
    acc
}

fn deflate_inner(value: &Value, path: &mut Vec<String>, acc: &mut Vec<FlatEntry>) {
    match value {
        Value::Array(items) if items.is_empty() => {
            acc.push(FlatEntry::new(join_path(path), EMPTY_ARRAY));
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                deflate_inner(item, path, acc);
                path.pop();
            }
        }
        Value::Object(map) if map.is_empty() => {
            acc.push(FlatEntry::new(join_path(path), EMPTY_OBJECT));
        }
        Value::Object(map) => {
            for (key, item) in map {
                path.push(escape_segment(key));
                deflate_inner(item, path, acc);
                path.pop();
            }
        }
        leaf => acc.push(FlatEntry::new(join_path(path), render_leaf(leaf))),
    }
}

fn join_path(path: &[String]) -> String {
    path.join(".")
}

/// 객체 키 하나를 키 세그먼트로 이스케이프
pub fn escape_segment(name: &str) -> String {
    if name.is_empty() {
        return EMPTY_SEGMENT.to_string();
    }

    let mut out = String::with_capacity(name.len() + 2);
    if parse_index(name).is_some() {
        out.push(ESCAPE);
    }
    for c in name.chars() {
        match c {
            ESCAPE | SEPARATOR | ASSIGN => {
                out.push(ESCAPE);
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// 이스케이프된 세그먼트를 원래 이름으로 복원 (끝이 `\`로 끝나면 None)
pub fn unescape_segment(raw: &str) -> Option<String> {
    decode_segment(raw).map(|(name, _)| name)
}

/// 세그먼트를 복원하고 이스케이프가 포함되었는지 함께 반환
fn decode_segment(raw: &str) -> Option<(String, bool)> {
    let mut out = String::with_capacity(raw.len());
    let mut had_escape = false;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        had_escape = true;
        match chars.next()? {
            'e' => {}
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            other => out.push(other),
        }
    }

    Some((out, had_escape))
}

/// 키에서 첫 번째 이스케이프되지 않은 `.` 앞뒤를 분리
pub fn split_first_segment(key: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in key.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            SEPARATOR => return Some((&key[..i], &key[i + 1..])),
            _ => {}
        }
    }
    None
}

/// 경로 세그먼트
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn split_key(key: &str) -> Option<Vec<Segment>> {
    if key.is_empty() {
        return Some(Vec::new());
    }

    let mut segments = Vec::new();
    let mut rest = key;
    loop {
        let (raw, tail) = match split_first_segment(rest) {
            Some((raw, tail)) => (raw, Some(tail)),
            None => (rest, None),
        };

        let (name, had_escape) = decode_segment(raw)?;
        let segment = match parse_index(&name) {
            Some(index) if !had_escape => Segment::Index(index),
            _ => Segment::Key(name),
        };
        segments.push(segment);

        match tail {
            Some(tail) => rest = tail,
            None => return Some(segments),
        }
    }
}

/// `0` 또는 0으로 시작하지 않는 숫자열만 배열 인덱스로 인정
fn parse_index(text: &str) -> Option<usize> {
    let valid = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text.len() == 1 || !text.starts_with('0'));
    if valid {
        text.parse().ok()
    } else {
        None
    }
}

fn render_leaf(value: &Value) -> String {
    match value {
        Value::String(s) => render_string(s),
        other => other.to_string(),
    }
}

fn render_string(s: &str) -> String {
    let needs_quotes =
        s.starts_with('"') || s.contains(['\n', '\r']) || parse_literal(s).is_some();
    if needs_quotes {
        Value::String(s.to_string()).to_string()
    } else {
        s.to_string()
    }
}

/// 렌더링된 값 문자열을 JSON 값으로 복원
pub fn parse_value(raw: &str) -> Value {
    if raw.starts_with('"') {
        if let Ok(Value::String(s)) = serde_json::from_str::<Value>(raw) {
            return Value::String(s);
        }
    }
    parse_literal(raw).unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_literal(raw: &str) -> Option<Value> {
    match raw {
        "null" => Some(Value::Null),
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        EMPTY_OBJECT => Some(Value::Object(Map::new())),
        EMPTY_ARRAY => Some(Value::Array(Vec::new())),
        _ if raw.starts_with(|c: char| c == '-' || c.is_ascii_digit()) => {
            serde_json::from_str::<Number>(raw).ok().map(Value::Number)
        }
        _ => None,
    }
}

/// 복원 중인 트리의 노드
#[derive(Debug)]
enum Node {
    Vacant,
    Leaf(Value),
    Array(Vec<Node>),
    Object(ObjectNode),
}

/// 삽입 순서를 보존하는 객체 노드
#[derive(Debug, Default)]
struct ObjectNode {
    positions: HashMap<String, usize>,
    items: Vec<(String, Node)>,
}

impl ObjectNode {
    fn entry(&mut self, key: &str) -> &mut Node {
        let pos = match self.positions.get(key) {
            Some(&pos) => pos,
            None => {
                self.items.push((key.to_string(), Node::Vacant));
                self.positions.insert(key.to_string(), self.items.len() - 1);
                self.items.len() - 1
            }
        };
        &mut self.items[pos].1
    }

    fn get(&self, key: &str) -> Option<&Node> {
        self.positions.get(key).map(|&pos| &self.items[pos].1)
    }
}

impl Node {
    /// 트리를 바꾸지 않고 경로 끝에 새 값을 둘 수 있는지 확인
    fn accepts(&self, segments: &[Segment]) -> bool {
        let Some((first, rest)) = segments.split_first() else {
            return matches!(self, Node::Vacant);
        };
        match (self, first) {
            (Node::Vacant, _) => segments.iter().all(|segment| match segment {
                Segment::Index(index) => *index <= MAX_ARRAY_GAP,
                Segment::Key(_) => true,
            }),
            (Node::Array(items), Segment::Index(index)) => match items.get(*index) {
                Some(child) => child.accepts(rest),
                None => *index - items.len() <= MAX_ARRAY_GAP && Node::Vacant.accepts(rest),
            },
            (Node::Object(object), Segment::Key(key)) => match object.get(key) {
                Some(child) => child.accepts(rest),
                None => Node::Vacant.accepts(rest),
            },
            _ => false,
        }
    }

    /// 세그먼트가 가리키는 자식 노드 (구조가 맞지 않으면 None)
    fn child(&mut self, segment: &Segment) -> Option<&mut Node> {
        match segment {
            Segment::Index(index) => {
                // 노드를 바꾸기 전에 간격부터 확인
                let len = match self {
                    Node::Vacant => 0,
                    Node::Array(items) => items.len(),
                    _ => return None,
                };
                if *index > len && *index - len > MAX_ARRAY_GAP {
                    return None;
                }
                if let Node::Vacant = self {
                    *self = Node::Array(Vec::new());
                }
                match self {
                    Node::Array(items) => {
                        if *index >= items.len() {
                            items.resize_with(index + 1, || Node::Vacant);
                        }
                        items.get_mut(*index)
                    }
                    _ => None,
                }
            }
            Segment::Key(key) => {
                if let Node::Vacant = self {
                    *self = Node::Object(ObjectNode::default());
                }
                match self {
                    Node::Object(object) => Some(object.entry(key)),
                    _ => None,
                }
            }
        }
    }

    fn into_value(self) -> Value {
        match self {
            Node::Vacant => Value::Null,
            Node::Leaf(value) => value,
            Node::Array(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
            Node::Object(object) => Value::Object(
                object
                    .items
                    .into_iter()
                    .map(|(key, node)| (key, node.into_value()))
                    .collect(),
            ),
        }
    }
}

/// 평탄한 항목을 하나씩 받아 중첩 JSON 값을 조립하는 복원기
#[derive(Debug)]
pub struct Unflattener {
    root: Node,
}

impl Default for Unflattener {
    fn default() -> Self {
        Self::new()
    }
}

impl Unflattener {
    pub fn new() -> Self {
        Self { root: Node::Vacant }
    }

    /// 항목 하나를 트리에 추가
    ///
    /// # Errors
    /// * `MalformedEntry` - 키가 `\`로 끝남
    /// * `PathConflict` - 이미 값이 있는 노드를 다시 쓰거나 객체/배열 구조가 어긋남
    pub fn insert(&mut self, line: usize, entry: &FlatEntry) -> Result<()> {
        let conflict = || ConvertError::PathConflict {
            line,
            key: entry.key.clone(),
        };

        let segments = split_key(&entry.key).ok_or_else(|| ConvertError::MalformedEntry {
            line,
            content: entry.to_string(),
        })?;

        // 실패한 항목이 빈 노드를 남기지 않도록 먼저 확인
        if !self.root.accepts(&segments) {
            return Err(conflict());
        }

        let mut node = &mut self.root;
        for segment in &segments {
            node = node.child(segment).ok_or_else(conflict)?;
        }

        if !matches!(node, Node::Vacant) {
            return Err(conflict());
        }
        *node = Node::Leaf(parse_value(&entry.value));
        Ok(())
    }

    /// 조립된 JSON 값 반환 (항목이 없으면 `null`)
    pub fn finish(self) -> Value {
        self.root.into_value()
    }
}

/// properties 라인 목록을 중첩 JSON 값으로 복원
///
/// 빈 라인은 건너뜁니다.
///
/// # Examples
/// ```
/// use jprops::flatten::inflate;
/// use serde_json::json;
///
/// let value = inflate(["a.b=1", "a.c.0=true", "a.c.1=x"]).unwrap();
/// assert_eq!(value, json!({"a": {"b": 1, "c": [true, "x"]}}));
/// ```
pub fn inflate<I, S>(lines: I) -> Result<Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unflattener = Unflattener::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let entry = FlatEntry::parse(line, index + 1)?;
        unflattener.insert(index + 1, &entry)?;
    }

    Ok(unflattener.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(value: &Value) -> Vec<String> {
        deflate(value).iter().map(|e| e.to_string()).collect()
    }

    fn round_trip(value: Value) {
        let result = inflate(lines(&value)).unwrap();
        assert_eq!(result, value);
    }

    #[test]
    fn test_deflate_nested() {
        let value = json!({"a": {"b": 1, "c": [true, "x"]}});
        assert_eq!(lines(&value), vec!["a.b=1", "a.c.0=true", "a.c.1=x"]);
    }

    #[test]
    fn test_deflate_preserves_key_order() {
        let value = json!({"z": 1, "a": 2, "m": 3});
        assert_eq!(lines(&value), vec!["z=1", "a=2", "m=3"]);
    }

    #[test]
    fn test_deflate_null_and_empty_string() {
        let value = json!({"n": null, "s": ""});
        assert_eq!(lines(&value), vec!["n=null", "s="]);
    }

    #[test]
    fn test_deflate_empty_containers() {
        let value = json!({"o": {}, "a": [], "nested": [{}]});
        assert_eq!(lines(&value), vec!["o={}", "a=[]", "nested.0={}"]);
    }

    #[test]
    fn test_escape_segment() {
        assert_eq!(escape_segment("a.b"), "a\\.b");
        assert_eq!(escape_segment("a=b"), "a\\=b");
        assert_eq!(escape_segment("a\\b"), "a\\\\b");
        assert_eq!(escape_segment("5"), "\\5");
        assert_eq!(escape_segment("05"), "05");
        assert_eq!(escape_segment(""), "\\e");
        assert_eq!(escape_segment("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_unescape_segment() {
        assert_eq!(unescape_segment("a\\.b"), Some("a.b".to_string()));
        assert_eq!(unescape_segment("\\e"), Some(String::new()));
        assert_eq!(unescape_segment("dangling\\"), None);
    }

    #[test]
    fn test_split_first_segment() {
        assert_eq!(split_first_segment("a\\.b.c.d"), Some(("a\\.b", "c.d")));
        assert_eq!(split_first_segment("file\\.json."), Some(("file\\.json", "")));
        assert_eq!(split_first_segment("plain"), None);
    }

    #[test]
    fn test_string_literal_collisions_are_quoted() {
        let value = json!({"a": "true", "b": "null", "c": "42", "d": "{}", "e": "\"q\""});
        assert_eq!(
            lines(&value),
            vec![
                "a=\"true\"",
                "b=\"null\"",
                "c=\"42\"",
                "d=\"{}\"",
                "e=\"\\\"q\\\"\""
            ]
        );
        round_trip(value);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("false"), json!(false));
        assert_eq!(parse_value("-1.5"), json!(-1.5));
        assert_eq!(parse_value(""), json!(""));
        assert_eq!(parse_value("hello world"), json!("hello world"));
        assert_eq!(parse_value("\"true\""), json!("true"));
        assert_eq!(parse_value("\"unterminated"), json!("\"unterminated"));
        assert_eq!(parse_value("1.2.3"), json!("1.2.3"));
    }

    #[test]
    fn test_inflate_example() {
        let value = inflate(["a.b=1", "a.c.0=true", "a.c.1=x"]).unwrap();
        assert_eq!(value, json!({"a": {"b": 1, "c": [true, "x"]}}));
    }

    #[test]
    fn test_inflate_value_with_equals_sign() {
        let value = inflate(["url=http://x?a=b"]).unwrap();
        assert_eq!(value, json!({"url": "http://x?a=b"}));
    }

    #[test]
    fn test_inflate_skips_blank_lines_and_crlf() {
        let value = inflate(["a=1\r", "", "b=2\r"]).unwrap();
        assert_eq!(value, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_inflate_pads_array_gaps() {
        let value = inflate(["list.2=c"]).unwrap();
        assert_eq!(value, json!({"list": [null, null, "c"]}));
    }

    #[test]
    fn test_inflate_empty_input() {
        let value = inflate(Vec::<String>::new()).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_inflate_malformed_entry() {
        let err = inflate(["noEqualsSign"]).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedEntry { line: 1, .. }));
    }

    #[test]
    fn test_inflate_escaped_equals_is_not_separator() {
        let err = inflate(["ok=1", "a\\=b"]).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedEntry { line: 2, .. }));
    }

    #[test]
    fn test_inflate_dangling_escape() {
        let err = inflate(["a\\\\\\=1"]).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedEntry { .. }));
    }

    #[test]
    fn test_inflate_path_conflict_object_then_array() {
        let err = inflate(["a.b=1", "a.0=2"]).unwrap_err();
        match err {
            ConvertError::PathConflict { line, key } => {
                assert_eq!(line, 2);
                assert_eq!(key, "a.0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_inflate_path_conflict_through_leaf() {
        let err = inflate(["a=1", "a.b=2"]).unwrap_err();
        assert!(matches!(err, ConvertError::PathConflict { line: 2, .. }));
    }

    #[test]
    fn test_inflate_path_conflict_duplicate_key() {
        let err = inflate(["a=1", "a=2"]).unwrap_err();
        assert!(matches!(err, ConvertError::PathConflict { line: 2, .. }));
    }

    #[test]
    fn test_inflate_rejects_huge_index_gap() {
        let err = inflate(["a.99999999=1"]).unwrap_err();
        assert!(matches!(err, ConvertError::PathConflict { .. }));
    }

    #[test]
    fn test_rejected_index_gap_leaves_no_trace() {
        let mut unflattener = Unflattener::new();
        let err = unflattener
            .insert(1, &FlatEntry::new("fresh.99999999", "1"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::PathConflict { line: 1, .. }));

        unflattener.insert(2, &FlatEntry::new("ok", "1")).unwrap();
        assert_eq!(unflattener.finish(), json!({"ok": 1}));
    }

    #[test]
    fn test_rejected_entry_leaves_existing_tree_unchanged() {
        let mut unflattener = Unflattener::new();
        unflattener.insert(1, &FlatEntry::new("a.x", "1")).unwrap();

        for (line, key) in [(2, "a.b.c.99999999"), (3, "a.x.y"), (4, "list.5.0.x.99999999")] {
            let err = unflattener.insert(line, &FlatEntry::new(key, "1")).unwrap_err();
            assert!(matches!(err, ConvertError::PathConflict { .. }));
        }

        assert_eq!(unflattener.finish(), json!({"a": {"x": 1}}));
    }

    #[test]
    fn test_round_trip_dotted_names() {
        round_trip(json!({"a.b": {"c.d": "x"}, "e\\f": 1, "g=h": 2}));
    }

    #[test]
    fn test_round_trip_numeric_object_keys() {
        round_trip(json!({"0": "zero", "10": {"1": true}, "items": ["x", "y"]}));
    }

    #[test]
    fn test_round_trip_empty_key() {
        round_trip(json!({"": 1, "a": {"": "x"}}));
    }

    #[test]
    fn test_round_trip_scalars_at_root() {
        round_trip(json!(null));
        round_trip(json!(3.25));
        round_trip(json!("text"));
        round_trip(json!(""));
        round_trip(json!([]));
        round_trip(json!({}));
    }

    #[test]
    fn test_round_trip_root_array() {
        round_trip(json!([1, [2, [3, {}]], {"k": []}]));
    }

    #[test]
    fn test_round_trip_strings_with_special_characters() {
        round_trip(json!({
            "multi": "line\nbreak",
            "cr": "a\rb",
            "spaces": "  padded  ",
            "unicode": "한글 ✓",
            "backslash": "C:\\path",
            "number_like": "1e5",
        }));
    }

    #[test]
    fn test_round_trip_numbers() {
        round_trip(json!({"i": -42, "u": 18446744073709551615u64, "f": 0.1, "e": 1e300}));
    }

    #[test]
    fn test_flat_entry_serializes_as_record() {
        let entry = FlatEntry::new("a.b", "1");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, json!({"key": "a.b", "value": "1"}));
    }

    #[test]
    fn test_to_properties() {
        let entries = vec![FlatEntry::new("a", "1"), FlatEntry::new("b", "x")];
        assert_eq!(to_properties(&entries), "a=1\nb=x\n");
    }
}
