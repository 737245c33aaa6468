//! 文字カテゴリ定義
//!
//! `char.def`で定義される文字カテゴリを管理します。
//! 16ビットの各コード単位に対して、主カテゴリIDと互換カテゴリのビット集合を保持し、
//! 未知語処理で使う起動・グループ化の規則をカテゴリごとに持ちます。

use std::io::{BufRead, BufReader, Read};

use hashbrown::HashMap;

use crate::codec::ByteBuffer;
use crate::errors::{Result, SumomoError};
use crate::utils::FromU32;

/// 必ず定義されていなければならないカテゴリ名
pub const DEFAULT_CATEGORY: &str = "DEFAULT";

/// 定義できるカテゴリ数の上限（互換カテゴリを32ビットで表すため）
pub const MAX_CATEGORIES: usize = 32;

const NUM_CODE_UNITS: usize = 0x10000;

/// 1つの文字カテゴリ
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterClass {
    /// カテゴリID
    pub id: u32,
    /// カテゴリ名
    pub name: String,
    /// 既知語があっても未知語処理を起動するか
    pub invoke: bool,
    /// 同じカテゴリの連続する文字をまとめるか
    pub group: bool,
    /// 未知語の長さ
    pub max_length: u32,
}

impl CharacterClass {
    pub fn new<S>(id: u32, name: S, invoke: bool, group: bool, max_length: u32) -> Self
    where
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            invoke,
            group,
            max_length,
        }
    }
}

/// コードポイントの範囲をカテゴリに割り当てる規則
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryMapping {
    pub start: u32,
    /// 省略時は`start`のみ
    pub end: Option<u32>,
    /// 主カテゴリ名
    pub default: String,
    /// 互換カテゴリ名
    pub compatible: Vec<String>,
}

/// 文字カテゴリ表
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterCategoryTable {
    classes: Vec<CharacterClass>,
    primary: Vec<u8>,
    compatible: Vec<u32>,
    default_id: u32,
}

impl CharacterCategoryTable {
    /// カテゴリ定義と割り当て規則から表を構築します。
    ///
    /// 規則は順に適用され、どの規則にも含まれないコードポイントは
    /// 主カテゴリ`DEFAULT`、互換カテゴリ`{DEFAULT}`になります。
    ///
    /// # エラー
    ///
    /// 次の場合にエラーを返します。
    ///
    /// * `DEFAULT`が定義されていない
    /// * カテゴリ数が32を超える、または名前が重複している
    /// * カテゴリIDが定義順の添字と一致しない
    /// * 規則が未定義のカテゴリや16ビットを超えるコードポイントを参照している
    pub fn build(classes: Vec<CharacterClass>, mappings: &[CategoryMapping]) -> Result<Self> {
        if classes.len() > MAX_CATEGORIES {
            let msg = format!(
                "The number of categories must be at most {MAX_CATEGORIES}, but got {}",
                classes.len()
            );
            return Err(SumomoError::invalid_argument("classes", msg));
        }
        let mut name2id = HashMap::new();
        for (i, class) in classes.iter().enumerate() {
            if usize::try_from(class.id)? != i {
                let msg = format!("The category {} must have id {i}", class.name);
                return Err(SumomoError::invalid_argument("classes", msg));
            }
            if name2id.insert(class.name.clone(), class.id).is_some() {
                let msg = format!("The category {} is defined twice", class.name);
                return Err(SumomoError::invalid_argument("classes", msg));
            }
        }
        let default_id = *name2id.get(DEFAULT_CATEGORY).ok_or_else(|| {
            SumomoError::invalid_argument("classes", "DEFAULT must be defined.")
        })?;

        let resolve = |name: &str| {
            name2id.get(name).copied().ok_or_else(|| {
                SumomoError::invalid_argument("mappings", format!("Undefined category {name}"))
            })
        };

        let mut primary: Vec<Option<u8>> = vec![None; NUM_CODE_UNITS];
        let mut compatible = vec![0u32; NUM_CODE_UNITS];
        for m in mappings {
            let end = m.end.unwrap_or(m.start);
            if m.start > end || usize::try_from(end)? >= NUM_CODE_UNITS {
                let msg = format!("Invalid code range 0x{:04X}..0x{end:04X}", m.start);
                return Err(SumomoError::invalid_argument("mappings", msg));
            }
            let default = u8::try_from(resolve(&m.default)?)?;
            let mut bits = 0;
            for name in &m.compatible {
                bits |= 1 << resolve(name)?;
            }
            for c in m.start..=end {
                let c = usize::try_from(c)?;
                primary[c] = Some(default);
                compatible[c] |= bits;
            }
        }

        let default_u8 = u8::try_from(default_id)?;
        let primary = primary
            .into_iter()
            .zip(compatible.iter_mut())
            .map(|(p, bits)| {
                p.unwrap_or_else(|| {
                    *bits = 1 << default_id;
                    default_u8
                })
            })
            .collect();

        Ok(Self {
            classes,
            primary,
            compatible,
            default_id,
        })
    }

    /// `char.def`形式のテキストから表を構築します。
    ///
    /// カテゴリ定義行は`名前 INVOKE GROUP LENGTH`、割り当て行は
    /// `0xSTART[..0xEND] 主カテゴリ [互換カテゴリ...]`です。`#`以降はコメントです。
    ///
    /// # エラー
    ///
    /// 書式の誤りはすべてエラーになり、部分的な表は作られません。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut classes = vec![];
        let mut mappings = vec![];

        let reader = BufReader::new(rdr);
        for line in reader.lines() {
            let line = line?;
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("0x") {
                mappings.push(Self::parse_mapping(line)?);
            } else {
                let id = u32::try_from(classes.len())?;
                classes.push(Self::parse_class(line, id)?);
            }
        }

        log::debug!(
            "Parsed {} categories and {} mappings from char.def",
            classes.len(),
            mappings.len()
        );
        Self::build(classes, &mappings)
    }

    fn parse_class(line: &str, id: u32) -> Result<CharacterClass> {
        let cols: Vec<_> = line.split_ascii_whitespace().collect();
        if cols.len() < 4 {
            let msg = format!("A category line must have four items, {line}");
            return Err(SumomoError::invalid_format("char.def", msg));
        }
        let flag = |s: &str, what: &str| match s {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => {
                let msg = format!("{what} must be 0 or 1, {line}");
                Err(SumomoError::invalid_format("char.def", msg))
            }
        };
        let invoke = flag(cols[1], "INVOKE")?;
        let group = flag(cols[2], "GROUP")?;
        let max_length = cols[3].parse().map_err(|_| {
            let msg = format!("LENGTH must be a non-negative integer, {line}");
            SumomoError::invalid_format("char.def", msg)
        })?;
        Ok(CharacterClass::new(id, cols[0], invoke, group, max_length))
    }

    fn parse_mapping(line: &str) -> Result<CategoryMapping> {
        let cols: Vec<_> = line.split_ascii_whitespace().collect();
        if cols.len() < 2 {
            let msg = format!("A mapping line must have a category, {line}");
            return Err(SumomoError::invalid_format("char.def", msg));
        }
        let (start, end) = match cols[0].split_once("..") {
            Some((s, e)) => (Self::parse_hex(s, line)?, Some(Self::parse_hex(e, line)?)),
            None => (Self::parse_hex(cols[0], line)?, None),
        };
        Ok(CategoryMapping {
            start,
            end,
            default: cols[1].to_string(),
            compatible: cols[2..].iter().map(|s| s.to_string()).collect(),
        })
    }

    fn parse_hex(s: &str, line: &str) -> Result<u32> {
        s.strip_prefix("0x")
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .ok_or_else(|| {
                let msg = format!("Invalid code point {s}, {line}");
                SumomoError::invalid_format("char.def", msg)
            })
    }

    /// 文字の主カテゴリを返します。
    ///
    /// 16ビットに収まらない文字（サロゲートペアで表される文字）は常に`DEFAULT`です。
    #[inline(always)]
    pub fn lookup(&self, c: char) -> &CharacterClass {
        &self.classes[usize::from_u32(self.category_id(c))]
    }

    /// 文字の主カテゴリIDを返します。
    #[inline(always)]
    pub fn category_id(&self, c: char) -> u32 {
        self.primary
            .get(c as usize)
            .map_or(self.default_id, |&id| u32::from(id))
    }

    /// 文字の互換カテゴリのビット集合を返します。
    #[inline(always)]
    pub fn compatible_mask(&self, c: char) -> u32 {
        self.compatible
            .get(c as usize)
            .copied()
            .unwrap_or(1 << self.default_id)
    }

    /// 文字の互換カテゴリをID昇順に返します。
    pub fn lookup_compatible(&self, c: char) -> impl Iterator<Item = &CharacterClass> + '_ {
        let mask = self.compatible_mask(c);
        self.classes
            .iter()
            .filter(move |class| mask & (1 << class.id) != 0)
    }

    /// IDからカテゴリを取得します。
    #[inline(always)]
    pub fn class(&self, id: u32) -> Option<&CharacterClass> {
        self.classes.get(usize::try_from(id).ok()?)
    }

    /// 名前からカテゴリIDを取得します。
    pub fn class_id(&self, name: &str) -> Option<u32> {
        self.classes.iter().find(|c| c.name == name).map(|c| c.id)
    }

    #[inline(always)]
    pub fn classes(&self) -> &[CharacterClass] {
        &self.classes
    }

    #[inline(always)]
    pub fn default_class(&self) -> &CharacterClass {
        &self.classes[usize::from_u32(self.default_id)]
    }

    /// `unk_char.dat`のバイト列
    pub fn category_map_bytes(&self) -> Vec<u8> {
        self.primary.clone()
    }

    /// `unk_compat.dat`のバイト列
    pub fn compatible_map_bytes(&self) -> Vec<u8> {
        let mut buf = ByteBuffer::with_capacity(NUM_CODE_UNITS * 4);
        for &bits in &self.compatible {
            buf.put_i32(bits as i32);
        }
        buf.into_vec()
    }

    /// `unk_invoke.dat`のバイト列
    pub fn invoke_definition_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::with_capacity(64 * self.classes.len() + 4);
        buf.put_i32(i32::try_from(self.classes.len())?);
        for class in &self.classes {
            buf.put_i32(i32::try_from(class.id)?);
            buf.put_str(&class.name)?;
            buf.put_u8(u8::from(class.invoke));
            buf.put_u8(u8::from(class.group));
            buf.put_i32(i32::try_from(class.max_length)?);
        }
        Ok(buf.into_vec())
    }

    /// 3つのアーティファクトから表を復元します。
    pub fn from_bytes(category_map: &[u8], compatible_map: &[u8], invoke: &[u8]) -> Result<Self> {
        if category_map.len() != NUM_CODE_UNITS {
            let msg = format!("Expected {NUM_CODE_UNITS} bytes, but got {}", category_map.len());
            return Err(SumomoError::invalid_format("unk_char.dat", msg));
        }
        if compatible_map.len() != NUM_CODE_UNITS * 4 {
            let msg = format!(
                "Expected {} bytes, but got {}",
                NUM_CODE_UNITS * 4,
                compatible_map.len()
            );
            return Err(SumomoError::invalid_format("unk_compat.dat", msg));
        }
        let classes = Self::parse_invoke_definition(invoke)?;
        let num_classes = classes.len();
        let default_id = classes
            .iter()
            .find(|c| c.name == DEFAULT_CATEGORY)
            .map(|c| c.id)
            .ok_or_else(|| SumomoError::invalid_format("unk_invoke.dat", "DEFAULT is missing."))?;
        if num_classes > MAX_CATEGORIES
            || classes
                .iter()
                .enumerate()
                .any(|(i, c)| usize::from_u32(c.id) != i)
        {
            return Err(SumomoError::invalid_format(
                "unk_invoke.dat",
                "Category ids must be 0, 1, ... in order, at most 32.",
            ));
        }
        if category_map.iter().any(|&id| usize::from(id) >= num_classes) {
            return Err(SumomoError::invalid_format(
                "unk_char.dat",
                "A category id is out of range.",
            ));
        }

        let buf = ByteBuffer::from_bytes(compatible_map.to_vec());
        let compatible = (0..NUM_CODE_UNITS)
            .map(|i| buf.get_i32(i * 4).unwrap_or_default() as u32)
            .collect();

        Ok(Self {
            classes,
            primary: category_map.to_vec(),
            compatible,
            default_id,
        })
    }

    fn parse_invoke_definition(bytes: &[u8]) -> Result<Vec<CharacterClass>> {
        let truncated = || SumomoError::invalid_format("unk_invoke.dat", "The data is truncated.");
        let buf = ByteBuffer::from_bytes(bytes.to_vec());
        let mut offset = 0;
        let count = buf.get_i32(offset).ok_or_else(truncated)?;
        offset += 4;
        let mut classes = vec![];
        for _ in 0..count {
            let id = buf.get_i32(offset).ok_or_else(truncated)?;
            offset += 4;
            let name = buf.get_str(offset).ok_or_else(truncated)?;
            offset += name.len() + 1;
            let invoke = buf.get_u8(offset).ok_or_else(truncated)?;
            let group = buf.get_u8(offset + 1).ok_or_else(truncated)?;
            offset += 2;
            let max_length = buf.get_i32(offset).ok_or_else(truncated)?;
            offset += 4;
            classes.push(CharacterClass::new(
                u32::try_from(id)?,
                name,
                invoke != 0,
                group != 0,
                u32::try_from(max_length)?,
            ));
        }
        if offset != buf.len() {
            return Err(SumomoError::invalid_format(
                "unk_invoke.dat",
                "Trailing bytes after the definitions.",
            ));
        }
        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAR_DEF: &str = "
# comment
DEFAULT 0 1 0
SPACE 0 1 0
KANJI 0 0 2
HIRAGANA 1 1 0  # trailing comment
KATAKANA 1 1 2
NUMERIC 1 1 0

0x0020 SPACE
0x0030..0x0039 NUMERIC
0x3041..0x309F HIRAGANA
0x30A1..0x30FF KATAKANA
0x30FC KATAKANA HIRAGANA
0x4E00..0x9FA5 KANJI
";

    fn table() -> CharacterCategoryTable {
        CharacterCategoryTable::from_reader(CHAR_DEF.as_bytes()).unwrap()
    }

    #[test]
    fn test_classes() {
        let t = table();
        assert_eq!(t.classes().len(), 6);
        assert_eq!(
            t.class(3),
            Some(&CharacterClass::new(3, "HIRAGANA", true, true, 0))
        );
        assert_eq!(
            t.class(2),
            Some(&CharacterClass::new(2, "KANJI", false, false, 2))
        );
        assert_eq!(t.class_id("NUMERIC"), Some(5));
        assert_eq!(t.class_id("ALPHA"), None);
        assert_eq!(t.default_class().name, "DEFAULT");
    }

    #[test]
    fn test_lookup() {
        let t = table();
        assert_eq!(t.lookup('す').name, "HIRAGANA");
        assert_eq!(t.lookup('ス').name, "KATAKANA");
        assert_eq!(t.lookup('ー').name, "KATAKANA");
        assert_eq!(t.lookup('漢').name, "KANJI");
        assert_eq!(t.lookup('5').name, "NUMERIC");
        assert_eq!(t.lookup(' ').name, "SPACE");
        assert_eq!(t.lookup('a').name, "DEFAULT");
        assert_eq!(t.lookup('😀').name, "DEFAULT");
    }

    #[test]
    fn test_lookup_compatible() {
        let t = table();
        let names: Vec<_> = t.lookup_compatible('ー').map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["HIRAGANA"]);
        assert_eq!(t.lookup_compatible('す').count(), 0);
        let names: Vec<_> = t.lookup_compatible('a').map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["DEFAULT"]);
        let names: Vec<_> = t.lookup_compatible('😀').map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["DEFAULT"]);
    }

    #[test]
    fn test_every_code_point() {
        let t = table();
        let default_bit = 1 << t.default_class().id;
        for c in (0..=0x10FFFF).filter_map(char::from_u32) {
            let class = t.lookup(c);
            assert!(t.class(class.id).is_some());
            let covered = matches!(
                c as u32,
                0x20 | 0x30..=0x39 | 0x3041..=0x309F | 0x30A1..=0x30FF | 0x4E00..=0x9FA5
            );
            if !covered {
                assert_eq!(class.id, t.default_class().id);
                assert_ne!(t.compatible_mask(c) & default_bit, 0);
            }
        }
    }

    #[test]
    fn test_category_zero_is_not_unset() {
        let char_def = "HIRAGANA 0 1 0\nDEFAULT 0 1 0\n0x3041..0x309F HIRAGANA";
        let t = CharacterCategoryTable::from_reader(char_def.as_bytes()).unwrap();
        assert_eq!(t.lookup('す').name, "HIRAGANA");
        assert_eq!(t.lookup('a').name, "DEFAULT");
        assert_eq!(t.compatible_mask('a'), 1 << 1);
    }

    #[test]
    fn test_no_default() {
        let char_def = "KANJI 0 0 2";
        assert!(CharacterCategoryTable::from_reader(char_def.as_bytes()).is_err());
    }

    #[test]
    fn test_invalid_flags() {
        for char_def in [
            "DEFAULT 2 1 0",
            "DEFAULT 0 -1 0",
            "DEFAULT 0 1 -1",
            "DEFAULT 0 1",
        ] {
            assert!(
                CharacterCategoryTable::from_reader(char_def.as_bytes()).is_err(),
                "{char_def}"
            );
        }
    }

    #[test]
    fn test_undefined_category() {
        let char_def = "DEFAULT 0 1 0\n0x3041 HIRAGANA";
        assert!(CharacterCategoryTable::from_reader(char_def.as_bytes()).is_err());
        let char_def = "DEFAULT 0 1 0\n0x3041 DEFAULT KANJI";
        assert!(CharacterCategoryTable::from_reader(char_def.as_bytes()).is_err());
    }

    #[test]
    fn test_invalid_range() {
        for char_def in [
            "DEFAULT 0 1 0\n0x10000 DEFAULT",
            "DEFAULT 0 1 0\n0x0040..0x0030 DEFAULT",
            "DEFAULT 0 1 0\n0xZZ DEFAULT",
            "DEFAULT 0 1 0\n0x0030",
        ] {
            assert!(
                CharacterCategoryTable::from_reader(char_def.as_bytes()).is_err(),
                "{char_def}"
            );
        }
    }

    #[test]
    fn test_too_many_categories() {
        let mut char_def = "DEFAULT 0 1 0\n".to_string();
        for i in 0..32 {
            char_def.push_str(&format!("C{i} 0 1 0\n"));
        }
        assert!(CharacterCategoryTable::from_reader(char_def.as_bytes()).is_err());
    }

    #[test]
    fn test_duplicate_category() {
        let char_def = "DEFAULT 0 1 0\nDEFAULT 1 1 0";
        assert!(CharacterCategoryTable::from_reader(char_def.as_bytes()).is_err());
    }

    #[test]
    fn test_bytes() {
        let t = table();
        let category_map = t.category_map_bytes();
        let compatible_map = t.compatible_map_bytes();
        let invoke = t.invoke_definition_bytes().unwrap();
        assert_eq!(category_map.len(), 0x10000);
        assert_eq!(compatible_map.len(), 0x40000);
        assert_eq!(category_map[0x3042], 3);
        let other =
            CharacterCategoryTable::from_bytes(&category_map, &compatible_map, &invoke).unwrap();
        assert_eq!(other, t);
    }

    #[test]
    fn test_from_bytes_invalid() {
        let t = table();
        let category_map = t.category_map_bytes();
        let compatible_map = t.compatible_map_bytes();
        let invoke = t.invoke_definition_bytes().unwrap();
        assert!(
            CharacterCategoryTable::from_bytes(&category_map[1..], &compatible_map, &invoke).is_err()
        );
        assert!(
            CharacterCategoryTable::from_bytes(&category_map, &compatible_map[4..], &invoke).is_err()
        );
        assert!(
            CharacterCategoryTable::from_bytes(
                &category_map,
                &compatible_map,
                &invoke[..invoke.len() - 1]
            )
            .is_err()
        );
        let mut bad_map = category_map.clone();
        bad_map[0] = 6;
        assert!(CharacterCategoryTable::from_bytes(&bad_map, &compatible_map, &invoke).is_err());
    }
}
