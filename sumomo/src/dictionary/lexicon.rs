//! 単語エントリの格納
//!
//! 各エントリは`{i16 左ID, i16 右ID, i16 コスト, i32 素性オフセット}`の
//! 10バイトの固定長レコードとしてエントリ表に追記され、そのバイト位置がエントリIDになります。
//! 素性文字列`表層形,素性...`は別の文字列表に置かれます。
//!
//! 既知語と未知語の両方がこの形式を使います。

pub(crate) mod feature;
pub(crate) mod map;
mod param;

use crate::codec::ByteBuffer;
use crate::dictionary::connector::ConnectorView;
use crate::dictionary::lexicon::feature::WordFeatures;
use crate::errors::{Result, SumomoError};
use crate::utils::{self, FromU32};

pub use crate::dictionary::lexicon::feature::mask_features;
pub use crate::dictionary::lexicon::map::multimap::IdMultimap;
pub use crate::dictionary::lexicon::map::trie::{DoubleArrayTrie, Trie, TrieMatch};
pub use crate::dictionary::lexicon::map::{WordMap, WordMapBuilder};
pub use crate::dictionary::lexicon::param::WordParam;

/// エントリレコードのバイト幅
pub const ENTRY_SIZE: usize = 10;

const FEATURE_OFFSET_POS: usize = 6;

/// エントリ表に格納された1レコード
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub left_id: i16,
    pub right_id: i16,
    pub cost: i16,
    pub feature_offset: i32,
}

/// エントリ表と素性文字列表
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntryStore {
    entries: ByteBuffer,
    features: WordFeatures,
}

impl Default for WordEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WordEntryStore {
    pub fn new() -> Self {
        Self {
            entries: ByteBuffer::with_capacity(ENTRY_SIZE * 256),
            features: WordFeatures::new(),
        }
    }

    /// エントリを1件追記し、そのエントリIDを返します。
    ///
    /// # エラー
    ///
    /// 接続IDが16ビット符号付き整数に収まらない場合や、
    /// 素性文字列がヌル文字を含む場合にエラーを返します。
    pub fn put(&mut self, param: WordParam, feature: &str) -> Result<u32> {
        let entry_id = u32::try_from(self.entries.position())?;
        let left_id = i16::try_from(param.left_id)?;
        let right_id = i16::try_from(param.right_id)?;
        let feature_offset = self.features.push(feature)?;
        self.entries.put_i16(left_id);
        self.entries.put_i16(right_id);
        self.entries.put_i16(param.word_cost);
        self.entries.put_i32(feature_offset);
        Ok(entry_id)
    }

    /// エントリの列からストアを構築します。
    ///
    /// 戻り値の2番目は、割り当てたエントリIDと表層形の組を割り当て順に並べたものです。
    /// 未知語ストアの場合、表層形の位置には文字カテゴリ名が入ります。
    pub fn build_from_entries(entries: &[RawWordEntry]) -> Result<(Self, Vec<(u32, String)>)> {
        let mut store = Self::new();
        let mut assigned = Vec::with_capacity(entries.len());
        for e in entries {
            let entry_id = store.put(e.param, &e.feature())?;
            assigned.push((entry_id, e.surface.clone()));
        }
        store.shrink();
        Ok((store, assigned))
    }

    /// 内部バッファを論理サイズまで切り詰めます。
    pub fn shrink(&mut self) {
        self.entries.shrink();
        self.features.shrink();
    }

    /// エントリ数
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.entries.len() / ENTRY_SIZE
    }

    /// すべてのエントリIDを格納順に列挙します。
    pub fn entry_ids(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.num_entries()).filter_map(|i| u32::try_from(i * ENTRY_SIZE).ok())
    }

    /// エントリIDがレコードの先頭を指しているかを返します。
    #[inline(always)]
    pub fn contains(&self, entry_id: u32) -> bool {
        let pos = usize::from_u32(entry_id);
        pos % ENTRY_SIZE == 0 && pos + ENTRY_SIZE <= self.entries.len()
    }

    /// エントリレコードを読み出します。
    pub fn entry(&self, entry_id: u32) -> Option<WordEntry> {
        if !self.contains(entry_id) {
            return None;
        }
        let pos = usize::from_u32(entry_id);
        Some(WordEntry {
            left_id: self.entries.get_i16(pos)?,
            right_id: self.entries.get_i16(pos + 2)?,
            cost: self.entries.get_i16(pos + 4)?,
            feature_offset: self.entries.get_i32(pos + FEATURE_OFFSET_POS)?,
        })
    }

    /// 解析に使う単語パラメータを読み出します。
    #[inline(always)]
    pub fn word_param(&self, entry_id: u32) -> Option<WordParam> {
        let e = self.entry(entry_id)?;
        Some(WordParam::new(
            u16::try_from(e.left_id).ok()?,
            u16::try_from(e.right_id).ok()?,
            e.cost,
        ))
    }

    /// エントリの素性文字列`表層形,素性...`を返します。
    ///
    /// エントリIDや素性オフセットが解決できない場合は空文字列を返します。
    pub fn get_features(&self, entry_id: u32) -> &str {
        let Some(e) = self.entry(entry_id) else {
            return "";
        };
        usize::try_from(e.feature_offset)
            .ok()
            .and_then(|offset| self.features.get(offset))
            .unwrap_or("")
    }

    /// 左右IDがコネクターで有効かどうかをチェックします。
    pub fn verify<C>(&self, conn: &C) -> bool
    where
        C: ConnectorView,
    {
        self.entry_ids().all(|entry_id| {
            self.word_param(entry_id).is_some_and(|p| {
                usize::from(p.left_id) < conn.num_left() && usize::from(p.right_id) < conn.num_right()
            })
        })
    }

    /// エントリ表のバイト列
    #[inline(always)]
    pub fn entries_bytes(&self) -> &[u8] {
        self.entries.as_slice()
    }

    /// 素性文字列表のバイト列
    #[inline(always)]
    pub fn features_bytes(&self) -> &[u8] {
        self.features.as_slice()
    }

    /// エントリ表と素性文字列表のバイト列から復元します。
    ///
    /// # エラー
    ///
    /// エントリ表の長さがレコード幅の倍数でない場合にエラーを返します。
    pub fn from_bytes(entries: Vec<u8>, features: Vec<u8>, name: &'static str) -> Result<Self> {
        if entries.len() % ENTRY_SIZE != 0 {
            let msg = format!(
                "The length {} is not a multiple of {ENTRY_SIZE}",
                entries.len()
            );
            return Err(SumomoError::invalid_format(name, msg));
        }
        Ok(Self {
            entries: ByteBuffer::from_bytes(entries),
            features: WordFeatures::from_bytes(features),
        })
    }

    /// MeCab形式のCSVテキストからエントリを読み込みます。
    ///
    /// 各行は`表層形,左ID,右ID,コスト,素性...`で、5列以上が必要です。
    /// 表層形が空の行は警告を出して読み飛ばします。
    pub(crate) fn parse_csv(bytes: &[u8], name: &'static str) -> Result<Vec<RawWordEntry>> {
        let text = std::str::from_utf8(bytes)?;
        let mut entries = vec![];
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let mut cols = utils::parse_csv_row(line);
            if cols.len() < 5 {
                let msg = format!("A csv row of lexicon must have five items at least, {line:?}");
                return Err(SumomoError::invalid_format(name, msg));
            }
            let param = WordParam::new(cols[1].parse()?, cols[2].parse()?, cols[3].parse()?);
            if cols[0].is_empty() {
                log::warn!("Skipped an empty surface, {line:?}");
                continue;
            }
            let features = cols.split_off(4);
            let surface = cols.swap_remove(0);
            entries.push(RawWordEntry {
                surface,
                param,
                features,
            });
        }
        log::debug!("Parsed {} entries from {name}", entries.len());
        Ok(entries)
    }
}

/// 生の単語エントリ
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawWordEntry {
    pub surface: String,
    pub param: WordParam,
    pub features: Vec<String>,
}

impl RawWordEntry {
    /// 格納する素性文字列`表層形,素性...`を組み立てます。
    pub fn feature(&self) -> String {
        let mut feature = utils::quote_csv_cell(&self.surface);
        for f in &self.features {
            feature.push(',');
            feature.push_str(&utils::quote_csv_cell(f));
        }
        feature
    }
}
