//! 表層形からエントリIDへのマッピング
//!
//! 表層形をトライに登録してトライIDを割り当て、
//! トライIDから既知語エントリIDの列を多値写像で引きます。

pub mod multimap;
pub mod trie;

use std::collections::BTreeMap;

use crate::dictionary::lexicon::map::multimap::IdMultimap;
use crate::dictionary::lexicon::map::trie::{DoubleArrayTrie, Trie};
use crate::errors::Result;

/// 単語をトライ構造で管理するマップ
pub struct WordMap<T = DoubleArrayTrie> {
    trie: T,
    targets: IdMultimap,
}

impl<T> WordMap<T>
where
    T: Trie,
{
    /// 既存のトライと多値写像から作成します。
    pub fn from_parts(trie: T, targets: IdMultimap) -> Self {
        Self { trie, targets }
    }

    /// `(表層形, エントリID)`の列から新しいインスタンスを作成します。
    pub fn new<I, W>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, u32)>,
        W: AsRef<str>,
    {
        let mut b = WordMapBuilder::new();
        for (word, id) in records {
            b.add_record(word.as_ref().to_string(), id);
        }
        b.build()
    }

    #[inline(always)]
    pub fn trie(&self) -> &T {
        &self.trie
    }

    /// トライIDからエントリIDの列への写像
    #[inline(always)]
    pub fn targets(&self) -> &IdMultimap {
        &self.targets
    }

    /// 入力の接頭辞に一致するエントリを`(エントリID, 終了文字位置)`で列挙します。
    ///
    /// 短い表層形から順に、同じ表層形の中では登録順に返します。
    #[inline(always)]
    pub fn common_prefix_iterator<'a>(
        &'a self,
        input: &'a [char],
    ) -> impl Iterator<Item = (u32, usize)> + 'a {
        self.trie.common_prefix_iterator(input).flat_map(move |e| {
            self.targets
                .get(e.value)
                .iter()
                .map(move |&entry_id| (entry_id, e.end_char))
        })
    }
}

/// 単語マップを構築するビルダー
#[derive(Default)]
pub struct WordMapBuilder {
    map: BTreeMap<String, Vec<u32>>,
}

impl WordMapBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn add_record(&mut self, word: String, id: u32) {
        self.map.entry(word).or_default().push(id);
    }

    /// 表層形の辞書順にトライIDを割り当てて構築します。
    pub fn build<T>(self) -> Result<WordMap<T>>
    where
        T: Trie,
    {
        let mut records = Vec::with_capacity(self.map.len());
        let mut targets = IdMultimap::new();
        for (trie_id, (word, ids)) in self.map.into_iter().enumerate() {
            let trie_id = u32::try_from(trie_id)?;
            for id in ids {
                targets.push(trie_id, id);
            }
            records.push((word, trie_id));
        }
        let trie = T::from_records(&records)?;
        log::debug!("Built a trie of {} surface forms", records.len());
        Ok(WordMap { trie, targets })
    }
}
