//! 未知語処理モジュール
//!
//! 辞書に登録されていない文字列に対して、文字カテゴリごとの未知語エントリを提供します。
//! エントリは既知語と同じ固定長レコードで格納し、カテゴリIDからエントリIDの列を引きます。

use crate::dictionary::character::CharacterCategoryTable;
use crate::dictionary::connector::ConnectorView;
use crate::dictionary::lexicon::{IdMultimap, RawWordEntry, WordEntryStore};
use crate::errors::{Result, SumomoError};

/// 未知語辞書
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownDictionary {
    store: WordEntryStore,
    targets: IdMultimap,
}

impl UnknownDictionary {
    pub fn from_parts(store: WordEntryStore, targets: IdMultimap) -> Self {
        Self { store, targets }
    }

    /// 未知語エントリの列から構築します。
    ///
    /// 各エントリの表層形の位置にはカテゴリ名が入ります。
    ///
    /// # エラー
    ///
    /// 未定義のカテゴリを参照している場合や、
    /// 未知語エントリを1つも持たないカテゴリがある場合にエラーを返します。
    pub fn build(entries: &[RawWordEntry], char_table: &CharacterCategoryTable) -> Result<Self> {
        let (store, assigned) = WordEntryStore::build_from_entries(entries)?;
        let mut targets = IdMultimap::new();
        for (entry_id, category) in assigned {
            let class_id = char_table.class_id(&category).ok_or_else(|| {
                let msg = format!("Undefined category {category}");
                SumomoError::invalid_format("unk.def", msg)
            })?;
            targets.push(class_id, entry_id);
        }
        let dict = Self { store, targets };
        dict.check_categories(char_table)?;
        log::debug!(
            "Built {} unknown entries for {} categories",
            dict.store.num_entries(),
            dict.targets.num_keys()
        );
        Ok(dict)
    }

    /// `unk.def`形式のCSVテキストから構築します。
    pub fn from_reader<R>(mut rdr: R, char_table: &CharacterCategoryTable) -> Result<Self>
    where
        R: std::io::Read,
    {
        let mut buf = vec![];
        rdr.read_to_end(&mut buf)?;
        let entries = WordEntryStore::parse_csv(&buf, "unk.def")?;
        Self::build(&entries, char_table)
    }

    /// すべてのカテゴリが未知語エントリを持ち、
    /// すべてのキーが定義済みのカテゴリを指すことを確認します。
    pub(crate) fn check_categories(&self, char_table: &CharacterCategoryTable) -> Result<()> {
        for class in char_table.classes() {
            if self.targets.get(class.id).is_empty() {
                return Err(SumomoError::invalid_state(
                    "Every category must have at least one unknown entry",
                    format!("{} has no entry", class.name),
                ));
            }
        }
        for (class_id, ids) in self.targets.iter() {
            if char_table.class(class_id).is_none() {
                let msg = format!("Undefined category id {class_id}");
                return Err(SumomoError::invalid_format("unk_map.dat", msg));
            }
            if let Some(&id) = ids.iter().find(|&&id| !self.store.contains(id)) {
                let msg = format!("Entry id {id} does not address a record");
                return Err(SumomoError::invalid_format("unk_map.dat", msg));
            }
        }
        Ok(())
    }

    /// カテゴリIDに対応する未知語エントリIDを登録順に返します。
    #[inline(always)]
    pub fn entry_ids(&self, class_id: u32) -> &[u32] {
        self.targets.get(class_id)
    }

    #[inline(always)]
    pub fn store(&self) -> &WordEntryStore {
        &self.store
    }

    #[inline(always)]
    pub fn targets(&self) -> &IdMultimap {
        &self.targets
    }

    /// 左右IDがコネクターで有効かどうかをチェックします。
    pub fn verify<C>(&self, conn: &C) -> bool
    where
        C: ConnectorView,
    {
        self.store.verify(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAR_DEF: &str = "DEFAULT 0 1 0\nHIRAGANA 0 1 2\n0x3041..0x309F HIRAGANA";

    fn char_table() -> CharacterCategoryTable {
        CharacterCategoryTable::from_reader(CHAR_DEF.as_bytes()).unwrap()
    }

    #[test]
    fn test_build() {
        let unk_def = "DEFAULT,5,5,-800,補助記号,一般\nHIRAGANA,1,1,100,名詞,一般\nHIRAGANA,2,2,200,動詞,自立";
        let dict = UnknownDictionary::from_reader(unk_def.as_bytes(), &char_table()).unwrap();
        assert_eq!(dict.entry_ids(0), &[0]);
        assert_eq!(dict.entry_ids(1), &[10, 20]);
        assert_eq!(dict.store().get_features(20), "HIRAGANA,動詞,自立");
        assert_eq!(dict.store().word_param(10).unwrap().word_cost, 100);
        assert_eq!(dict.entry_ids(2), &[] as &[u32]);
    }

    #[test]
    fn test_undefined_category() {
        let unk_def = "DEFAULT,5,5,-800,補助記号\nHIRAGANA,1,1,100,名詞\nKANJI,1,1,100,名詞";
        assert!(UnknownDictionary::from_reader(unk_def.as_bytes(), &char_table()).is_err());
    }

    #[test]
    fn test_category_without_entry() {
        let unk_def = "DEFAULT,5,5,-800,補助記号";
        let result = UnknownDictionary::from_reader(unk_def.as_bytes(), &char_table());
        assert!(matches!(result, Err(SumomoError::InvalidState(_))));
    }
}
