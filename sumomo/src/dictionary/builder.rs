//! 辞書構築のためのビルダー
//!
//! このモジュールは、MeCab形式の辞書ファイルから [`Dictionary`] を構築するための
//! ビルダーを提供します。

use std::io::Read;

use crate::dictionary::character::CharacterCategoryTable;
use crate::dictionary::connector::ConnectionCostMatrix;
use crate::dictionary::lexicon::{RawWordEntry, WordEntryStore, WordMapBuilder, mask_features};
use crate::dictionary::unknown::UnknownDictionary;
use crate::dictionary::Dictionary;
use crate::errors::{Result, SumomoError};

/// システム辞書エントリから [`Dictionary`] を構築するビルダー
#[derive(Clone, Debug, Default)]
pub struct SystemDictionaryBuilder {
    mask_features: bool,
}

impl SystemDictionaryBuilder {
    /// 既定の設定でビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析結果に使わない素性を空にして辞書を小さくするかを指定します。
    ///
    /// 有効にすると、品詞細分類1〜3, 活用型, 活用形, 原形, 発音が空文字列になります。
    /// 既定では無効です。
    pub fn mask_features(mut self, yes: bool) -> Self {
        self.mask_features = yes;
        self
    }

    /// パースされたコンポーネントから `Dictionary` を構築します。
    ///
    /// # 引数
    ///
    /// * `system_word_entries` - システム辞書の単語エントリ
    /// * `matrix` - 接続コスト行列
    /// * `char_table` - 文字カテゴリ表
    /// * `unk_word_entries` - 未知語エントリ
    ///
    /// # エラー
    ///
    /// 辞書の検証に失敗した場合にエラーを返します。
    pub(crate) fn build(
        &self,
        mut system_word_entries: Vec<RawWordEntry>,
        matrix: ConnectionCostMatrix,
        char_table: CharacterCategoryTable,
        mut unk_word_entries: Vec<RawWordEntry>,
    ) -> Result<Dictionary> {
        if self.mask_features {
            for e in system_word_entries.iter_mut().chain(unk_word_entries.iter_mut()) {
                mask_features(&mut e.features);
            }
        }

        let (known, assigned) = WordEntryStore::build_from_entries(&system_word_entries)?;
        let mut map_builder = WordMapBuilder::new();
        for (entry_id, surface) in assigned {
            map_builder.add_record(surface, entry_id);
        }
        let word_map = map_builder.build()?;

        if matrix.forward_dimension() == 0 || matrix.backward_dimension() == 0 {
            return Err(SumomoError::invalid_argument(
                "connector_rdr",
                "connector_rdr must define at least one connection id on each side.",
            ));
        }
        if !known.verify(&matrix) {
            return Err(SumomoError::invalid_argument(
                "system_lexicon_rdr",
                "system_lexicon_rdr includes invalid connection ids.",
            ));
        }

        let unknown = UnknownDictionary::build(&unk_word_entries, &char_table)?;
        if !unknown.verify(&matrix) {
            return Err(SumomoError::invalid_argument(
                "unk_handler_rdr",
                "unk_handler_rdr includes invalid connection ids.",
            ));
        }

        log::debug!(
            "Built a dictionary of {} known entries and {} unknown entries",
            known.num_entries(),
            unknown.store().num_entries()
        );

        Ok(Dictionary {
            known,
            word_map,
            matrix,
            char_table,
            unknown,
        })
    }

    /// MeCab形式の4つのテキストから辞書を作成します。
    ///
    /// # 引数
    ///
    ///  - `system_lexicon_rdr`: 辞書ファイル `*.csv` のリーダー
    ///  - `connector_rdr`: 接続行列ファイル `matrix.def` のリーダー
    ///  - `char_prop_rdr`: 文字定義ファイル `char.def` のリーダー
    ///  - `unk_handler_rdr`: 未知語定義ファイル `unk.def` のリーダー
    ///
    /// # エラー
    ///
    /// 入力フォーマットが不正な場合や、接続IDが行列の範囲外の場合、
    /// 未知語エントリを持たない文字カテゴリがある場合に [`SumomoError`] を返します。
    pub fn build_from_readers<S, C, P, U>(
        &self,
        mut system_lexicon_rdr: S,
        connector_rdr: C,
        char_prop_rdr: P,
        mut unk_handler_rdr: U,
    ) -> Result<Dictionary>
    where
        S: Read,
        C: Read,
        P: Read,
        U: Read,
    {
        let mut system_lexicon_buf = vec![];
        system_lexicon_rdr.read_to_end(&mut system_lexicon_buf)?;
        let system_word_entries = WordEntryStore::parse_csv(&system_lexicon_buf, "lex.csv")?;
        let matrix = ConnectionCostMatrix::from_reader(connector_rdr)?;
        let char_table = CharacterCategoryTable::from_reader(char_prop_rdr)?;
        let mut unk_handler_buf = vec![];
        unk_handler_rdr.read_to_end(&mut unk_handler_buf)?;
        let unk_word_entries = WordEntryStore::parse_csv(&unk_handler_buf, "unk.def")?;

        self.build(system_word_entries, matrix, char_table, unk_word_entries)
    }

    /// 既定の設定で [`build_from_readers()`](Self::build_from_readers) を呼び出します。
    pub fn from_readers<S, C, P, U>(
        system_lexicon_rdr: S,
        connector_rdr: C,
        char_prop_rdr: P,
        unk_handler_rdr: U,
    ) -> Result<Dictionary>
    where
        S: Read,
        C: Read,
        P: Read,
        U: Read,
    {
        Self::new().build_from_readers(
            system_lexicon_rdr,
            connector_rdr,
            char_prop_rdr,
            unk_handler_rdr,
        )
    }
}
