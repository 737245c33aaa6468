//! トークン化のための辞書モジュール。
//!
//! このモジュールは、形態素解析に必要な辞書データの構築、永続化、読み込みを行います。
//! 主な機能として以下を提供します:
//!
//! - MeCab形式のテキストからの辞書構築
//! - 固定幅バイナリ形式のアーティファクト集合への変換と復元
//! - ディレクトリからの非同期読み込み(Zstandard圧縮にも対応)
//!
//! # 辞書の読み込み方法
//!
//! - [`SystemDictionaryBuilder::from_readers`]: テキストから構築する
//! - [`Dictionary::from_artifacts`]: メモリ上のアーティファクト集合から組み立てる
//! - [`Dictionary::load`]: [`ArtifactLoader`]で読み込んでから組み立てる
//!
//! 構築後の辞書は不変で、`Arc`で共有して複数のスレッドから同時に使えます。
pub mod artifact;
pub mod builder;
pub mod character;
pub mod connector;
pub mod lexicon;
pub mod loader;
pub mod unknown;
pub(crate) mod word_idx;

use crate::dictionary::character::CharacterCategoryTable;
use crate::dictionary::connector::{ConnectionCostMatrix, ConnectorCost};
use crate::dictionary::lexicon::{IdMultimap, Trie, WordEntryStore, WordMap};
use crate::dictionary::unknown::UnknownDictionary;
use crate::errors::{Result, SumomoError};

pub use crate::dictionary::artifact::{ArtifactName, Artifacts};
pub use crate::dictionary::builder::SystemDictionaryBuilder;
pub use crate::dictionary::lexicon::{DoubleArrayTrie, TrieMatch};
pub use crate::dictionary::loader::{ArtifactLoader, DirectoryLoader};
pub use crate::dictionary::word_idx::WordIdx;

pub(crate) use crate::dictionary::lexicon::WordParam;

/// 単語を含むエントリ表の種類。
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Default)]
pub enum WordType {
    /// 既知語。
    ///
    /// 辞書に登録された表層形に一致した単語です。
    #[default]
    Known,
    /// 未知語。
    ///
    /// 文字カテゴリの規則から生成された単語です。
    Unknown,
}

/// トークン化のための読み取り専用辞書。
///
/// 既知語のエントリ表とトライ、接続コスト行列、文字カテゴリ表、未知語辞書を保持します。
pub struct Dictionary {
    pub(crate) known: WordEntryStore,
    pub(crate) word_map: WordMap,
    pub(crate) matrix: ConnectionCostMatrix,
    pub(crate) char_table: CharacterCategoryTable,
    pub(crate) unknown: UnknownDictionary,
}

impl Dictionary {
    /// 既知語のエントリ表への参照を取得します。
    #[inline(always)]
    pub fn known_entries(&self) -> &WordEntryStore {
        &self.known
    }

    /// 表層形からエントリIDへのマップへの参照を取得します。
    #[inline(always)]
    pub fn word_map(&self) -> &WordMap {
        &self.word_map
    }

    /// 接続コスト行列への参照を取得します。
    #[inline(always)]
    pub fn connection_matrix(&self) -> &ConnectionCostMatrix {
        &self.matrix
    }

    /// 文字カテゴリ表への参照を取得します。
    #[inline(always)]
    pub fn char_table(&self) -> &CharacterCategoryTable {
        &self.char_table
    }

    /// 未知語辞書への参照を取得します。
    #[inline(always)]
    pub fn unknown(&self) -> &UnknownDictionary {
        &self.unknown
    }

    #[inline(always)]
    fn store(&self, word_type: WordType) -> &WordEntryStore {
        match word_type {
            WordType::Known => &self.known,
            WordType::Unknown => self.unknown.store(),
        }
    }

    /// 指定された単語の素性文字列`表層形,素性...`を取得します。
    ///
    /// # 引数
    ///
    /// * `word_idx` - 単語のインデックス。エントリ表の種類とエントリIDを含みます。
    ///
    /// # 戻り値
    ///
    /// 素性文字列。エントリIDが解決できない場合は空文字列です。
    #[inline(always)]
    pub fn word_feature(&self, word_idx: WordIdx) -> &str {
        self.store(word_idx.word_type).get_features(word_idx.word_id)
    }

    /// 指定された単語のパラメータを取得します。
    ///
    /// エントリIDが解決できない場合は`None`を返します。
    #[inline(always)]
    pub(crate) fn word_param(&self, word_idx: WordIdx) -> Option<WordParam> {
        self.store(word_idx.word_type).word_param(word_idx.word_id)
    }

    /// 右側の単語の右IDと左側の単語の左IDの接続コストを返します。
    #[inline(always)]
    pub fn connection_cost(&self, right_id: u16, left_id: u16) -> i32 {
        self.matrix.cost(right_id, left_id)
    }

    /// 辞書をアーティファクト集合に変換します。
    ///
    /// # エラー
    ///
    /// 値が固定幅のフィールドに収まらない場合にエラーを返します。
    pub fn to_artifacts(&self) -> Result<Artifacts> {
        let mut artifacts = Artifacts::new();
        artifacts.insert(ArtifactName::Trie, self.word_map.trie().serialize_to_vec()?);
        artifacts.insert(ArtifactName::KnownEntries, self.known.entries_bytes().to_vec());
        artifacts.insert(ArtifactName::KnownFeatures, self.known.features_bytes().to_vec());
        artifacts.insert(ArtifactName::KnownTargets, self.word_map.targets().to_bytes()?);
        artifacts.insert(ArtifactName::ConnectionCost, self.matrix.to_bytes()?);
        artifacts.insert(
            ArtifactName::UnknownEntries,
            self.unknown.store().entries_bytes().to_vec(),
        );
        artifacts.insert(
            ArtifactName::UnknownFeatures,
            self.unknown.store().features_bytes().to_vec(),
        );
        artifacts.insert(ArtifactName::UnknownTargets, self.unknown.targets().to_bytes()?);
        artifacts.insert(ArtifactName::CategoryMap, self.char_table.category_map_bytes());
        artifacts.insert(ArtifactName::CompatibleMap, self.char_table.compatible_map_bytes());
        artifacts.insert(
            ArtifactName::InvokeDefinition,
            self.char_table.invoke_definition_bytes()?,
        );
        Ok(artifacts)
    }

    /// アーティファクト集合から辞書を組み立てます。
    ///
    /// # エラー
    ///
    /// アーティファクトが欠けている場合は[`SumomoError::MissingArtifact`]を、
    /// 切り詰められている、長さが合わない、範囲外のIDを含むといった
    /// 構造の破損がある場合は[`SumomoError::InvalidFormat`]を返します。
    pub fn from_artifacts(artifacts: &Artifacts) -> Result<Self> {
        let trie = DoubleArrayTrie::deserialize_from_slice(artifacts.require(ArtifactName::Trie)?)?;
        let known = WordEntryStore::from_bytes(
            artifacts.require(ArtifactName::KnownEntries)?.to_vec(),
            artifacts.require(ArtifactName::KnownFeatures)?.to_vec(),
            "tid.dat",
        )?;
        let targets =
            IdMultimap::from_bytes(artifacts.require(ArtifactName::KnownTargets)?, "tid_map.dat")?;
        let matrix = ConnectionCostMatrix::from_bytes(artifacts.require(ArtifactName::ConnectionCost)?)?;
        let char_table = CharacterCategoryTable::from_bytes(
            artifacts.require(ArtifactName::CategoryMap)?,
            artifacts.require(ArtifactName::CompatibleMap)?,
            artifacts.require(ArtifactName::InvokeDefinition)?,
        )?;
        let unknown_store = WordEntryStore::from_bytes(
            artifacts.require(ArtifactName::UnknownEntries)?.to_vec(),
            artifacts.require(ArtifactName::UnknownFeatures)?.to_vec(),
            "unk.dat",
        )?;
        let unknown_targets =
            IdMultimap::from_bytes(artifacts.require(ArtifactName::UnknownTargets)?, "unk_map.dat")?;

        for (_, ids) in targets.iter() {
            if let Some(&id) = ids.iter().find(|&&id| !known.contains(id)) {
                let msg = format!("Entry id {id} does not address a record");
                return Err(SumomoError::invalid_format("tid_map.dat", msg));
            }
        }
        if matrix.forward_dimension() == 0 || matrix.backward_dimension() == 0 {
            return Err(SumomoError::invalid_format(
                "cc.dat",
                "The matrix has no connection ids for BOS/EOS.",
            ));
        }
        if !known.verify(&matrix) {
            return Err(SumomoError::invalid_format(
                "tid.dat",
                "includes invalid connection ids.",
            ));
        }

        let unknown = UnknownDictionary::from_parts(unknown_store, unknown_targets);
        unknown.check_categories(&char_table)?;
        if !unknown.verify(&matrix) {
            return Err(SumomoError::invalid_format(
                "unk.dat",
                "includes invalid connection ids.",
            ));
        }

        log::debug!(
            "Assembled a dictionary of {} known entries and {} surface forms",
            known.num_entries(),
            targets.num_keys()
        );

        Ok(Self {
            known,
            word_map: WordMap::from_parts(trie, targets),
            matrix,
            char_table,
            unknown,
        })
    }

    /// ローダーでアーティファクトを読み込み、辞書を組み立てます。
    ///
    /// # 例
    ///
    /// ```no_run
    /// # async fn example() -> sumomo::errors::Result<()> {
    /// use sumomo::dictionary::{Dictionary, DirectoryLoader};
    ///
    /// let dict = Dictionary::load(&DirectoryLoader::new("./dict")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load<L>(loader: &L) -> Result<Self>
    where
        L: ArtifactLoader,
    {
        let artifacts = loader.load().await?;
        Self::from_artifacts(&artifacts)
    }
}
