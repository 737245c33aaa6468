//! 辞書アーティファクト
//!
//! 辞書は論理名の付いた複数のバイト列の集合として永続化されます。
//! 解析エンジンが必要とするのは論理名からバイト列への写像だけです。

use std::fmt;

use hashbrown::HashMap;

use crate::errors::{Result, SumomoError};

/// アーティファクトの論理名
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactName {
    /// 表層形のトライ
    Trie,
    /// 既知語エントリ表
    KnownEntries,
    /// 既知語の素性文字列表
    KnownFeatures,
    /// トライIDから既知語エントリIDへの写像
    KnownTargets,
    /// 接続コスト行列
    ConnectionCost,
    /// 未知語エントリ表
    UnknownEntries,
    /// 未知語の素性文字列表
    UnknownFeatures,
    /// カテゴリIDから未知語エントリIDへの写像
    UnknownTargets,
    /// コード単位ごとの主カテゴリ
    CategoryMap,
    /// コード単位ごとの互換カテゴリ
    CompatibleMap,
    /// カテゴリ定義
    InvokeDefinition,
}

impl ArtifactName {
    /// すべての論理名
    pub const ALL: [Self; 11] = [
        Self::Trie,
        Self::KnownEntries,
        Self::KnownFeatures,
        Self::KnownTargets,
        Self::ConnectionCost,
        Self::UnknownEntries,
        Self::UnknownFeatures,
        Self::UnknownTargets,
        Self::CategoryMap,
        Self::CompatibleMap,
        Self::InvokeDefinition,
    ];

    /// 論理名の文字列表現
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trie => "trie.dat",
            Self::KnownEntries => "tid.dat",
            Self::KnownFeatures => "tid_pos.dat",
            Self::KnownTargets => "tid_map.dat",
            Self::ConnectionCost => "cc.dat",
            Self::UnknownEntries => "unk.dat",
            Self::UnknownFeatures => "unk_pos.dat",
            Self::UnknownTargets => "unk_map.dat",
            Self::CategoryMap => "unk_char.dat",
            Self::CompatibleMap => "unk_compat.dat",
            Self::InvokeDefinition => "unk_invoke.dat",
        }
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 論理名からバイト列への写像
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Artifacts {
    map: HashMap<ArtifactName, Vec<u8>>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: ArtifactName, bytes: Vec<u8>) {
        self.map.insert(name, bytes);
    }

    #[inline(always)]
    pub fn get(&self, name: ArtifactName) -> Option<&[u8]> {
        self.map.get(&name).map(Vec::as_slice)
    }

    /// 論理名のバイト列を取得します。
    ///
    /// # エラー
    ///
    /// 含まれていない場合は[`SumomoError::MissingArtifact`]を返します。
    pub fn require(&self, name: ArtifactName) -> Result<&[u8]> {
        self.get(name)
            .ok_or_else(|| SumomoError::MissingArtifact(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 論理名の順にバイト列を列挙します。
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactName, &[u8])> + '_ {
        ArtifactName::ALL
            .into_iter()
            .filter_map(|name| Some((name, self.get(name)?)))
    }
}

impl FromIterator<(ArtifactName, Vec<u8>)> for Artifacts {
    fn from_iter<I: IntoIterator<Item = (ArtifactName, Vec<u8>)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
