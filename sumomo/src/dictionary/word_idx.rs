//! 単語識別子
//!
//! このモジュールは、辞書内の単語を一意に識別するための
//! インデックス構造を提供します。

use crate::dictionary::WordType;

/// 単語の識別子
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct WordIdx {
    /// この単語を含むエントリ表の種類
    pub word_type: WordType,

    /// エントリID（エントリ表内のバイト位置）
    pub word_id: u32,
}

impl WordIdx {
    /// 新しいインスタンスを作成します。
    #[inline(always)]
    pub const fn new(word_type: WordType, word_id: u32) -> Self {
        Self { word_type, word_id }
    }
}
