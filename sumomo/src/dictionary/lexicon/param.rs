//! 単語のパラメータ情報
//!
//! 単語の接続IDとコストを保持します。

/// 単語のパラメータ（接続IDとコスト）
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct WordParam {
    pub left_id: u16,
    pub right_id: u16,
    pub word_cost: i16,
}

impl WordParam {
    /// 新しい単語パラメータを作成します。
    #[inline(always)]
    pub const fn new(left_id: u16, right_id: u16, word_cost: i16) -> Self {
        Self {
            left_id,
            right_id,
            word_cost,
        }
    }
}
