//! 単語の素性文字列テーブル
//!
//! 素性文字列はヌル終端で連結して保持し、エントリからはバイトオフセットで参照します。

use crate::codec::ByteBuffer;
use crate::errors::Result;

/// CSV行のうち、マスク時に空にする列の位置
///
/// 表層形, 左ID, 右ID, コストを除いた素性列での位置で、
/// 品詞細分類1〜3, 活用型, 活用形, 原形, 発音に対応します。
const MASKED_FEATURE_INDICES: [usize; 7] = [1, 2, 3, 4, 5, 6, 8];

/// 単語の素性情報を管理する構造体
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordFeatures {
    buf: ByteBuffer,
}

impl WordFeatures {
    pub fn new() -> Self {
        Self {
            buf: ByteBuffer::with_capacity(4096),
        }
    }

    /// 素性文字列を追加し、そのオフセットを返します。
    pub fn push(&mut self, feature: &str) -> Result<i32> {
        let offset = i32::try_from(self.buf.position())?;
        self.buf.put_str(feature)?;
        Ok(offset)
    }

    /// オフセットの素性文字列を取得します。
    #[inline(always)]
    pub fn get(&self, offset: usize) -> Option<&str> {
        self.buf.get_str(offset)
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn shrink(&mut self) {
        self.buf.shrink();
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buf: ByteBuffer::from_bytes(bytes),
        }
    }
}

/// 辞書サイズを抑えるため、解析結果に使わない素性を空にします。
///
/// 表層形, 品詞, 読みは残します。
pub fn mask_features(features: &mut [String]) {
    for &i in &MASKED_FEATURE_INDICES {
        if let Some(f) = features.get_mut(i) {
            f.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_get() {
        let mut features = WordFeatures::new();
        let a = features.push("すもも,名詞,一般").unwrap();
        let b = features.push("も,助詞,係助詞").unwrap();
        assert_eq!(a, 0);
        assert_eq!(features.get(0), Some("すもも,名詞,一般"));
        assert_eq!(features.get(usize::try_from(b).unwrap()), Some("も,助詞,係助詞"));
        assert_eq!(features.get(1000), None);
    }

    #[test]
    fn test_mask_features() {
        let mut features: Vec<String> =
            "名詞,一般,*,*,*,*,すもも,スモモ,スモモ".split(',').map(String::from).collect();
        mask_features(&mut features);
        assert_eq!(features.join(","), "名詞,,,,,,,スモモ,");
    }

    #[test]
    fn test_mask_short_features() {
        let mut features = vec!["名詞".to_string(), "一般".to_string()];
        mask_features(&mut features);
        assert_eq!(features, vec!["名詞", ""]);
    }
}
