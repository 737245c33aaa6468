//! トライ構造による高速文字列検索
//!
//! 辞書は表層形から整数IDへの写像と、その共通接頭辞検索だけを必要とします。
//! その契約を[`Trie`]トレイトとして定め、crawdadのダブル配列による実装を提供します。
//!
//! 永続化するのはダブル配列そのものではなく、整列済みの(キー, ID)レコードです。
//! 読み込み時にレコードを検証してからダブル配列を再構築するため、
//! 破損したバイト列はパニックではなくエラーになります。

use crate::codec::ByteBuffer;
use crate::errors::{Result, SumomoError};

const TRIE_DAT: &str = "trie.dat";

/// 表層形から整数IDを引くトライの契約
pub trait Trie: Sized {
    /// レコードからトライを構築します。
    ///
    /// キーは空でない一意な文字列で、辞書順に整列している必要があります。
    fn from_records<K>(records: &[(K, u32)]) -> Result<Self>
    where
        K: AsRef<str>;

    /// キーに完全一致するIDを返します。
    fn exact_match(&self, key: &str) -> Option<u32>;

    /// `input`の接頭辞になっているキーを、短いものから順に列挙します。
    fn common_prefix_iterator<'a>(
        &'a self,
        input: &'a [char],
    ) -> impl Iterator<Item = TrieMatch> + 'a;

    /// 永続化用のバイト列に変換します。
    fn serialize_to_vec(&self) -> Result<Vec<u8>>;

    /// [`Trie::serialize_to_vec`]で得たバイト列から復元します。
    ///
    /// # エラー
    ///
    /// バイト列が途中で切れている場合や、レコードの並びが不正な場合は
    /// [`SumomoError::InvalidFormat`]を返します。
    fn deserialize_from_slice(bytes: &[u8]) -> Result<Self>;
}

/// ダブル配列トライ
pub struct DoubleArrayTrie {
    da: crawdad::Trie,
    records: Vec<(String, u32)>,
}

impl Trie for DoubleArrayTrie {
    fn from_records<K>(records: &[(K, u32)]) -> Result<Self>
    where
        K: AsRef<str>,
    {
        Ok(Self {
            da: crawdad::Trie::from_records(records.iter().map(|(k, v)| (k, *v)))
                .map_err(|e| SumomoError::invalid_argument("records", e.to_string()))?,
            records: records
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), *v))
                .collect(),
        })
    }

    #[inline(always)]
    fn exact_match(&self, key: &str) -> Option<u32> {
        self.da.exact_match(key.chars())
    }

    #[inline(always)]
    fn common_prefix_iterator<'a>(
        &'a self,
        input: &'a [char],
    ) -> impl Iterator<Item = TrieMatch> + 'a {
        self.da
            .common_prefix_search(input.iter().cloned())
            .map(move |(value, end_char)| TrieMatch::new(value, end_char))
    }

    /// レコード数(i32)に続けて、ヌル終端のキーとID(i32)を並べます。
    fn serialize_to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::new();
        buf.put_i32(i32::try_from(self.records.len())?);
        for (key, id) in &self.records {
            buf.put_str(key)?;
            buf.put_i32(i32::try_from(*id)?);
        }
        Ok(buf.into_vec())
    }

    fn deserialize_from_slice(bytes: &[u8]) -> Result<Self> {
        let buf = ByteBuffer::from_bytes(bytes.to_vec());
        let num_records = buf
            .get_i32(0)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| SumomoError::invalid_format(TRIE_DAT, "The record count is broken."))?;
        if num_records == 0 {
            return Err(SumomoError::invalid_format(TRIE_DAT, "The trie is empty."));
        }

        let mut records: Vec<(String, u32)> = Vec::new();
        let mut offset = 4;
        for i in 0..num_records {
            let truncated = || {
                let msg = format!("The record {i} of {num_records} is truncated.");
                SumomoError::invalid_format(TRIE_DAT, msg)
            };
            let key = buf.get_str(offset).ok_or_else(truncated)?;
            offset += key.len() + 1;
            let id = buf
                .get_i32(offset)
                .ok_or_else(truncated)
                .and_then(|id| {
                    u32::try_from(id).map_err(|_| {
                        SumomoError::invalid_format(TRIE_DAT, format!("A negative id: {id}"))
                    })
                })?;
            offset += 4;
            if key.is_empty() {
                return Err(SumomoError::invalid_format(TRIE_DAT, "A key is empty."));
            }
            if records.last().is_some_and(|(prev, _)| prev.as_str() >= key) {
                let msg = format!("The key {key:?} is not in ascending order.");
                return Err(SumomoError::invalid_format(TRIE_DAT, msg));
            }
            records.push((key.to_string(), id));
        }
        if offset != bytes.len() {
            let msg = format!("{} trailing bytes after the trie", bytes.len() - offset);
            return Err(SumomoError::invalid_format(TRIE_DAT, msg));
        }

        Self::from_records(&records)
            .map_err(|e| SumomoError::invalid_format(TRIE_DAT, e.to_string()))
    }
}

/// トライマッチング結果
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct TrieMatch {
    pub value: u32,
    pub end_char: usize,
}

impl TrieMatch {
    /// 新しいマッチング結果を作成します。
    #[inline(always)]
    pub const fn new(value: u32, end_char: usize) -> Self {
        Self { value, end_char }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> DoubleArrayTrie {
        DoubleArrayTrie::from_records(&[("す", 0), ("すもも", 1), ("も", 2), ("もも", 3)]).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let trie = build();
        assert_eq!(trie.exact_match("すもも"), Some(1));
        assert_eq!(trie.exact_match("も"), Some(2));
        assert_eq!(trie.exact_match("すも"), None);
        assert_eq!(trie.exact_match("うち"), None);
    }

    #[test]
    fn test_common_prefix_iterator() {
        let trie = build();
        let input: Vec<_> = "すもものうち".chars().collect();
        let matches: Vec<_> = trie.common_prefix_iterator(&input).collect();
        assert_eq!(matches, vec![TrieMatch::new(0, 1), TrieMatch::new(1, 3)]);

        let input: Vec<_> = "うち".chars().collect();
        assert_eq!(trie.common_prefix_iterator(&input).count(), 0);
    }

    #[test]
    fn test_serialize() {
        let trie = build();
        let bytes = trie.serialize_to_vec().unwrap();
        let other = DoubleArrayTrie::deserialize_from_slice(&bytes).unwrap();
        assert_eq!(other.exact_match("もも"), Some(3));
        assert_eq!(other.exact_match("すも"), None);
        assert!(DoubleArrayTrie::deserialize_from_slice(&[]).is_err());
    }

    #[test]
    fn test_deserialize_truncated() {
        let bytes = build().serialize_to_vec().unwrap();
        for len in 0..bytes.len() {
            let result = DoubleArrayTrie::deserialize_from_slice(&bytes[..len]);
            assert!(
                matches!(result, Err(SumomoError::InvalidFormat(_))),
                "length {len}"
            );
        }
    }

    #[test]
    fn test_deserialize_broken_records() {
        let encode = |records: &[(&str, i32)], count: i32| {
            let mut buf = ByteBuffer::new();
            buf.put_i32(count);
            for &(key, id) in records {
                buf.put_str(key).unwrap();
                buf.put_i32(id);
            }
            buf.into_vec()
        };
        let broken = [
            encode(&[("す", 0)], -1),
            encode(&[], 0),
            encode(&[("も", 0), ("す", 1)], 2),
            encode(&[("す", 0), ("す", 1)], 2),
            encode(&[("", 0)], 1),
            encode(&[("す", -5)], 1),
            encode(&[("す", 0), ("も", 1)], 1),
        ];
        for bytes in &broken {
            let result = DoubleArrayTrie::deserialize_from_slice(bytes);
            assert!(matches!(result, Err(SumomoError::InvalidFormat(_))));
        }
        let ok = encode(&[("す", 0), ("も", 1)], 2);
        assert!(DoubleArrayTrie::deserialize_from_slice(&ok).is_ok());
    }
}
