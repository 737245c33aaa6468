//! キーからエントリIDの列への多値写像
//!
//! 同じ表層形や同じ文字カテゴリに複数のエントリが対応するため、
//! キーごとにエントリIDを挿入順のまま保持します。
//! この順序は、後段で同コストの候補を区別する際に使われます。

use std::collections::BTreeMap;

use crate::codec::ByteBuffer;
use crate::errors::{Result, SumomoError};

/// 挿入順を保つ多値写像
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdMultimap {
    map: BTreeMap<u32, Vec<u32>>,
}

impl IdMultimap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key`の末尾に`id`を追加します。
    #[inline(always)]
    pub fn push(&mut self, key: u32, id: u32) {
        self.map.entry(key).or_default().push(id);
    }

    /// `key`に対応するIDの列を挿入順で返します。
    ///
    /// 登録されていないキーには空のスライスを返します。
    #[inline(always)]
    pub fn get(&self, key: u32) -> &[u32] {
        self.map.get(&key).map_or(&[], Vec::as_slice)
    }

    #[inline(always)]
    pub fn contains_key(&self, key: u32) -> bool {
        self.map.contains_key(&key)
    }

    /// キーの数
    #[inline(always)]
    pub fn num_keys(&self) -> usize {
        self.map.len()
    }

    /// キーの昇順にすべての組を列挙します。
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32])> + '_ {
        self.map.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    /// バイト列に変換します。
    ///
    /// `i32 キー数`の後に、キーごとに`i32 キー, i32 個数, 個数 × i32 ID`が続きます。
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::with_capacity(4 + self.map.len() * 12);
        buf.put_i32(i32::try_from(self.map.len())?);
        for (&key, ids) in &self.map {
            buf.put_i32(i32::try_from(key)?);
            buf.put_i32(i32::try_from(ids.len())?);
            for &id in ids {
                buf.put_i32(i32::try_from(id)?);
            }
        }
        Ok(buf.into_vec())
    }

    /// [`IdMultimap::to_bytes`]で得たバイト列から復元します。
    ///
    /// # 引数
    ///
    /// * `bytes` - 入力バイト列
    /// * `name` - エラーメッセージに使うアーティファクト名
    pub fn from_bytes(bytes: &[u8], name: &'static str) -> Result<Self> {
        let buf = ByteBuffer::from_bytes(bytes.to_vec());
        let mut offset = 0;
        let mut read = || -> Result<u32> {
            let value = buf.get_i32(offset).ok_or_else(|| {
                SumomoError::invalid_format(name, format!("Truncated at byte {offset}"))
            })?;
            offset += 4;
            Ok(u32::try_from(value)?)
        };

        let num_keys = read()?;
        let mut map = BTreeMap::new();
        for _ in 0..num_keys {
            let key = read()?;
            let len = read()?;
            let mut ids = Vec::with_capacity(len.min(1024) as usize);
            for _ in 0..len {
                ids.push(read()?);
            }
            if map.insert(key, ids).is_some() {
                return Err(SumomoError::invalid_format(
                    name,
                    format!("Duplicate key {key}"),
                ));
            }
        }

        if offset != buf.len() {
            let msg = format!("{} trailing bytes", buf.len() - offset);
            return Err(SumomoError::invalid_format(name, msg));
        }
        Ok(Self { map })
    }
}
