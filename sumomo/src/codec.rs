//! 固定幅バイナリエンコーディング
//!
//! 辞書アーティファクトは、すべてリトルエンディアンの固定幅整数と
//! ヌル終端のUTF-8文字列で構成されます。[`ByteBuffer`]はその読み書きを担当します。

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::{Result, SumomoError};

/// 新規バッファの既定容量（1MiB）
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// 伸長可能なバイトバッファ
///
/// 書き込みは論理サイズ（`position`）の末尾に追記され、容量が足りない場合は
/// バッファを倍々に拡張します。読み出しは任意のオフセットから行い、
/// 論理サイズを超える位置に対しては`None`を返します。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    buffer: Vec<u8>,
    position: usize,
}

impl ByteBuffer {
    /// 既定容量で空のバッファを作成します。
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 指定容量で空のバッファを作成します。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            position: 0,
        }
    }

    /// 既存のバイト列を読み出し用にラップします。
    ///
    /// 論理サイズはバイト列の長さになります。
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let position = bytes.len();
        Self {
            buffer: bytes,
            position,
        }
    }

    /// 書き込み済みの論理サイズ
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    /// 書き込み済みバイト数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.position
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// 現在確保されている容量
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// 書き込み済みのバイト列
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.position]
    }

    /// バッファを論理サイズまで切り詰めます。
    ///
    /// 永続化や読み出し専用に凍結する前に呼び出します。
    pub fn shrink(&mut self) {
        self.buffer.truncate(self.position);
        self.buffer.shrink_to_fit();
    }

    /// 切り詰めたバイト列を取り出します。
    pub fn into_vec(mut self) -> Vec<u8> {
        self.shrink();
        self.buffer
    }

    fn reserve(&mut self, additional: usize) {
        let required = self.position + additional;
        if required <= self.buffer.len() {
            return;
        }
        let mut new_len = self.buffer.len().max(1);
        while new_len < required {
            new_len *= 2;
        }
        self.buffer.resize(new_len, 0);
    }

    /// 1バイトを書き込みます。
    pub fn put_u8(&mut self, value: u8) {
        self.reserve(1);
        self.buffer[self.position] = value;
        self.position += 1;
    }

    /// 符号付き16ビット整数を書き込みます。
    pub fn put_i16(&mut self, value: i16) {
        self.reserve(2);
        LittleEndian::write_i16(&mut self.buffer[self.position..], value);
        self.position += 2;
    }

    /// 符号付き32ビット整数を書き込みます。
    pub fn put_i32(&mut self, value: i32) {
        self.reserve(4);
        LittleEndian::write_i32(&mut self.buffer[self.position..], value);
        self.position += 4;
    }

    /// ヌル終端のUTF-8文字列を書き込みます。
    ///
    /// # エラー
    ///
    /// 文字列がヌル文字を含む場合、終端を一意に決められないためエラーを返します。
    pub fn put_str(&mut self, value: &str) -> Result<()> {
        if value.as_bytes().contains(&0) {
            return Err(SumomoError::invalid_argument(
                "value",
                "A string must not contain the null character.",
            ));
        }
        let bytes = value.as_bytes();
        self.reserve(bytes.len() + 1);
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        self.buffer[self.position] = 0;
        self.position += 1;
        Ok(())
    }

    /// `offset`の1バイトを読み出します。
    #[inline(always)]
    pub fn get_u8(&self, offset: usize) -> Option<u8> {
        self.as_slice().get(offset).copied()
    }

    /// `offset`から符号付き16ビット整数を読み出します。
    #[inline(always)]
    pub fn get_i16(&self, offset: usize) -> Option<i16> {
        let end = offset.checked_add(2)?;
        self.as_slice().get(offset..end).map(LittleEndian::read_i16)
    }

    /// `offset`から符号付き32ビット整数を読み出します。
    #[inline(always)]
    pub fn get_i32(&self, offset: usize) -> Option<i32> {
        let end = offset.checked_add(4)?;
        self.as_slice().get(offset..end).map(LittleEndian::read_i32)
    }

    /// `offset`からヌル終端の文字列を読み出します。
    ///
    /// 終端が見つからない場合や、UTF-8として不正な場合は`None`を返します。
    pub fn get_str(&self, offset: usize) -> Option<&str> {
        let tail = self.as_slice().get(offset..)?;
        let len = tail.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&tail[..len]).ok()
    }
}
