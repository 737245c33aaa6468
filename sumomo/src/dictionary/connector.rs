//! 接続コスト行列
//!
//! 前の単語の右文脈IDと次の単語の左文脈IDの組から、
//! バイグラムの接続コストを引くための密な行列を提供します。

use std::io::{BufRead, BufReader, Read};

use byteorder::{ByteOrder, LittleEndian};

use crate::codec::ByteBuffer;
use crate::errors::{Result, SumomoError};

/// コネクターのビュー機能を提供するトレイト
pub trait ConnectorView {
    /// 左接続IDの最大数を返します。
    fn num_left(&self) -> usize;

    /// 右接続IDの最大数を返します。
    fn num_right(&self) -> usize;
}

/// 接続コスト計算機能を提供するトレイト
pub trait ConnectorCost: ConnectorView {
    /// 接続行列の値を取得します。
    ///
    /// # 引数
    ///
    /// * `right_id` - 前の単語の右接続ID
    /// * `left_id` - 次の単語の左接続ID
    fn cost(&self, right_id: u16, left_id: u16) -> i32;
}

/// 接続コストの行列
///
/// 大きさは`forward_dimension × backward_dimension`で、コストが小さいほど
/// 連接しやすいことを表します。値は`cost[forward * backward_dimension + backward]`に
/// 平坦化して保持します。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionCostMatrix {
    data: Vec<i16>,
    forward_dimension: usize,
    backward_dimension: usize,
}

impl ConnectionCostMatrix {
    /// すべてのコストが0の行列を作成します。
    ///
    /// # エラー
    ///
    /// 次元が`cc.dat`の16ビットのヘッダーに収まらない場合にエラーを返します。
    pub fn new(forward_dimension: usize, backward_dimension: usize) -> Result<Self> {
        for (arg, dim) in [
            ("forward_dimension", forward_dimension),
            ("backward_dimension", backward_dimension),
        ] {
            if i16::try_from(dim).is_err() {
                let msg = format!("{dim} exceeds the maximum dimension {}", i16::MAX);
                return Err(SumomoError::invalid_argument(arg, msg));
            }
        }
        let len = forward_dimension
            .checked_mul(backward_dimension)
            .ok_or_else(|| SumomoError::invalid_argument("backward_dimension", "overflow"))?;
        Ok(Self {
            data: vec![0; len],
            forward_dimension,
            backward_dimension,
        })
    }

    #[inline(always)]
    pub const fn forward_dimension(&self) -> usize {
        self.forward_dimension
    }

    #[inline(always)]
    pub const fn backward_dimension(&self) -> usize {
        self.backward_dimension
    }

    /// コストを設定します。
    ///
    /// # エラー
    ///
    /// `forward`または`backward`が行列の範囲外の場合にエラーを返します。
    pub fn put(&mut self, forward: usize, backward: usize, cost: i16) -> Result<()> {
        if forward >= self.forward_dimension {
            return Err(SumomoError::invalid_argument(
                "forward",
                format!(
                    "{forward} is out of range (forward_dimension = {})",
                    self.forward_dimension
                ),
            ));
        }
        if backward >= self.backward_dimension {
            return Err(SumomoError::invalid_argument(
                "backward",
                format!(
                    "{backward} is out of range (backward_dimension = {})",
                    self.backward_dimension
                ),
            ));
        }
        self.data[forward * self.backward_dimension + backward] = cost;
        Ok(())
    }

    /// コストを取得します。
    ///
    /// IDは構築時に検証済みであることを前提とします。
    #[inline(always)]
    pub fn get(&self, forward: usize, backward: usize) -> i16 {
        debug_assert!(forward < self.forward_dimension);
        debug_assert!(backward < self.backward_dimension);
        self.data[forward * self.backward_dimension + backward]
    }

    /// `matrix.def`形式のテキストから行列を構築します。
    ///
    /// 1行目に`前件サイズ 後件サイズ`、以降の各行に`前件ID 後件ID コスト`を記述します。
    ///
    /// # エラー
    ///
    /// 書式が不正な行や、範囲外のIDがあった場合にエラーを返します。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut lines = reader.lines();

        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => {
                    return Err(SumomoError::invalid_format(
                        "matrix.def",
                        "The header line is missing.",
                    ));
                }
            }
        };
        let (forward_dimension, backward_dimension) = Self::parse_header(&header)?;
        let mut matrix = Self::new(forward_dimension, backward_dimension)
            .map_err(|e| SumomoError::invalid_format("matrix.def", e.to_string()))?;

        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (forward, backward, cost) = Self::parse_body(&line)?;
            matrix.put(forward, backward, cost)?;
        }

        log::debug!(
            "Loaded a connection cost matrix of {forward_dimension}x{backward_dimension}"
        );
        Ok(matrix)
    }

    fn parse_header(line: &str) -> Result<(usize, usize)> {
        let cols: Vec<_> = line.split_ascii_whitespace().collect();
        if cols.len() != 2 {
            let msg = format!("The header must consist of two integers, {line}");
            return Err(SumomoError::invalid_format("matrix.def", msg));
        }
        let forward: i16 = cols[0].parse().map_err(|_| {
            SumomoError::invalid_format("matrix.def", format!("Invalid forward size, {line}"))
        })?;
        let backward: i16 = cols[1].parse().map_err(|_| {
            SumomoError::invalid_format("matrix.def", format!("Invalid backward size, {line}"))
        })?;
        let (Ok(forward), Ok(backward)) = (usize::try_from(forward), usize::try_from(backward))
        else {
            let msg = format!("Sizes must not be negative, {line}");
            return Err(SumomoError::invalid_format("matrix.def", msg));
        };
        Ok((forward, backward))
    }

    fn parse_body(line: &str) -> Result<(usize, usize, i16)> {
        let cols: Vec<_> = line.split_ascii_whitespace().collect();
        if cols.len() != 3 {
            let msg = format!("A line must consist of three integers, {line}");
            return Err(SumomoError::invalid_format("matrix.def", msg));
        }
        Ok((cols[0].parse()?, cols[1].parse()?, cols[2].parse()?))
    }

    /// `cc.dat`のバイト列に変換します。
    ///
    /// # エラー
    ///
    /// 次元が16ビットに収まらない場合にエラーを返します。
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::with_capacity(4 + self.data.len() * 2);
        buf.put_i16(i16::try_from(self.forward_dimension)?);
        buf.put_i16(i16::try_from(self.backward_dimension)?);
        for &cost in &self.data {
            buf.put_i16(cost);
        }
        Ok(buf.into_vec())
    }

    /// `cc.dat`のバイト列から行列を復元します。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let buf = ByteBuffer::from_bytes(bytes.to_vec());
        let (Some(forward), Some(backward)) = (buf.get_i16(0), buf.get_i16(2)) else {
            return Err(SumomoError::invalid_format(
                "cc.dat",
                "The header is truncated.",
            ));
        };
        let forward_dimension = usize::try_from(forward)?;
        let backward_dimension = usize::try_from(backward)?;
        let len = forward_dimension * backward_dimension;
        if buf.len() != 4 + len * 2 {
            let msg = format!(
                "Expected {} bytes for a {forward_dimension}x{backward_dimension} matrix, but got {}",
                4 + len * 2,
                buf.len()
            );
            return Err(SumomoError::invalid_format("cc.dat", msg));
        }
        let data = buf.as_slice()[4..]
            .chunks_exact(2)
            .map(LittleEndian::read_i16)
            .collect();
        Ok(Self {
            data,
            forward_dimension,
            backward_dimension,
        })
    }
}

impl ConnectorView for ConnectionCostMatrix {
    #[inline(always)]
    fn num_left(&self) -> usize {
        self.backward_dimension
    }

    #[inline(always)]
    fn num_right(&self) -> usize {
        self.forward_dimension
    }
}

impl ConnectorCost for ConnectionCostMatrix {
    #[inline(always)]
    fn cost(&self, right_id: u16, left_id: u16) -> i32 {
        i32::from(self.get(usize::from(right_id), usize::from(left_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let mut m = ConnectionCostMatrix::new(2, 3).unwrap();
        m.put(1, 2, -7).unwrap();
        m.put(0, 0, i16::MAX).unwrap();
        assert_eq!(m.get(1, 2), -7);
        assert_eq!(m.get(0, 0), i16::MAX);
        assert_eq!(m.get(1, 1), 0);
        assert_eq!(m.cost(1, 2), -7);
        assert_eq!(m.num_right(), 2);
        assert_eq!(m.num_left(), 3);
    }

    #[test]
    fn test_put_out_of_range() {
        let mut m = ConnectionCostMatrix::new(2, 3).unwrap();
        assert!(m.put(2, 0, 1).is_err());
        assert!(m.put(0, 3, 1).is_err());
    }

    #[test]
    fn test_from_reader() {
        let data = "2 3\n0 0 10\n0 2 -5\n\n1 1 3\n";
        let m = ConnectionCostMatrix::from_reader(data.as_bytes()).unwrap();
        assert_eq!(m.forward_dimension(), 2);
        assert_eq!(m.backward_dimension(), 3);
        assert_eq!(m.get(0, 0), 10);
        assert_eq!(m.get(0, 2), -5);
        assert_eq!(m.get(1, 1), 3);
        assert_eq!(m.get(1, 2), 0);
    }

    #[test]
    fn test_from_reader_oor() {
        let data = "1 1\n0 1 0";
        assert!(ConnectionCostMatrix::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_from_reader_few_cols() {
        let data = "1 1\n0 0";
        assert!(ConnectionCostMatrix::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_from_reader_cost_overflow() {
        let data = "1 1\n0 0 40000";
        assert!(ConnectionCostMatrix::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_from_reader_huge_header() {
        let data = "4294967296 4294967296\n0 0 1";
        let e = ConnectionCostMatrix::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(e, SumomoError::InvalidFormat(_)));

        let data = "40000 1\n0 0 1";
        let e = ConnectionCostMatrix::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(e, SumomoError::InvalidFormat(_)));

        let data = "-1 2\n0 0 1";
        assert!(ConnectionCostMatrix::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_new_huge_dimension() {
        assert!(ConnectionCostMatrix::new(usize::MAX, usize::MAX).is_err());
        assert!(ConnectionCostMatrix::new(40000, 1).is_err());
        assert!(ConnectionCostMatrix::new(1, 40000).is_err());
        let m = ConnectionCostMatrix::new(32767, 1).unwrap();
        assert_eq!(m.forward_dimension(), 32767);
    }

    #[test]
    fn test_from_reader_no_header() {
        assert!(ConnectionCostMatrix::from_reader("".as_bytes()).is_err());
    }

    #[test]
    fn test_bytes() {
        let mut m = ConnectionCostMatrix::new(2, 2).unwrap();
        m.put(0, 1, -300).unwrap();
        m.put(1, 0, 300).unwrap();
        let bytes = m.to_bytes().unwrap();
        assert_eq!(bytes.len(), 4 + 8);
        assert_eq!(&bytes[..4], &[2, 0, 2, 0]);
        assert_eq!(ConnectionCostMatrix::from_bytes(&bytes).unwrap(), m);
    }

    #[test]
    fn test_from_bytes_truncated() {
        let m = ConnectionCostMatrix::new(2, 2).unwrap();
        let bytes = m.to_bytes().unwrap();
        assert!(ConnectionCostMatrix::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(ConnectionCostMatrix::from_bytes(&bytes[..3]).is_err());
    }
}
