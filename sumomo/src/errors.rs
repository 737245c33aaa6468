//! エラー型の定義
//!
//! このモジュールは、sumomoで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};

/// sumomo専用のResult型
///
/// エラー型としてデフォルトで[`SumomoError`]を使用します。
pub type Result<T, E = SumomoError> = std::result::Result<T, E>;

/// sumomoのエラー型
///
/// 辞書の構築・読み込みで発生する可能性のあるすべてのエラーを表現します。
/// 解析処理そのものはエラーを返しません。
#[derive(Debug, thiserror::Error)]
pub enum SumomoError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 辞書アーティファクトが見つからないエラー
    ///
    /// 読み込み結果に必要な論理名のバイト列が含まれていない場合に発生します。
    #[error("MissingArtifactError: {0}")]
    MissingArtifact(String),

    /// 整数変換エラー
    ///
    /// [`TryFromIntError`](std::num::TryFromIntError)のエラーバリアント。
    /// 固定幅フィールドに収まらない値を書き込もうとした場合にも発生します。
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// 整数パースエラー
    ///
    /// [`ParseIntError`](std::num::ParseIntError)のエラーバリアント。
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    ///
    /// [`std::str::Utf8Error`]のエラーバリアント。
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// I/Oエラー
    ///
    /// [`std::io::Error`](std::io::Error)のエラーバリアント。
    #[error(transparent)]
    StdIo(#[from] std::io::Error),
}

impl SumomoError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_argument() {
        let e = SumomoError::invalid_argument("left_id", "out of range");
        assert_eq!(e.to_string(), "InvalidArgumentError: left_id: out of range");
    }

    #[test]
    fn test_display_invalid_state() {
        let e = SumomoError::invalid_state("unk.def", "category KANJI has no entry");
        assert_eq!(
            e.to_string(),
            "InvalidStateError: unk.def: category KANJI has no entry"
        );
    }

    #[test]
    fn test_from_try_from_int() {
        let e: SumomoError = i16::try_from(40000i32).unwrap_err().into();
        assert!(matches!(e, SumomoError::TryFromInt(_)));
    }

    #[test]
    fn test_question_mark_conversion() {
        fn parse(s: &str) -> Result<i32> {
            Ok(s.parse::<i32>()?)
        }
        fn decode(bytes: &[u8]) -> Result<&str> {
            Ok(std::str::from_utf8(bytes)?)
        }
        assert!(matches!(parse("x1"), Err(SumomoError::ParseInt(_))));
        assert_eq!(parse("-3").unwrap(), -3);
        assert!(matches!(decode(&[0xff, 0xfe]), Err(SumomoError::Utf8(_))));
        assert_eq!(decode("もも".as_bytes()).unwrap(), "もも");
    }
}
