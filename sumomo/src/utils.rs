//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! - `FromU32`: u32からの型変換トレイト
//! - CSV行の解析と引用符処理

use csv_core::ReadFieldResult;

/// u32から他の型への変換を提供するトレイト
///
/// 辞書内部のIDは`u32`で保持し、配列の添字として使うときに`usize`へ変換します。
pub trait FromU32 {
    /// u32値から実装型を生成する
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

/// CSVセルのデータを必要に応じて引用符で囲んで返す
///
/// カンマやダブルクォートを含むセルだけがクォートされ、
/// それ以外の文字列はそのまま返ります。
///
/// # 例
///
/// ```
/// # use sumomo::utils::quote_csv_cell;
/// assert_eq!(quote_csv_cell("名詞"), "名詞");
/// assert_eq!(quote_csv_cell("1,2-ジクロロエタン"), "\"1,2-ジクロロエタン\"");
/// ```
pub fn quote_csv_cell(data: &str) -> String {
    if data.is_empty() {
        return String::new();
    }
    let mut data = data.as_bytes();
    let mut quoted = vec![];
    let mut output = [0; 4096];
    let mut writer = csv_core::Writer::new();
    loop {
        let (result, nin, nout) = writer.field(data, &mut output);
        quoted.extend_from_slice(&output[..nout]);
        if result == csv_core::WriteResult::InputEmpty {
            break;
        }
        data = &data[nin..];
    }
    let (_, nout) = writer.finish(&mut output);
    quoted.extend_from_slice(&output[..nout]);
    String::from_utf8_lossy(&quoted).into_owned()
}

/// CSV形式の行を解析してフィールドのベクターに分割する
///
/// ダブルクォートで囲まれたフィールドや、フィールド内のカンマも正しく処理します。
///
/// # 例
///
/// ```
/// # use sumomo::utils::parse_csv_row;
/// let fields = parse_csv_row("名詞,トスカーナ");
/// assert_eq!(fields, vec!["名詞", "トスカーナ"]);
///
/// let fields_with_quote = parse_csv_row("名詞,\"1,2-ジクロロエタン\"");
/// assert_eq!(fields_with_quote, vec!["名詞", "1,2-ジクロロエタン"]);
/// ```
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut features = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    let mut field = vec![];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        field.extend_from_slice(&output[..nout]);
        bytes = &bytes[nin..];
        let end = match result {
            // 列が出力バッファより長い。
            ReadFieldResult::OutputFull => continue,
            ReadFieldResult::Field { record_end } => record_end,
            ReadFieldResult::InputEmpty | ReadFieldResult::End => true,
        };
        features.push(String::from_utf8_lossy(&field).into_owned());
        field.clear();
        if end {
            break;
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_row() {
        assert_eq!(
            &["すもも", "名詞", "一般"],
            parse_csv_row("すもも,名詞,一般").as_slice()
        );
    }

    #[test]
    fn test_parse_csv_row_with_quote() {
        assert_eq!(
            &["名詞", "1,2-ジクロロエタン"],
            parse_csv_row("名詞,\"1,2-ジクロロエタン\"").as_slice()
        );
    }

    #[test]
    fn test_quote_csv_cell() {
        assert_eq!(quote_csv_cell("すもも"), "すもも");
        assert_eq!(quote_csv_cell(""), "");
        assert_eq!(quote_csv_cell("a,b"), "\"a,b\"");
        assert_eq!(quote_csv_cell("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            parse_csv_row(&quote_csv_cell("1,2-ジクロロエタン")),
            vec!["1,2-ジクロロエタン"]
        );
    }

    #[test]
    fn test_parse_csv_row_with_empty_fields() {
        assert_eq!(&["", "*", ""], parse_csv_row(",*,").as_slice());
    }

    #[test]
    fn test_parse_csv_row_long_field() {
        let long = "も".repeat(3000);
        let row = format!("{long},名詞");
        let fields = parse_csv_row(&row);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], long);
        assert_eq!(fields[1], "名詞");
    }
}
