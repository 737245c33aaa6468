use crate::dictionary::WordType;
use crate::tokenizer::Tokenizer;

use super::build_dictionary;

/// 既知語だけからなる文のトークン化のテスト
#[test]
fn test_tokenize_sumomo() {
    let tokenizer = Tokenizer::new(build_dictionary());
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("すもももももももものうち");
    worker.tokenize();

    let surfaces: Vec<_> = worker.token_iter().map(|t| t.surface()).collect();
    assert_eq!(
        surfaces,
        vec!["すもも", "も", "もも", "も", "もも", "の", "うち"]
    );
    assert!(worker.token_iter().all(|t| t.word_type() == WordType::Known));

    let t = worker.token(0);
    assert_eq!(t.left_id(), 1);
    assert_eq!(t.right_id(), 1);
    assert_eq!(t.word_cost(), 3000);
    assert_eq!(t.total_cost(), 2900);

    let t = worker.token(6);
    assert_eq!(t.range_char(), 10..12);
    assert_eq!(t.range_byte(), 30..36);
    assert_eq!(t.total_cost(), 17350);
}

/// 所有型トークンの素性と位置のテスト
#[test]
fn test_tokenize_bufs() {
    let tokenizer = Tokenizer::new(build_dictionary());
    let tokens = tokenizer.tokenize("すもももももももものうち");
    let positions: Vec<_> = tokens.iter().map(|t| t.word_position).collect();
    assert_eq!(positions, vec![1, 4, 5, 7, 8, 10, 11]);

    let t = &tokens[1];
    assert_eq!(t.surface_form, "も");
    assert_eq!(t.pos.as_deref(), Some("助詞"));
    assert_eq!(t.pos_detail_1.as_deref(), Some("係助詞"));
    assert_eq!(t.conjugated_type.as_deref(), Some("*"));
    assert_eq!(t.basic_form.as_deref(), Some("も"));
    assert_eq!(t.reading.as_deref(), Some("モ"));
    assert_eq!(t.pronunciation.as_deref(), Some("モ"));
    assert_eq!(t.word_type, WordType::Known);
}

/// 既知語と未知語が混在する文のテスト
#[test]
fn test_tokenize_mixed() {
    let tokenizer = Tokenizer::new(build_dictionary());
    let tokens = tokenizer.tokenize("東京都のABC");

    let summary: Vec<_> = tokens
        .iter()
        .map(|t| (t.surface_form.as_str(), t.word_type, t.word_position))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("東京都", WordType::Known, 1),
            ("の", WordType::Known, 4),
            ("ABC", WordType::Unknown, 5),
        ]
    );

    let t = &tokens[0];
    assert_eq!(t.pos_detail_1.as_deref(), Some("固有名詞"));
    assert_eq!(t.pronunciation.as_deref(), Some("トーキョート"));

    let t = &tokens[2];
    assert_eq!(t.pos.as_deref(), Some("名詞"));
    assert_eq!(t.pos_detail_1.as_deref(), Some("固有名詞"));
    assert_eq!(t.pos_detail_2.as_deref(), Some("組織"));
    assert_eq!(t.reading, None);
    assert_eq!(t.pronunciation, None);
}

/// 未知語のグルーピングのテスト
#[test]
fn test_tokenize_unknown_group() {
    let tokenizer = Tokenizer::new(build_dictionary());
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("スモモー");
    worker.tokenize();
    assert_eq!(worker.num_tokens(), 1);

    let t = worker.token(0);
    assert_eq!(t.surface(), "スモモー");
    assert_eq!(t.word_type(), WordType::Unknown);
    assert!(t.feature().starts_with("KATAKANA,名詞,一般"));
    assert_eq!(t.total_cost(), 3900);
}

/// 句読点で区切った各部分の位置が入力全体に対する位置になることのテスト
#[test]
fn test_tokenize_punctuation() {
    let tokenizer = Tokenizer::new(build_dictionary());
    let tokens = tokenizer.tokenize("すもも。もも");

    let summary: Vec<_> = tokens
        .iter()
        .map(|t| (t.surface_form.as_str(), t.word_position))
        .collect();
    assert_eq!(summary, vec![("すもも", 1), ("。", 4), ("もも", 5)]);
    assert_eq!(tokens[1].word_type, WordType::Unknown);
    assert_eq!(tokens[1].pos.as_deref(), Some("記号"));
}

/// 同じ入力に対して常に同じ結果を返すことのテスト
#[test]
fn test_tokenize_idempotent() {
    let tokenizer = Tokenizer::new(build_dictionary());
    let text = "東京都のすもも、京都のもも。";
    assert_eq!(tokenizer.tokenize(text), tokenizer.tokenize(text));
}
