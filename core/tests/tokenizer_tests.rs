use evidex_core::tokenizer::tokenize;

#[test]
fn it_filters_persian_stopwords() {
    let toks = tokenize("دلار در بازار آزاد به بالاترین قیمت رسید");
    assert!(!toks.contains(&"در".to_string()));
    assert!(!toks.contains(&"به".to_string()));
    assert!(toks.contains(&"بازار".to_string()));
    assert!(toks.contains(&"دلار".to_string()));
}

#[test]
fn it_normalizes_compatibility_forms() {
    // NFKC folds the Latin ligature and lowercasing applies to mixed text.
    let toks = tokenize("ﬁnance گزارش NEWS");
    assert!(toks.contains(&"finance".to_string()));
    assert!(toks.contains(&"news".to_string()));
    assert!(toks.contains(&"گزارش".to_string()));
}

#[test]
fn zwnj_splits_compounds() {
    // The zero-width non-joiner maps to whitespace, so compounds split and
    // the plural suffix falls to the stop-word list.
    let toks = tokenize("کتاب\u{200c}ها");
    assert_eq!(toks, vec!["کتاب".to_string()]);
    // A non-stop-word suffix survives as its own token.
    let toks = tokenize("می\u{200c}خواهند");
    assert_eq!(toks, vec!["خواهند".to_string()]);
}

#[test]
fn empty_and_punctuation_only_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("؟! ... ، —").is_empty());
}
