use once_cell::sync::Lazy;
use tiktoken_rs::{CoreBPE, cl100k_base};

// Loaded once per process and shared read-only.
static BPE: Lazy<Option<CoreBPE>> = Lazy::new(|| match cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        log::warn!("Token encoder unavailable ({}), falling back to estimation", e);
        None
    }
});

// Approximate token count for prompt budgeting. Falls back to a chars/4
// estimate if the encoder cannot be loaded.
pub fn count_tokens(text: &str) -> usize {
    match BPE.as_ref() {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => text.chars().count() / 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_counts_zero_tokens() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn counting_is_consistent_for_identical_input() {
        let text = "fn main() { println!(\"hello\"); }";
        assert_eq!(count_tokens(text), count_tokens(text));
    }

    #[test]
    fn longer_documents_never_count_fewer_tokens() {
        let short = "one two three";
        let long = format!("{} four five six seven eight", short);
        assert!(count_tokens(&long) >= count_tokens(short));
        assert!(count_tokens(short) > 0);
    }
}
