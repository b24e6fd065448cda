use crate::smallstrings::SmallestStrings;

fn first_n(alphabet: &[&str], n: usize) -> Vec<String> {
    SmallestStrings::new(alphabet.iter().map(|s| s.to_string()))
        .take(n)
        .collect()
}

#[test]
fn single_char_alphabet_orders_by_length_then_lexicographically() {
    assert_eq!(
        first_n(&["a", "b"], 8),
        ["a", "b", "aa", "ab", "ba", "bb", "aaa", "aab"]
    );
}

#[test]
fn mixed_length_letters_compose_every_total_length() {
    // lengths 1 and 2: length 3 is reachable as 1+1+1, 1+2 and 2+1
    assert_eq!(
        first_n(&["a", "bc"], 6),
        ["a", "aa", "bc", "aaa", "abc", "bca"]
    );
}

#[test]
fn infeasible_lengths_are_skipped() {
    // lengths 2 and 3: no string of length 1, 5 = 2+3 in both orders
    assert_eq!(
        first_n(&["ab", "xyz"], 7),
        ["ab", "xyz", "abab", "abxyz", "xyzab", "ababab"]
    );
}

#[test]
fn empty_letters_are_ignored() {
    assert_eq!(first_n(&["", "a"], 2), ["a", "aa"]);
}

#[test]
fn empty_alphabet_yields_nothing() {
    assert_eq!(first_n(&[], 3), Vec::<String>::new());
}

#[test]
fn duplicates_are_removed() {
    // "aa" is both a+a and the two-char letter
    assert_eq!(first_n(&["a", "aa"], 4), ["a", "aa", "aaa", "aaaa"]);
}
