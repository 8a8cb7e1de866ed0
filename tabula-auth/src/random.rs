//! Random string generation over a fixed alphabet.

use rand::Rng;

/// Alphanumeric alphabet used for tokens.
const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J',
    'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1',
    '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Fixed-length random string over the alphanumeric alphabet.
pub fn random_string(len: usize) -> String {
    random_string_excluding(len, &[])
}

/// Fixed-length random string over the alphanumeric alphabet minus
/// `exclude`. Returns an empty string when the exclusion list exhausts the
/// alphabet.
pub fn random_string_excluding(len: usize, exclude: &[char]) -> String {
    let pool: Vec<char> = ALPHABET
        .iter()
        .filter(|c| !exclude.contains(c))
        .copied()
        .collect();
    if pool.is_empty() {
        return String::new();
    }
    let mut rng = rand::thread_rng();
    (0..len).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
}
