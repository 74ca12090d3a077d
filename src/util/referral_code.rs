//! Referral code generation.
//!
//! Codes are the first six alphanumeric characters of the owner's name,
//! uppercased, followed by a four character random suffix. Uniqueness is the
//! caller's responsibility (regenerate on collision).

use rand::Rng;

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 4;

pub fn generate_referral_code(base: &str) -> String {
    let clean: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(6)
        .collect::<String>()
        .to_uppercase();
    let clean = if clean.is_empty() {
        "KK".to_string()
    } else {
        clean
    };

    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SUFFIX_CHARSET.len());
            SUFFIX_CHARSET[idx] as char
        })
        .collect();

    format!("{}{}", clean, suffix)
}
