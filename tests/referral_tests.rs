use khetkart_backend::util::referral_code::generate_referral_code;

#[test]
fn test_code_starts_with_name_prefix() {
    let code = generate_referral_code("Ramesh Kumar");
    assert!(code.starts_with("RAMESH"));
    assert_eq!(code.len(), 10);
}

#[test]
fn test_short_names_keep_what_they_have() {
    let code = generate_referral_code("Al");
    assert!(code.starts_with("AL"));
    assert_eq!(code.len(), 6);
}

#[test]
fn test_non_alphanumeric_base_falls_back() {
    let code = generate_referral_code("!!! ???");
    assert!(code.starts_with("KK"));
    assert_eq!(code.len(), 6);
}

#[test]
fn test_code_is_uppercase_alphanumeric() {
    let code = generate_referral_code("farm fresh");
    assert!(code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[test]
fn test_codes_vary_for_same_base() {
    let codes: std::collections::HashSet<String> =
        (0..50).map(|_| generate_referral_code("Ramesh")).collect();
    // 4 random chars over a 36 symbol alphabet; 50 draws colliding into one
    // bucket would mean the suffix is not random at all
    assert!(codes.len() > 1);
}
