use khetkart_backend::util::password::{PasswordUtils, PasswordUtilsImpl};

#[test]
fn test_hash_and_verify_password() {
    let hash = PasswordUtilsImpl::hash_password("hunter2-but-longer").unwrap();
    assert_ne!(hash, "hunter2-but-longer");
    assert!(hash.starts_with("$2"));

    assert!(PasswordUtilsImpl::verify_password("hunter2-but-longer", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("wrong-password", &hash).unwrap());
}

#[test]
fn test_hashes_are_salted() {
    let a = PasswordUtilsImpl::hash_password("same-password").unwrap();
    let b = PasswordUtilsImpl::hash_password("same-password").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_verify_rejects_malformed_hash() {
    assert!(PasswordUtilsImpl::verify_password("anything", "not-a-bcrypt-hash").is_err());
}

#[test]
fn test_generate_reset_token_shape() {
    let token = PasswordUtilsImpl::generate_reset_token();
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let other = PasswordUtilsImpl::generate_reset_token();
    assert_ne!(token, other);
}
