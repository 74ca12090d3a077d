use khetkart_backend::config::JwtConfig;
use khetkart_backend::model::user::Role;
use khetkart_backend::util::jwt::*;

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::from_test_env())
}

#[test]
fn test_jwt_utils_creation() {
    let jwt_utils = create_test_jwt_utils();
    assert!(!jwt_utils.jwt_config.jwt_secret.is_empty());
    assert!(jwt_utils.jwt_config.token_expiration_minutes > 0);
}

#[test]
fn test_generate_and_validate_token() {
    let jwt_utils = create_test_jwt_utils();

    let token = jwt_utils
        .generate_token("user123", Role::User)
        .expect("token generation should succeed");
    assert!(!token.is_empty());
    assert_eq!(token.matches('.').count(), 2);

    let claims = jwt_utils
        .validate_token(&token)
        .expect("token validation should succeed");
    assert_eq!(claims.sub, "user123");
    assert_eq!(claims.role, Role::User);
    assert!(claims.exp > claims.iat);
    assert!(!claims.jti.is_empty());
}

#[test]
fn test_role_survives_roundtrip() {
    let jwt_utils = create_test_jwt_utils();
    for role in [Role::User, Role::Admin, Role::Farmer, Role::Delivery] {
        let token = jwt_utils.generate_token("someone", role).unwrap();
        let claims = jwt_utils.validate_token(&token).unwrap();
        assert_eq!(claims.role, role);
    }
}

#[test]
fn test_tokens_are_unique() {
    let jwt_utils = create_test_jwt_utils();
    let a = jwt_utils.generate_token("user123", Role::User).unwrap();
    let b = jwt_utils.generate_token("user123", Role::User).unwrap();
    // jti differs even for identical subject and role
    assert_ne!(a, b);
}

#[test]
fn test_validate_rejects_garbage() {
    let jwt_utils = create_test_jwt_utils();
    assert!(matches!(
        jwt_utils.validate_token("not-a-token"),
        Err(JwtError::DecodingFailed(_))
    ));
    assert!(jwt_utils.validate_token("").is_err());
}

#[test]
fn test_validate_rejects_wrong_secret() {
    let jwt_utils = create_test_jwt_utils();
    let token = jwt_utils.generate_token("user123", Role::Admin).unwrap();

    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_secret: "a-completely-different-secret-also-long-enough".to_string(),
        token_expiration_minutes: 60,
    });
    assert!(other.validate_token(&token).is_err());
}

#[test]
fn test_expired_token_rejected() {
    let expired = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_secret: "test-secret-key-that-is-long-enough-for-hs256".to_string(),
        token_expiration_minutes: -10,
    });
    let token = expired.generate_token("user123", Role::User).unwrap();

    let jwt_utils = create_test_jwt_utils();
    assert!(matches!(
        jwt_utils.validate_token(&token),
        Err(JwtError::TokenExpired)
    ));
}

#[test]
fn test_extract_token_from_header() {
    let jwt_utils = create_test_jwt_utils();

    let token = jwt_utils
        .extract_token_from_header("Bearer abc.def.ghi")
        .unwrap();
    assert_eq!(token, "abc.def.ghi");

    assert!(matches!(
        jwt_utils.extract_token_from_header("Basic abc"),
        Err(JwtError::InvalidToken)
    ));
    assert!(matches!(
        jwt_utils.extract_token_from_header("Bearer "),
        Err(JwtError::InvalidToken)
    ));
    assert!(jwt_utils.extract_token_from_header("").is_err());
}
