use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use crate::entities::token::Claims;
use crate::entities::user::User;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            expiration: Duration::minutes(config.jwt_expiration_minutes),
        }
    }

    pub fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.expiration).timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|_| AuthError::TokenCreation)
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.keys.decoding, &validation)
            .map_err(AuthError::from)
    }
}

impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        self.create_jwt(user)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        self.decode_jwt(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AppEnvironment;
    use jsonwebtoken::EncodingKey;
    use uuid::Uuid;

    fn config(secret: &str) -> AppConfig {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "test".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            database_url: "postgres://localhost/assets".into(),
            database_max_connections: 1,
            cors_allowed_origins: vec!["*".into()],
            jwt_secret: secret.into(),
            jwt_expiration_minutes: 60,
            cloudinary_cloud_name: "demo".into(),
            cloudinary_api_key: "key".into(),
            cloudinary_api_secret: "secret".into(),
            cloudinary_api_base_url: "http://localhost".into(),
            cloudinary_delivery_base_url: "http://localhost".into(),
            auto_tagging_threshold: 0.8,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            password_hash: "irrelevant".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let service = JwtService::new(&config(&"k".repeat(40)));
        let user = user();

        let token = service.create_jwt(&user).unwrap();
        let claims = service.decode_jwt(&token).unwrap().claims;

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new(&config(&"a".repeat(40)));
        let verifier = JwtService::new(&config(&"b".repeat(40)));

        let token = issuer.create_jwt(&user()).unwrap();
        assert_eq!(verifier.decode_jwt(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let secret = "s".repeat(40);
        let service = JwtService::new(&config(&secret));
        let past = (Utc::now() - Duration::hours(2)).timestamp() as usize;

        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "ada@example.com".into(),
            exp: past,
            iat: past - 60,
        };
        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.decode_jwt(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn garbage_is_an_invalid_token() {
        let service = JwtService::new(&config(&"k".repeat(40)));
        assert_eq!(service.decode_jwt("not.a.jwt").unwrap_err(), AuthError::InvalidToken);
    }
}
