mod test_utils;

use asset_vault::{
    auth::{jwt::JwtService, password::hash_password},
    entities::user::{LoginUser, NewUser, User, UserInsert},
    errors::{AppError, AuthError},
    repositories::user::UserRepository,
    use_cases::auth::AuthHandler,
};
use async_trait::async_trait;
use chrono::Utc;
use mockall::{mock, predicate::eq};
use uuid::Uuid;

use test_utils::test_config;

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
        async fn create_user(&self, user: &UserInsert) -> Result<User, AppError>;
    }
}

fn jwt() -> JwtService {
    JwtService::new(&test_config("postgres://unused", "http://unused"))
}

fn stored_user(email: &str, password: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: hash_password(password).unwrap(),
        created_at: Utc::now(),
    }
}

#[actix_rt::test]
async fn register_stores_normalized_email_and_hashed_password() {
    let mut repo = MockUserRepo::new();
    repo.expect_create_user()
        .withf(|insert| {
            insert.email == "jane@example.com"
                && insert.password_hash.starts_with("$argon2id$")
                && insert.password_hash != "Password1"
        })
        .times(1)
        .returning(|insert| Ok(User {
            id: Uuid::new_v4(),
            email: insert.email.clone(),
            password_hash: insert.password_hash.clone(),
            created_at: Utc::now(),
        }));

    let handler = AuthHandler::new(repo, jwt());
    let response = handler.register(NewUser {
        email: "  Jane@Example.com ".into(),
        password: "Password1".into(),
    })
    .await
    .unwrap();

    assert_eq!(response.email, "jane@example.com");
}

#[actix_rt::test]
async fn register_rejects_invalid_input_before_touching_storage() {
    let mut repo = MockUserRepo::new();
    repo.expect_create_user().times(0);

    let handler = AuthHandler::new(repo, jwt());
    let err = handler.register(NewUser {
        email: "nope".into(),
        password: "short".into(),
    })
    .await
    .unwrap_err();

    let AppError::ValidationError(fields) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(fields.iter().any(|f| f.field == "email"));
    assert!(fields.iter().any(|f| f.field == "password"));
}

#[actix_rt::test]
async fn register_surfaces_duplicate_email_as_conflict() {
    let mut repo = MockUserRepo::new();
    repo.expect_create_user()
        .returning(|_| Err(AppError::Conflict("Email already registered".into())));

    let handler = AuthHandler::new(repo, jwt());
    let err = handler.register(NewUser {
        email: "taken@example.com".into(),
        password: "Password1".into(),
    })
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[actix_rt::test]
async fn login_issues_token_for_the_stored_identity() {
    let user = stored_user("ada@example.com", "Password1");
    let user_id = user.id;

    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_email()
        .with(eq("ada@example.com"))
        .times(1)
        .returning(move |_| Ok(Some(user.clone())));

    let handler = AuthHandler::new(repo, jwt());
    let response = handler.login(LoginUser {
        email: " ADA@example.com".into(),
        password: "Password1".into(),
    })
    .await
    .unwrap();

    let identity = handler.authenticate(&response.token).unwrap();
    assert_eq!(identity.id, user_id);
    assert_eq!(identity.email, "ada@example.com");
}

#[actix_rt::test]
async fn unknown_email_and_wrong_password_fail_identically() {
    let user = stored_user("ada@example.com", "Password1");

    let mut repo = MockUserRepo::new();
    repo.expect_get_user_by_email()
        .with(eq("ada@example.com"))
        .returning(move |_| Ok(Some(user.clone())));
    repo.expect_get_user_by_email()
        .with(eq("ghost@example.com"))
        .returning(|_| Ok(None));

    let handler = AuthHandler::new(repo, jwt());

    let wrong_password = handler.login(LoginUser {
        email: "ada@example.com".into(),
        password: "Password2".into(),
    })
    .await
    .unwrap_err();

    let unknown_email = handler.login(LoginUser {
        email: "ghost@example.com".into(),
        password: "Password1".into(),
    })
    .await
    .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(matches!(wrong_password, AppError::Auth(AuthError::WrongCredentials)));
    assert!(matches!(unknown_email, AppError::Auth(AuthError::WrongCredentials)));
}

#[actix_rt::test]
async fn authenticate_rejects_tampered_tokens() {
    let handler = AuthHandler::new(MockUserRepo::new(), jwt());
    let user = stored_user("ada@example.com", "Password1");

    let token = handler.create_auth_response(&user).unwrap().token;
    let tampered = format!("{}x", token);

    assert_eq!(handler.authenticate(&tampered).unwrap_err(), AuthError::InvalidToken);
}
