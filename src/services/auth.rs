// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RbacRepository, UserRepository},
    models::auth::{AuthResponse, Claims, MeResponse, User},
    services::rbac_service::ADMIN_ROLE,
};

// Cargo dado a quem se cadastra sozinho
const SELF_SIGNUP_ROLE: &str = "customer";

/// O e-mail configurado em `ADMIN_EMAIL` recebe também o cargo de admin ao se cadastrar.
pub fn is_bootstrap_admin(admin_email: Option<&str>, email: &str) -> bool {
    admin_email.is_some_and(|admin| admin.trim().eq_ignore_ascii_case(email.trim()))
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    rbac_repo: RbacRepository,
    jwt_secret: String,
    token_ttl: Duration,
    admin_email: Option<String>,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        rbac_repo: RbacRepository,
        jwt_secret: String,
        token_ttl: Duration,
        admin_email: Option<String>,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, rbac_repo, jwt_secret, token_ttl, admin_email, pool }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthResponse, AppError> {
        // 1. Hashing fora da transação, num thread bloqueante
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Cria Usuário
        let new_user = self
            .user_repo
            .create_user(&mut *tx, email.trim(), &hashed_password, full_name.trim())
            .await?;

        // 3. Cargo padrão na mesma transação
        let role = self
            .rbac_repo
            .find_role_by_name(&mut *tx, SELF_SIGNUP_ROLE)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Cargo '{}' não existe", SELF_SIGNUP_ROLE))?;
        self.rbac_repo
            .assign_role_to_user(&mut *tx, new_user.id, role.id)
            .await?;

        if is_bootstrap_admin(self.admin_email.as_deref(), email) {
            let admin = self
                .rbac_repo
                .find_role_by_name(&mut *tx, ADMIN_ROLE)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Cargo '{}' não existe", ADMIN_ROLE))?;
            self.rbac_repo
                .assign_role_to_user(&mut *tx, new_user.id, admin.id)
                .await?;
            tracing::info!(user_id = %new_user.id, "👑 Administrador inicial cadastrado");
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(user_id = %new_user.id, "👤 Novo usuário cadastrado");
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        // Usuário desativado não entra, mas a resposta é a mesma de senha errada
        if !is_password_valid || !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_claims(&self.jwt_secret, token)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn me(&self, user: User) -> Result<MeResponse, AppError> {
        let roles = self.rbac_repo.role_names_of(user.id).await?;
        Ok(MeResponse { user, roles })
    }

    fn create_token(&self, user_id: Uuid) -> Result<AuthResponse, AppError> {
        let (token, expires_at) = encode_token(&self.jwt_secret, user_id, Utc::now(), self.token_ttl)?;
        Ok(AuthResponse { token, expires_at })
    }
}

pub(crate) fn encode_token(
    secret: &str,
    user_id: Uuid,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>), AppError> {
    let expires_at = now + ttl;

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok((token, expires_at))
}

// Assinatura ou expiração inválidas viram sempre 401
pub(crate) fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste-com-mais-de-32-bytes!!";

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let (token, expires_at) =
            encode_token(SECRET, user_id, Utc::now(), Duration::hours(2)).unwrap();
        let claims = decode_claims(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp, expires_at.timestamp() as usize);
    }

    #[test]
    fn test_token_with_other_secret_is_rejected() {
        let (token, _) =
            encode_token(SECRET, Uuid::new_v4(), Utc::now(), Duration::hours(2)).unwrap();
        let err = decode_claims("outro-segredo-tambem-bem-comprido!!!!", &token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Utc::now() - Duration::days(3);
        let (token, _) = encode_token(SECRET, Uuid::new_v4(), issued, Duration::days(1)).unwrap();
        assert!(matches!(decode_claims(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_bootstrap_admin_email_matches_case_insensitively() {
        assert!(is_bootstrap_admin(Some("Chef@Cozinha.com"), " chef@cozinha.com"));
        assert!(!is_bootstrap_admin(Some("chef@cozinha.com"), "caixa@cozinha.com"));
        assert!(!is_bootstrap_admin(None, "chef@cozinha.com"));
    }
}
