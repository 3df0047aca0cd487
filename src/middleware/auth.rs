use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
    pub tenant_id: Uuid,
    /// Set for members of a business; required by business-side operations.
    pub business_id: Option<Uuid>,
}

impl AuthUser {
    pub fn business_id(&self) -> Result<Uuid, AppError> {
        self.business_id.ok_or(AppError::Forbidden)
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
        tenant_id: decoded.claims.tenant_id,
        business_id: decoded.claims.business_id,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        decode_token(token, &secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(business_id: Option<Uuid>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            role: "business".into(),
            tenant_id: Uuid::new_v4(),
            business_id,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn decodes_tenant_and_business() {
        let business = Uuid::new_v4();
        let claims = claims(Some(business));
        let user = decode_token(&token(&claims, "s3cret"), "s3cret").unwrap();

        assert_eq!(user.user_id.to_string(), claims.sub);
        assert_eq!(user.tenant_id, claims.tenant_id);
        assert_eq!(user.business_id().unwrap(), business);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = claims(None);
        assert!(matches!(
            decode_token(&token(&claims, "one"), "two"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn customer_without_business_is_forbidden_on_business_side() {
        let claims = claims(None);
        let user = decode_token(&token(&claims, "k"), "k").unwrap();
        assert!(matches!(user.business_id(), Err(AppError::Forbidden)));
    }
}
