use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{auth::schemas::TokenPairSchema, config::AuthJwtConfig, error::AppError};

/// Type of JWT: access or refresh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Claim name `Claims::kind` serializes to.
const TYPE_CLAIM: &str = "type";

/// Signing and verification keys plus token lifetimes.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Claim carrying the token kind on the wire.
    pub type_field: String,
}

/// `amount * unit` seconds, rejected when negative or past what a token expiry can hold.
fn ttl(key: &str, amount: i64, unit: i64) -> anyhow::Result<Duration> {
    let now = OffsetDateTime::now_utc();
    let secs = amount
        .checked_mul(unit)
        .filter(|secs| *secs >= 0)
        .filter(|secs| now.checked_add(TimeDuration::seconds(*secs)).is_some())
        .ok_or_else(|| anyhow!("token lifetime {amount} for {key} is out of range"))?;
    Ok(Duration::from_secs(secs.unsigned_abs()))
}

impl JwtKeys {
    /// Loads PEM keys (or an HMAC secret file for `HS*`) from the configured paths.
    pub fn from_config(cfg: &AuthJwtConfig) -> anyhow::Result<Self> {
        let algorithm = Algorithm::from_str(&cfg.algorithm)
            .map_err(|e| anyhow!("unsupported jwt algorithm {}: {e}", cfg.algorithm))?;
        let private = std::fs::read(&cfg.private_key_path)
            .with_context(|| format!("read {}", cfg.private_key_path.display()))?;

        let (encoding, decoding) = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => (
                EncodingKey::from_secret(&private),
                DecodingKey::from_secret(&private),
            ),
            _ => {
                let public = std::fs::read(&cfg.public_key_path)
                    .with_context(|| format!("read {}", cfg.public_key_path.display()))?;
                match algorithm {
                    Algorithm::ES256 | Algorithm::ES384 => (
                        EncodingKey::from_ec_pem(&private)?,
                        DecodingKey::from_ec_pem(&public)?,
                    ),
                    Algorithm::EdDSA => (
                        EncodingKey::from_ed_pem(&private)?,
                        DecodingKey::from_ed_pem(&public)?,
                    ),
                    _ => (
                        EncodingKey::from_rsa_pem(&private)?,
                        DecodingKey::from_rsa_pem(&public)?,
                    ),
                }
            }
        };

        if cfg.token_type_field.is_empty() {
            return Err(anyhow!("AUTH_JWT__TOKEN_TYPE_FIELD must not be empty"));
        }

        Ok(Self {
            encoding,
            decoding,
            algorithm,
            access_ttl: ttl(
                "AUTH_JWT__ACCESS_TOKEN_EXPIRE_MINUTES",
                cfg.access_token_expire_minutes,
                60,
            )?,
            refresh_ttl: ttl(
                "AUTH_JWT__REFRESH_TOKEN_EXPIRE_DAYS",
                cfg.refresh_token_expire_days,
                24 * 60 * 60,
            )?,
            type_field: cfg.token_type_field.clone(),
        })
    }

    /// HS256 keys from an in-memory secret.
    pub fn from_secret(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            access_ttl,
            refresh_ttl,
            type_field: TYPE_CLAIM.into(),
        }
    }
}

pub trait TokenService: Send + Sync {
    fn create_access_token(&self, user_id: Uuid) -> Result<String, AppError>;

    fn create_refresh_token(&self, user_id: Uuid) -> Result<String, AppError>;

    /// Verifies signature and expiry; any token kind.
    fn verify(&self, token: &str) -> Result<Claims, AppError>;

    fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("Access token required".into()));
        }
        Ok(claims)
    }

    fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AppError::Unauthorized("Not a refresh token".into()));
        }
        Ok(claims)
    }

    fn create_token_pair(&self, user_id: Uuid) -> Result<TokenPairSchema, AppError> {
        Ok(TokenPairSchema::bearer(
            self.create_access_token(user_id)?,
            self.create_refresh_token(user_id)?,
        ))
    }
}

pub struct TokenServiceImpl {
    keys: Arc<JwtKeys>,
}

impl TokenServiceImpl {
    pub fn new(keys: Arc<JwtKeys>) -> Self {
        Self { keys }
    }

    fn sign_with_kind(&self, user_id: Uuid, kind: TokenKind) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.keys.access_ttl,
            TokenKind::Refresh => self.keys.refresh_ttl,
        };
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .ok_or_else(|| anyhow!("token expiry out of range for {kind:?} token"))?;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            kind,
        };
        let payload = self.to_wire(&claims)?;
        let token = encode(&Header::new(self.keys.algorithm), &payload, &self.keys.encoding)
            .context("sign jwt")?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    fn to_wire(&self, claims: &Claims) -> Result<Map<String, Value>, AppError> {
        let Value::Object(mut payload) = serde_json::to_value(claims).context("encode claims")?
        else {
            return Err(anyhow!("claims must encode to an object").into());
        };
        if self.keys.type_field != TYPE_CLAIM {
            if let Some(kind) = payload.remove(TYPE_CLAIM) {
                payload.insert(self.keys.type_field.clone(), kind);
            }
        }
        Ok(payload)
    }

    fn from_wire(&self, mut payload: Map<String, Value>) -> Option<Claims> {
        if self.keys.type_field != TYPE_CLAIM {
            let kind = payload.remove(&self.keys.type_field)?;
            payload.insert(TYPE_CLAIM.into(), kind);
        }
        serde_json::from_value(Value::Object(payload)).ok()
    }
}

impl TokenService for TokenServiceImpl {
    fn create_access_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.sign_with_kind(user_id, TokenKind::Access)
    }

    fn create_refresh_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.sign_with_kind(user_id, TokenKind::Refresh)
    }

    fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(self.keys.algorithm);
        let rejected = || AppError::Unauthorized("Invalid or expired token".into());
        let data =
            decode::<Map<String, Value>>(token, &self.keys.decoding, &validation).map_err(|e| {
                warn!(error = %e, "jwt rejected");
                rejected()
            })?;
        let claims = self.from_wire(data.claims).ok_or_else(|| {
            warn!("jwt claims malformed");
            rejected()
        })?;
        debug!(user_id = %claims.sub, kind = ?claims.kind, "jwt verified");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthJwtConfig;

    fn service(secret: &[u8]) -> TokenServiceImpl {
        TokenServiceImpl::new(Arc::new(JwtKeys::from_secret(
            secret,
            Duration::from_secs(180),
            Duration::from_secs(7 * 24 * 3600),
        )))
    }

    #[test]
    fn sign_and_verify_access_token() {
        let svc = service(b"dev-secret");
        let user_id = Uuid::new_v4();
        let token = svc.create_access_token(user_id).expect("sign access");
        let claims = svc.verify_access(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 180);
    }

    #[test]
    fn sign_and_verify_refresh_token() {
        let svc = service(b"dev-secret");
        let user_id = Uuid::new_v4();
        let token = svc.create_refresh_token(user_id).expect("sign refresh");
        let claims = svc.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let svc = service(b"dev-secret");
        let access = svc.create_access_token(Uuid::new_v4()).unwrap();
        let refresh = svc.create_refresh_token(Uuid::new_v4()).unwrap();
        assert!(matches!(svc.verify_refresh(&access), Err(AppError::Unauthorized(_))));
        assert!(matches!(svc.verify_access(&refresh), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn claims_carry_type_field() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: 1,
            exp: 2,
            kind: TokenKind::Refresh,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "refresh");
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let token = service(b"one-secret").create_access_token(Uuid::new_v4()).unwrap();
        let err = service(b"other-secret").verify(&token).unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired token");
        assert!(service(b"one-secret").verify("garbage").is_err());
    }

    #[test]
    fn token_pair_is_bearer() {
        let pair = service(b"dev-secret").create_token_pair(Uuid::new_v4()).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn from_config_loads_hmac_secret_file() {
        let dir = std::env::temp_dir().join(format!("jwt-keys-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let secret_path = dir.join("secret.key");
        std::fs::write(&secret_path, b"file-secret").unwrap();

        let cfg = AuthJwtConfig {
            private_key_path: secret_path.clone(),
            public_key_path: secret_path,
            algorithm: "HS512".into(),
            access_token_expire_minutes: 3,
            refresh_token_expire_days: 7,
            token_type_field: "type".into(),
        };
        let keys = JwtKeys::from_config(&cfg).expect("keys");
        assert_eq!(keys.algorithm, Algorithm::HS512);
        assert_eq!(keys.access_ttl, Duration::from_secs(180));
        assert_eq!(keys.refresh_ttl, Duration::from_secs(7 * 86_400));

        let svc = TokenServiceImpl::new(Arc::new(keys));
        let token = svc.create_access_token(Uuid::new_v4()).unwrap();
        assert!(svc.verify_access(&token).is_ok());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn from_config_reports_missing_key_file() {
        let cfg = AuthJwtConfig {
            private_key_path: "/nonexistent/jwt-private.pem".into(),
            ..AuthJwtConfig::default()
        };
        let err = JwtKeys::from_config(&cfg).err().expect("missing file");
        assert!(err.to_string().contains("jwt-private.pem"));
    }

    #[test]
    fn from_config_rejects_unknown_algorithm() {
        let cfg = AuthJwtConfig {
            algorithm: "ROT13".into(),
            ..AuthJwtConfig::default()
        };
        assert!(JwtKeys::from_config(&cfg).is_err());
    }

    fn hmac_config(secret: &[u8]) -> (std::path::PathBuf, AuthJwtConfig) {
        let dir = std::env::temp_dir().join(format!("jwt-keys-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let secret_path = dir.join("secret.key");
        std::fs::write(&secret_path, secret).unwrap();
        let cfg = AuthJwtConfig {
            private_key_path: secret_path.clone(),
            public_key_path: secret_path,
            algorithm: "HS256".into(),
            ..AuthJwtConfig::default()
        };
        (dir, cfg)
    }

    #[test]
    fn from_config_rejects_out_of_range_lifetimes() {
        let (dir, mut cfg) = hmac_config(b"file-secret");
        cfg.refresh_token_expire_days = 1_000_000_000;
        let err = JwtKeys::from_config(&cfg).err().expect("huge refresh ttl");
        assert!(err.to_string().contains("AUTH_JWT__REFRESH_TOKEN_EXPIRE_DAYS"));

        cfg.refresh_token_expire_days = 7;
        cfg.access_token_expire_minutes = i64::MAX;
        let err = JwtKeys::from_config(&cfg).err().expect("overflowing access ttl");
        assert!(err.to_string().contains("AUTH_JWT__ACCESS_TOKEN_EXPIRE_MINUTES"));

        cfg.access_token_expire_minutes = -1;
        assert!(JwtKeys::from_config(&cfg).is_err());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn signing_with_unrepresentable_expiry_is_an_error() {
        let svc = TokenServiceImpl::new(Arc::new(JwtKeys::from_secret(
            b"dev-secret",
            Duration::from_secs(180),
            Duration::from_secs(u64::MAX),
        )));
        let err = svc.create_refresh_token(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(svc.create_access_token(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn custom_type_field_is_used_on_the_wire() {
        let (dir, mut cfg) = hmac_config(b"file-secret");
        cfg.token_type_field = "token_kind".into();
        let svc = TokenServiceImpl::new(Arc::new(JwtKeys::from_config(&cfg).expect("keys")));
        let token = svc.create_refresh_token(Uuid::new_v4()).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let raw = decode::<Value>(&token, &DecodingKey::from_secret(b"file-secret"), &validation)
            .unwrap()
            .claims;
        assert_eq!(raw["token_kind"], "refresh");
        assert!(raw.get("type").is_none());

        assert_eq!(svc.verify_refresh(&token).unwrap().kind, TokenKind::Refresh);
        // A token signed with the default claim name lacks the configured one.
        let default_svc = TokenServiceImpl::new(Arc::new(
            JwtKeys::from_config(&AuthJwtConfig {
                token_type_field: "type".into(),
                ..cfg.clone()
            })
            .unwrap(),
        ));
        let other = default_svc.create_access_token(Uuid::new_v4()).unwrap();
        assert!(matches!(svc.verify(&other), Err(AppError::Unauthorized(_))));
        std::fs::remove_dir_all(dir).ok();
    }
}
