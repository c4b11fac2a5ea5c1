use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::{AuthIdentity, Claims, Role};
use crate::{config::JwtConfig, state::AppState};

/// Signing and verification keys, built once from config at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64).saturating_mul(60)),
        }
    }

    pub fn issue(&self, subject: Uuid, role: Role) -> anyhow::Result<String> {
        self.issue_at(subject, role, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        subject: Uuid,
        role: Role,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let ttl = i64::try_from(self.ttl.as_secs()).context("token ttl out of range")?;
        let exp = now
            .checked_add(TimeDuration::seconds(ttl))
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: subject,
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %subject, %role, "jwt signed");
        Ok(token)
    }

    /// Every failure (bad signature, expiry, wrong issuer/audience, missing
    /// or unknown claims) collapses to `None`.
    pub fn verify(&self, token: &str) -> Option<AuthIdentity> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(user_id = %data.claims.sub, role = %data.claims.role, "jwt verified");
                Some(data.claims.into())
            }
            Err(e) => {
                debug!(error = %e, "jwt rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60 * 24 * 7,
        })
    }

    #[test]
    fn issue_and_verify_preserves_subject_and_role() {
        let keys = make_keys("dev-secret");
        for role in [Role::Admin, Role::Pharmacist] {
            let user_id = Uuid::new_v4();
            let token = keys.issue(user_id, role).expect("sign");
            let identity = keys.verify(&token).expect("verify");
            assert_eq!(identity.subject, user_id);
            assert_eq!(identity.role, role);
        }
    }

    #[test]
    fn token_expires_after_seven_days() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();

        let eight_days_ago = OffsetDateTime::now_utc() - TimeDuration::days(8);
        let stale = keys.issue_at(user_id, Role::Admin, eight_days_ago).unwrap();
        assert!(keys.verify(&stale).is_none());

        let six_days_ago = OffsetDateTime::now_utc() - TimeDuration::days(6);
        let fresh = keys.issue_at(user_id, Role::Admin, six_days_ago).unwrap();
        assert!(keys.verify(&fresh).is_some());
    }

    #[test]
    fn oversized_ttl_fails_instead_of_panicking() {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 10_000_000_000,
        });
        let err = keys.issue(Uuid::new_v4(), Role::Admin).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = make_keys("secret-a").issue(Uuid::new_v4(), Role::Admin).unwrap();
        assert!(make_keys("secret-b").verify(&token).is_none());
    }

    #[test]
    fn rejects_tampered_and_malformed_tokens() {
        let keys = make_keys("dev-secret");
        let pharm = keys.issue(Uuid::new_v4(), Role::Pharmacist).unwrap();
        let admin = keys.issue(Uuid::new_v4(), Role::Admin).unwrap();
        // Admin payload spliced onto the pharmacist signature.
        let p: Vec<&str> = pharm.split('.').collect();
        let a: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", p[0], a[1], p[2]);
        assert!(keys.verify(&forged).is_none());
        assert!(keys.verify("not.a.jwt").is_none());
        assert!(keys.verify("").is_none());
    }

    #[test]
    fn rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret");
        let bad = JwtKeys::from_config(&JwtConfig {
            secret: "same-secret".into(),
            issuer: "bad-iss".into(),
            audience: "bad-aud".into(),
            ttl_minutes: 60,
        });
        let token = good.issue(Uuid::new_v4(), Role::Admin).unwrap();
        assert!(bad.verify(&token).is_none());
    }

    #[test]
    fn rejects_tokens_missing_role_or_subject() {
        let keys = make_keys("dev-secret");
        let exp = (OffsetDateTime::now_utc() + TimeDuration::hours(1)).unix_timestamp();
        let enc = EncodingKey::from_secret(b"dev-secret");

        let no_role = json!({
            "sub": Uuid::new_v4(), "iat": 0, "exp": exp,
            "iss": "test-issuer", "aud": "test-aud",
        });
        let token = encode(&Header::default(), &no_role, &enc).unwrap();
        assert!(keys.verify(&token).is_none());

        let no_sub = json!({
            "role": "admin", "iat": 0, "exp": exp,
            "iss": "test-issuer", "aud": "test-aud",
        });
        let token = encode(&Header::default(), &no_sub, &enc).unwrap();
        assert!(keys.verify(&token).is_none());

        let unknown_role = json!({
            "sub": Uuid::new_v4(), "role": "superuser", "iat": 0, "exp": exp,
            "iss": "test-issuer", "aud": "test-aud",
        });
        let token = encode(&Header::default(), &unknown_role, &enc).unwrap();
        assert!(keys.verify(&token).is_none());
    }
}
