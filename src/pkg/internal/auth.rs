use axum::http::{header::AUTHORIZATION, HeaderMap};

pub const ADMIN_EMAIL_HEADER: &str = "x-admin-email";

/// The single admin identity allowed to create and delete postings.
#[derive(Debug, Clone)]
pub struct AdminPolicy {
    email: String,
    token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub email: String,
}

impl AdminPolicy {
    pub fn new(email: &str, token: &str) -> Self {
        AdminPolicy {
            email: email.trim().to_string(),
            token: token.to_string(),
        }
    }

    pub fn check(&self, headers: &HeaderMap) -> Option<Admin> {
        if self.token.is_empty() || self.email.is_empty() {
            return None;
        }
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))?;
        let email = headers
            .get(ADMIN_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())?
            .trim();
        if token.trim() == self.token && email.eq_ignore_ascii_case(&self.email) {
            Some(Admin {
                email: email.to_string(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(token: &str, email: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(token).unwrap());
        h.insert(ADMIN_EMAIL_HEADER, HeaderValue::from_str(email).unwrap());
        h
    }

    #[test]
    fn admin_needs_token_and_matching_email() {
        let policy = AdminPolicy::new("admin@smartproductivity.app", "s3cret");
        assert_eq!(
            policy.check(&headers("Bearer s3cret", "Admin@SmartProductivity.app")),
            Some(Admin {
                email: "Admin@SmartProductivity.app".into()
            })
        );
        assert!(policy
            .check(&headers("Bearer wrong", "admin@smartproductivity.app"))
            .is_none());
        assert!(policy
            .check(&headers("Bearer s3cret", "someone@example.com"))
            .is_none());
        assert!(policy.check(&HeaderMap::new()).is_none());
    }

    #[test]
    fn unconfigured_policy_admits_nobody() {
        let policy = AdminPolicy::new("", "");
        assert!(policy.check(&headers("Bearer ", "")).is_none());
    }
}
