use cookie::{Cookie, SameSite};
use sha2::{Digest, Sha256};

pub const LOGIN_CSRF_COOKIE: &str = "login_csrf";

const LOGIN_CSRF_MINUTES: i64 = 60;

/// Login form protection. There is no session yet, so the token is bound to
/// a short-lived cookie and echoed back in a hidden form field.
pub struct LoginCsrf;

impl LoginCsrf {
    pub fn generate_token() -> String {
        super::generate_token()
    }

    pub fn cookie(token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((LOGIN_CSRF_COOKIE, token.to_string()))
            .path("/login")
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::minutes(LOGIN_CSRF_MINUTES))
            .build()
    }

    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build((LOGIN_CSRF_COOKIE, ""))
            .path("/login")
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }

    /// Both halves must be present and equal. Compared by hash so timing
    /// says nothing about the raw token.
    pub fn verify(cookie_token: Option<&str>, form_token: &str) -> bool {
        match cookie_token {
            Some(expected) if !expected.is_empty() && !form_token.is_empty() => {
                hash_token(expected) == hash_token(form_token)
            }
            _ => false,
        }
    }
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_tokens_verify() {
        let token = LoginCsrf::generate_token();
        assert!(LoginCsrf::verify(Some(&token), &token));
    }

    #[test]
    fn test_missing_or_mismatched_tokens_fail() {
        let token = LoginCsrf::generate_token();
        assert!(!LoginCsrf::verify(None, &token));
        assert!(!LoginCsrf::verify(Some(&token), "forged"));
        assert!(!LoginCsrf::verify(Some(""), ""));
    }

    #[test]
    fn test_cookie_is_scoped_to_login() {
        let cookie = LoginCsrf::cookie("abc", true);
        assert_eq!(cookie.path(), Some("/login"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
