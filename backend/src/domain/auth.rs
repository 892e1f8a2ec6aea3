//! Authentication primitives: form sanitisation, credentials, registration
//! requests and the session handed back by the auth service.
//!
//! Inbound payload parsing stays outside the domain; handlers call the
//! constructors here before talking to a port or service.

use zeroize::Zeroizing;

use super::{Error, field_error};
use super::user::{Email, FullName, Role, UserId, UserValidationError};

/// Strip angle brackets and surrounding whitespace from free-text input.
///
/// # Examples
/// ```
/// use designdesk::domain::sanitize_text;
///
/// assert_eq!(sanitize_text("  <b>Logo</b> "), "bLogo/b");
/// ```
pub fn sanitize_text(raw: &str) -> String {
    raw.replace(['<', '>'], "").trim().to_owned()
}

/// Sanitise an email address: strip markup, trim, lower-case and drop every
/// character outside `[a-z0-9.@_\-+]`.
///
/// # Examples
/// ```
/// use designdesk::domain::sanitize_email;
///
/// assert_eq!(sanitize_email("  Ana.Torres@Studio.IO "), "ana.torres@studio.io");
/// ```
pub fn sanitize_email(raw: &str) -> String {
    sanitize_text(raw)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || ".@_-+".contains(*c))
        .collect()
}

/// Validation failures for login and registration forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    #[error(transparent)]
    User(#[from] UserValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
}

impl AuthValidationError {
    /// Form field the error relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(inner) => inner.field(),
            Self::EmptyPassword => "password",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::User(inner) => inner.code(),
            Self::EmptyPassword => "missing_field",
        }
    }
}

impl From<AuthValidationError> for Error {
    fn from(value: AuthValidationError) -> Self {
        field_error(value.field(), value.code(), value.to_string())
    }
}

/// Validated email/password pair.
///
/// ## Invariants
/// - `email` is sanitised and matches the email pattern.
/// - `password` is non-empty and kept verbatim; it is zeroed on drop.
///
/// # Examples
/// ```
/// use designdesk::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ana@Studio.io", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ana@studio.io");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Sanitise and validate raw form inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = Email::new(sanitize_email(email))?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Sanitised email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password as typed by the user.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
    role: Role,
    full_name: Option<FullName>,
}

impl Registration {
    /// Sanitise and validate a registration form.
    ///
    /// # Examples
    /// ```
    /// use designdesk::domain::{Registration, Role};
    ///
    /// let form = Registration::try_from_parts("lee@studio.io", "pw", "designer", "Lee").unwrap();
    /// assert_eq!(form.role(), Role::Designer);
    /// ```
    pub fn try_from_parts(
        email: &str,
        password: &str,
        role: &str,
        full_name: &str,
    ) -> Result<Self, AuthValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        let role = sanitize_text(role).parse::<Role>()?;
        let full_name = FullName::parse(&sanitize_text(full_name))?;
        Ok(Self {
            credentials,
            role,
            full_name,
        })
    }

    /// Email and password for the new account.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Role the account registers with.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Display name, when one was given.
    pub fn full_name(&self) -> Option<&FullName> {
        self.full_name.as_ref()
    }
}

/// Bearer token issued by the auth service. Zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token for the `Authorization` header or the session cookie.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Single-use token exchanged for a fresh [`AccessToken`] once the current
/// one expires. Zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(Zeroizing<String>);

impl RefreshToken {
    /// Wrap a raw refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token for the refresh grant or the session cookie.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshToken(..)")
    }
}

/// Identity as reported by the auth service, before the application record
/// is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Auth account id; application records share it.
    pub id: UserId,
    /// Sign-in email.
    pub email: Email,
}

/// Authenticated session returned by sign-in and by token refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Account the tokens were issued for.
    pub identity: AuthIdentity,
    /// Short-lived bearer token.
    pub access_token: AccessToken,
    /// Token for the next refresh, when the service issued one.
    pub refresh_token: Option<RefreshToken>,
}
