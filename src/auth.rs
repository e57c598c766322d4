use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("email must not be empty")]
    MissingEmail,
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),
    #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account for {0} already exists")]
    AccountExists(String),
}

/// Whether a password submission creates an account or uses an existing one
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Flow {
    #[strum(to_string = "Sign in")]
    SignIn,
    #[strum(to_string = "Sign up")]
    SignUp,
}

impl Flow {
    pub fn toggled(self) -> Self {
        match self {
            Flow::SignIn => Flow::SignUp,
            Flow::SignUp => Flow::SignIn,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), AuthError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Account(String),
}

impl Identity {
    pub fn label(&self) -> &str {
        match self {
            Identity::Anonymous => "guest",
            Identity::Account(email) => email,
        }
    }
}

/// Authentication backend gating access to the typing test
pub trait Authenticator {
    fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    fn identity(&self) -> Option<&Identity>;

    fn sign_in(&mut self, credentials: &Credentials, flow: Flow) -> Result<(), AuthError>;

    fn sign_in_anonymously(&mut self);

    fn sign_out(&mut self);
}

/// In-memory account table; accounts live as long as the process
#[derive(Debug, Default)]
pub struct LocalAuthenticator {
    accounts: HashMap<String, String>,
    current: Option<Identity>,
}

impl LocalAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Authenticator for LocalAuthenticator {
    fn identity(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    fn sign_in(&mut self, credentials: &Credentials, flow: Flow) -> Result<(), AuthError> {
        credentials.validate()?;
        let email = credentials.email.trim().to_lowercase();

        match flow {
            Flow::SignUp => {
                if self.accounts.contains_key(&email) {
                    return Err(AuthError::AccountExists(email));
                }
                self.accounts
                    .insert(email.clone(), credentials.password.clone());
            }
            Flow::SignIn => match self.accounts.get(&email) {
                Some(password) if *password == credentials.password => {}
                _ => return Err(AuthError::InvalidCredentials),
            },
        }

        info!(%email, %flow, "signed in");
        self.current = Some(Identity::Account(email));
        Ok(())
    }

    fn sign_in_anonymously(&mut self) {
        info!("signed in anonymously");
        self.current = Some(Identity::Anonymous);
    }

    fn sign_out(&mut self) {
        if let Some(identity) = self.current.take() {
            info!(identity = identity.label(), "signed out");
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
}

/// Editable state of the sign-in form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialForm {
    pub email: String,
    pub password: String,
    pub focus: Field,
    pub flow: Flow,
    pub error: Option<String>,
}

impl Default for CredentialForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: Field::Email,
            flow: Flow::SignIn,
            error: None,
        }
    }
}

impl CredentialForm {
    /// Form with the email field prefilled, focus on the password
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            focus: Field::Password,
            ..Self::default()
        }
    }

    pub fn insert_char(&mut self, c: char) {
        match self.focus {
            Field::Email => self.email.push(c),
            Field::Password => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Field::Email => self.email.pop(),
            Field::Password => self.password.pop(),
        };
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Email => Field::Password,
            Field::Password => Field::Email,
        };
    }

    pub fn toggle_flow(&mut self) {
        self.flow = self.flow.toggled();
        self.error = None;
    }

    pub fn masked_password(&self) -> String {
        "•".repeat(self.password.chars().count())
    }

    /// Submit the form. On success the password is wiped; on failure the
    /// error is kept for display.
    pub fn submit(&mut self, auth: &mut dyn Authenticator) -> Result<(), AuthError> {
        let credentials = Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        };

        match auth.sign_in(&credentials, self.flow) {
            Ok(()) => {
                self.password.clear();
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
