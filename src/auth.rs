//! Simulated login/registration.
//!
//! Intentionally a stub: no credentials are stored and nothing leaves the
//! process. Login always "succeeds" after a short delay; registration only
//! validates the password pair locally.

use std::fmt;
use std::time::Duration;

/// Delay between a successful login and the switch to the planner view.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_secs(1);

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthView {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    PasswordMismatch,
    PasswordTooShort,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::PasswordMismatch => write!(f, "Las contraseñas no coinciden"),
            RegisterError::PasswordTooShort => {
                write!(f, "La contraseña debe tener al menos 8 caracteres")
            }
        }
    }
}

/// Mismatch is reported before length, as the original form did.
pub fn validate_registration(password: &str, confirm: &str) -> Result<(), RegisterError> {
    if password != confirm {
        return Err(RegisterError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RegisterError::PasswordTooShort);
    }
    Ok(())
}

/// Message shown under the active form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Default)]
pub struct AuthPanel {
    pub view: AuthView,
    pub login_email: String,
    pub login_password: String,
    pub reg_name: String,
    pub reg_email: String,
    pub reg_password: String,
    pub reg_confirm: String,
    pub notice: Option<Notice>,
}

impl AuthPanel {
    pub fn switch_to_register(&mut self) {
        self.view = AuthView::Register;
        self.notice = None;
    }

    pub fn switch_to_login(&mut self) {
        self.view = AuthView::Login;
        self.notice = None;
    }

    /// Always succeeds. The caller schedules the view switch after
    /// [`LOGIN_REDIRECT_DELAY`].
    pub fn submit_login(&mut self) {
        log::info!("login simulado para {}", self.login_email);
        self.notice = Some(Notice {
            text: "Login exitoso (simulado). Redirigiendo...".to_string(),
            is_error: false,
        });
    }

    /// Validates the password pair; on success switches back to the login view.
    pub fn submit_register(&mut self) {
        if let Err(e) = validate_registration(&self.reg_password, &self.reg_confirm) {
            self.notice = Some(Notice {
                text: e.to_string(),
                is_error: true,
            });
            return;
        }
        log::info!("registro simulado para {}", self.reg_email);
        self.notice = Some(Notice {
            text: "Registro exitoso (simulado). Puedes iniciar sesión.".to_string(),
            is_error: false,
        });
        self.view = AuthView::Login;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_passwords_are_rejected() {
        assert_eq!(
            validate_registration("contraseña1", "contraseña2"),
            Err(RegisterError::PasswordMismatch)
        );
    }

    #[test]
    fn short_passwords_are_rejected_even_when_matching() {
        assert_eq!(
            validate_registration("corta", "corta"),
            Err(RegisterError::PasswordTooShort)
        );
    }

    #[test]
    fn eight_chars_counted_not_bytes() {
        // "contraña" is 8 characters but more than 8 bytes
        assert_eq!(validate_registration("contraña", "contraña"), Ok(()));
    }

    #[test]
    fn failed_registration_keeps_the_register_view() {
        let mut panel = AuthPanel {
            view: AuthView::Register,
            reg_password: "abc".to_string(),
            reg_confirm: "abc".to_string(),
            ..AuthPanel::default()
        };
        panel.submit_register();
        assert_eq!(panel.view, AuthView::Register);
        let notice = panel.notice.unwrap();
        assert!(notice.is_error);
        assert_eq!(notice.text, "La contraseña debe tener al menos 8 caracteres");
    }

    #[test]
    fn successful_registration_returns_to_login() {
        let mut panel = AuthPanel {
            view: AuthView::Register,
            reg_password: "unacontraseña".to_string(),
            reg_confirm: "unacontraseña".to_string(),
            ..AuthPanel::default()
        };
        panel.submit_register();
        assert_eq!(panel.view, AuthView::Login);
        assert!(!panel.notice.unwrap().is_error);
    }

    #[test]
    fn login_always_succeeds() {
        let mut panel = AuthPanel::default();
        panel.submit_login();
        let notice = panel.notice.unwrap();
        assert!(!notice.is_error);
        assert!(notice.text.contains("Redirigiendo"));
    }
}
