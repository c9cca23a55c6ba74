use std::sync::OnceLock;

use regex::Regex;

/// Email pattern accepted by the panel's forms
const EMAIL_PATTERN: &str = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,4}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// A CPF as typed must carry exactly 11 digits once punctuation is removed
pub fn is_complete_cpf(cpf: &str) -> bool {
    crate::utils::cpf_digits(cpf).len() == 11
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("Lider.Equipe+calebe@Igreja.ORG"));
        assert!(is_valid_email("  ana@igreja.org.br "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@igreja"));
        assert!(!is_valid_email("ana@igreja.online")); // TLD longer than 4
        assert!(!is_valid_email("ana maria@igreja.org"));
    }

    #[test]
    fn test_cpf_completeness() {
        assert!(is_complete_cpf("123.456.789-01"));
        assert!(is_complete_cpf("12345678901"));
        assert!(!is_complete_cpf("1234567890"));
    }
}
