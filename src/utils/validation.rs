use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

pub const DUPLICATE: &str = "already taken.";
pub const INVALID_EMAIL: &str = "Email is not valid.";
pub const USERNAME_NOT_LONG_ENOUGH: &str = "Username must be at least 3 characters long.";
pub const PASSWORD_NOT_LONG_ENOUGH: &str = "Password must be at least 6 characters long.";
pub const USER_NOT_FOUND: &str = "This user doesn't exist.";
pub const INCORRECT_PASSWORD: &str = "Incorrect password.";

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

pub fn duplicate(what: &str) -> String {
    format!("{} {}", what, DUPLICATE)
}

pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn valid_username(username: &str) -> bool {
    username.chars().count() >= MIN_USERNAME_LEN
}

pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}
