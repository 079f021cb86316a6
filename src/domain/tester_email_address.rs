use validator::ValidateEmail;

/// A validated email address for a beta-program signup.
#[derive(Clone, Debug)]
pub struct TesterEmailAddress(String);

impl TesterEmailAddress {
    /// Returns an instance of `TesterEmailAddress` if the input satisfies
    /// our validation constraints on email addresses.
    /// It returns an error message otherwise.
    pub fn parse(s: String) -> Result<TesterEmailAddress, String> {
        if s.validate_email() {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid tester email address.", s))
        }
    }
}

impl AsRef<str> for TesterEmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TesterEmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
