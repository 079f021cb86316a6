use crate::domain::TesterEmailAddress;

/// How to look a tester up: by the service-assigned numeric id or by email.
#[derive(Clone, Debug)]
pub enum TesterIdentifier {
    Id(u64),
    Email(String),
}

impl From<u64> for TesterIdentifier {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<TesterEmailAddress> for TesterIdentifier {
    fn from(email: TesterEmailAddress) -> Self {
        Self::Email(email.as_ref().to_owned())
    }
}

/// A purely numeric string is taken as an id, anything else as an email.
impl From<&str> for TesterIdentifier {
    fn from(s: &str) -> Self {
        match s.trim().parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Email(s.to_owned()),
        }
    }
}
