mod tester;
mod tester_email_address;
mod tester_identifier;
mod tester_signup;

pub use tester::{Tester, TesterProfile, TesterStatus};
pub use tester_email_address::TesterEmailAddress;
pub use tester_identifier::TesterIdentifier;
pub use tester_signup::{ClientContext, TesterSignup};
