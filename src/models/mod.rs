pub mod answer;
pub mod question;
pub mod test_assignment;
pub mod test_attempt;
pub mod user;
