pub mod health;
pub mod triage;
