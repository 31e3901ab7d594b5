pub mod assignments;
pub mod auth;
pub mod branches;
pub mod health;
pub mod me;
pub mod roles;
pub mod users;

#[cfg(test)]
mod tests;
