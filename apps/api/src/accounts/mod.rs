// Accounts: registration, password login and the user store sessions are checked against.

pub mod handlers;
pub mod password;
pub mod store;
