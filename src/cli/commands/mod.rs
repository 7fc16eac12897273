pub mod hash_password;
pub mod migrate;
pub mod serve;
