use crate::auth::{Argon2PasswordHasher, PasswordHasher};

/// Prints a hash/salt pair suitable for seeding the users table by hand.
pub fn handle(password: &str) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let hashed = Argon2PasswordHasher::new().hash(password)?;
    println!("hash: {}", hashed.hash);
    println!("salt: {}", hashed.salt);
    Ok(())
}
