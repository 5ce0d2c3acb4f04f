use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use uuid::Uuid;

const SCHEME: &str = "pbkdf2-sha256";
const ROUNDS: u32 = 100_000;
const KEY_LEN: usize = 32;

fn derive(password: &str, salt: &str, rounds: u32) -> String {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), rounds, &mut key);
    key.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Salted hash in the form `pbkdf2-sha256$<rounds>$<salt>$<hex key>`.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}${}", SCHEME, ROUNDS, salt, derive(password, &salt, ROUNDS))
}

/// Rounds are read back from the stored hash, so raising `ROUNDS` keeps
/// existing hashes verifiable.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(4, '$');
    let (Some(scheme), Some(rounds), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    if rounds == 0 {
        return false;
    }
    constant_time_eq(derive(password, salt, rounds).as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
