use rand::{distributions::Alphanumeric, Rng};

/// Random alphanumeric token, used to prove ownership of short-lived locks
pub fn create_random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_random_tokens() {
        let token1 = create_random_token(32);
        let token2 = create_random_token(32);
        assert_eq!(token1.len(), 32);
        assert!(token1.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token1, token2);
        assert!(create_random_token(0).is_empty());
    }
}
