use std::fmt;
use std::sync::Mutex;

use rand::seq::SliceRandom;

use crate::CoreError;

/// A bearer token sent as `access_token`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(4).collect();
        write!(f, "Credential({visible}…)")
    }
}

/// Shared set of tokens. Each request group takes one after a shuffle.
pub struct CredentialPool {
    tokens: Mutex<Vec<Credential>>,
}

impl CredentialPool {
    pub fn new<I, S>(tokens: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<Credential> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .map(Credential)
            .collect();
        if tokens.is_empty() {
            return Err(CoreError::EmptyCredentials);
        }
        Ok(Self {
            tokens: Mutex::new(tokens),
        })
    }

    /// Shuffle the pool and hand out the front token.
    pub fn take(&self) -> Credential {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.shuffle(&mut rand::thread_rng());
        // Non-empty by construction.
        tokens[0].clone()
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn rejects_empty_and_blank() {
        assert!(matches!(
            CredentialPool::new(Vec::<String>::new()),
            Err(CoreError::EmptyCredentials)
        ));
        assert!(matches!(
            CredentialPool::new(["", "  "]),
            Err(CoreError::EmptyCredentials)
        ));
    }

    #[test]
    fn take_only_yields_configured_tokens() {
        let pool = CredentialPool::new(["a", "b", "", "c"]).unwrap();
        assert_eq!(pool.len(), 3);
        let seen: HashSet<String> = (0..200).map(|_| pool.take().expose().to_string()).collect();
        assert!(seen.is_subset(&["a", "b", "c"].iter().map(|s| s.to_string()).collect()));
        assert!(seen.len() > 1);
    }

    #[test]
    fn take_is_safe_across_threads() {
        let pool = Arc::new(CredentialPool::new(["x", "y"]).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert!(!pool.take().expose().is_empty());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn debug_does_not_leak_token() {
        let cred = Credential::new("secret-token-value");
        assert!(!format!("{cred:?}").contains("token-value"));
    }
}
