/// Decides whether a supplied password unlocks a secret task.
pub trait SecretVerifier {
    fn verify(&self, expected: &str, supplied: &str) -> bool;
}

/// Exact string comparison. The password only deters casual reading.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextVerifier;

impl SecretVerifier for PlaintextVerifier {
    fn verify(&self, expected: &str, supplied: &str) -> bool {
        expected == supplied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_requires_exact_match() {
        let verifier = PlaintextVerifier;
        assert!(verifier.verify("1234", "1234"));
        assert!(verifier.verify("", ""));
        assert!(!verifier.verify("1234", "1234 "));
        assert!(!verifier.verify("abc", "ABC"));
    }
}
