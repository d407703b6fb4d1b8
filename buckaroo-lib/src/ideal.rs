//! iDEAL issuers.

/// Issuer BIC and display name, in the order shown to consumers.
pub const ISSUERS: &[(&str, &str)] = &[
    ("ABNANL2A", "ABN AMRO"),
    ("ASNBNL21", "ASN Bank"),
    ("BUNQNL2A", "Bunq"),
    ("INGBNL2A", "ING"),
    ("KNABNL2H", "Knab bank"),
    ("RABONL2U", "Rabobank"),
    ("RBRBNL21", "RegioBank"),
    ("SNSBNL2A", "SNS Bank"),
    ("TRIONL2U", "Triodos Bank"),
    ("FVLBNL22", "Van Lanschot"),
];

/// Returns true if `bic` is a known issuer.
pub fn is_issuer(bic: &str) -> bool {
    ISSUERS.iter().any(|(code, _)| *code == bic)
}

/// Display name of an issuer.
pub fn issuer_name(bic: &str) -> Option<&'static str> {
    ISSUERS
        .iter()
        .find(|(code, _)| *code == bic)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuers() {
        assert_eq!(ISSUERS.len(), 10);
        assert!(is_issuer("INGBNL2A"));
        assert!(!is_issuer("ingbnl2a"));
        assert_eq!(issuer_name("TRIONL2U"), Some("Triodos Bank"));
        assert_eq!(issuer_name("XXXXNL2A"), None);
    }
}
