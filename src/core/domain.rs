//! Canonical form for domain/host strings.
//!
//! Keys are indexed by domain, and the domain a user pastes is usually a
//! URL-ish string from provider docs. Every domain passes through
//! [`canonical_domain`] before any index insertion or lookup, so
//! `"HTTPS://api.Example.com:443/v1"` and `"api.example.com"` land on
//! the same index key.

/// Reduce a raw domain or URL to a bare lower-case host.
///
/// Lower-cases the input, strips a leading `scheme://`, strips leading
/// `/` characters, cuts at the first remaining `/` (discarding the URL
/// path), and cuts at the first `:` (discarding a port). Total: never
/// fails, and empty input yields an empty string. Idempotent.
pub fn canonical_domain(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let after_scheme = match lower.split_once("://") {
        Some((_, rest)) => rest,
        None => lower.as_str(),
    };
    let host = after_scheme.trim_start_matches('/');
    let host = host.split('/').next().unwrap_or("");
    let host = host.split(':').next().unwrap_or("");
    host.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_domain_passes_through() {
        assert_eq!(canonical_domain("api.example.com"), "api.example.com");
    }

    #[test]
    fn test_full_url_is_reduced_to_host() {
        assert_eq!(canonical_domain("HTTPS://Foo.COM:8080/path"), "foo.com");
        assert_eq!(
            canonical_domain("HTTPS://api.Example.com:443/v1"),
            "api.example.com"
        );
    }

    #[test]
    fn test_scheme_is_stripped() {
        assert_eq!(canonical_domain("http://svc.io"), "svc.io");
        assert_eq!(canonical_domain("postgres://db.internal"), "db.internal");
    }

    #[test]
    fn test_leading_slashes_are_stripped() {
        assert_eq!(canonical_domain("//svc.io/path"), "svc.io");
        assert_eq!(canonical_domain("///svc.io"), "svc.io");
    }

    #[test]
    fn test_path_and_port_are_discarded() {
        assert_eq!(canonical_domain("svc.io/v2/keys"), "svc.io");
        assert_eq!(canonical_domain("svc.io:9000"), "svc.io");
        assert_eq!(canonical_domain("svc.io:9000/v2"), "svc.io");
    }

    #[test]
    fn test_case_is_folded() {
        assert_eq!(canonical_domain("API.Example.COM"), "api.example.com");
    }

    #[test]
    fn test_empty_and_degenerate_inputs() {
        assert_eq!(canonical_domain(""), "");
        assert_eq!(canonical_domain("https://"), "");
        assert_eq!(canonical_domain("/"), "");
        assert_eq!(canonical_domain(":8080"), "");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "HTTPS://Foo.COM:8080/path",
            "api.example.com",
            "//svc.io",
            "",
        ] {
            let once = canonical_domain(input);
            assert_eq!(canonical_domain(&once), once);
        }
    }
}
