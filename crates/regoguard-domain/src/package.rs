use crate::error::ConformanceError;
use regoguard_rego::{Module, ROOT_DOCUMENT, Ref, Term, is_identifier, is_keyword};

/// `a.b.c` becomes the ref `data.a.b.c`.
///
/// Every segment must be non-empty and the first must be a non-keyword identifier, otherwise the
/// rewritten `package` line would not parse.
pub fn package_ref(desired_path: &str) -> Result<Ref, ConformanceError> {
    let segments: Vec<&str> = desired_path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConformanceError::InvalidPackagePath {
            path: desired_path.to_string(),
            reason: "segments must not be empty",
        });
    }
    if !segments
        .first()
        .is_some_and(|s| is_identifier(s) && !is_keyword(s))
    {
        return Err(ConformanceError::InvalidPackagePath {
            path: desired_path.to_string(),
            reason: "the first segment must be an identifier",
        });
    }

    let mut terms = Vec::with_capacity(segments.len() + 1);
    terms.push(Term::var(ROOT_DOCUMENT));
    terms.extend(segments.into_iter().map(Term::string));
    Ok(Ref::new(terms))
}

/// Replace the module's package path and print the result.
pub fn rewrite_package(module: &mut Module, path: Ref) -> String {
    module.package.path = path;
    module.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regoguard_rego::parse_module;

    #[test]
    fn builds_rooted_path() {
        let r = package_ref("templates.k8s.labels").expect("valid");
        assert_eq!(r.to_string(), "data.templates.k8s.labels");
    }

    #[test]
    fn non_identifier_tail_segments_are_allowed() {
        let mut module = parse_module("t.rego", "package x\np { true }\n").expect("parse");
        let printed = rewrite_package(&mut module, package_ref("t.my-kind").expect("valid"));
        assert!(printed.starts_with("package t[\"my-kind\"]\n"));
        let reparsed = parse_module("t.rego", &printed).expect("reparse");
        assert_eq!(reparsed.package.segments(), vec!["t", "my-kind"]);
    }

    #[test]
    fn rejects_empty_segments() {
        for bad in ["", "a..b", ".a", "a."] {
            assert!(
                matches!(
                    package_ref(bad),
                    Err(ConformanceError::InvalidPackagePath { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_identifier_first_segment() {
        assert!(package_ref("with.x").is_err());
        let err = package_ref("1abc.x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid package path `1abc.x`: the first segment must be an identifier"
        );
    }
}
