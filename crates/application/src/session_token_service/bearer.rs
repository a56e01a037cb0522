use contentai_core::{AppError, AppResult};

const BEARER_SCHEME: &str = "Bearer";

/// Extracts the token from a header value of the exact form `Bearer <token>`.
///
/// Absence, another scheme, a missing token, or additional space-separated
/// segments all fail with [`AppError::MissingOrMalformedHeader`].
pub fn bearer_token_from_header(header_value: Option<&str>) -> AppResult<&str> {
    let value = header_value.ok_or(AppError::MissingOrMalformedHeader)?;
    let mut segments = value.split(' ');

    match (segments.next(), segments.next(), segments.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::MissingOrMalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use contentai_core::AppError;
    use proptest::prelude::*;

    use super::bearer_token_from_header;

    #[test]
    fn accepts_bearer_token() {
        assert_eq!(bearer_token_from_header(Some("Bearer abc.def.ghi")).ok(), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_every_other_shape_uniformly() {
        for value in [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer "),
            Some("Basic xyz"),
            Some("bearer abc"),
            Some("Bearer abc extra"),
            Some("Bearer  abc"),
        ] {
            assert!(
                matches!(
                    bearer_token_from_header(value),
                    Err(AppError::MissingOrMalformedHeader)
                ),
                "expected rejection for {value:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn round_trips_any_token_without_spaces(token in "[A-Za-z0-9._-]{1,64}") {
            let header = format!("Bearer {token}");
            prop_assert_eq!(bearer_token_from_header(Some(&header)).ok(), Some(token.as_str()));
        }

        #[test]
        fn never_accepts_other_schemes(scheme in "[A-Za-z]{1,10}", token in "[A-Za-z0-9]{1,16}") {
            prop_assume!(scheme != "Bearer");
            let header = format!("{scheme} {token}");
            prop_assert!(bearer_token_from_header(Some(&header)).is_err());
        }
    }
}
