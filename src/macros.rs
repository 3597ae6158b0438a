//! Early-return helper for functions that build vessels.

/// Unwrap a [`Vessel`](crate::Vessel) or return its failure from the
/// enclosing function.
///
/// The enclosing function must return a `Vessel`. The error is converted
/// with `From`, the same way `?` converts errors for `Result`.
///
/// # Example
///
/// ```
/// use vessel::{try_vessel, Vessel};
///
/// fn parse_port(raw: &str) -> Vessel<u16, String> {
///     Vessel::lift(|| raw.parse::<u16>()).map_error(|e| e.to_string())
/// }
///
/// fn endpoint(host: &str, raw_port: &str) -> Vessel<String, String> {
///     let port = try_vessel!(parse_port(raw_port));
///     Vessel::success(format!("{host}:{port}"))
/// }
///
/// assert_eq!(endpoint("db", "5432"), Vessel::success("db:5432".to_string()));
/// assert!(endpoint("db", "none").is_failure());
/// ```
#[macro_export]
macro_rules! try_vessel {
    ($vessel:expr $(,)?) => {
        match $vessel {
            $crate::Vessel::Success(value) => value,
            $crate::Vessel::Failure(err) => {
                return $crate::Vessel::Failure(::std::convert::From::from(err));
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::Vessel;

    #[derive(Debug, PartialEq)]
    enum LoadError {
        Missing(&'static str),
        Io(String),
    }

    impl From<std::io::ErrorKind> for LoadError {
        fn from(kind: std::io::ErrorKind) -> Self {
            LoadError::Io(format!("{kind:?}"))
        }
    }

    fn read(key: &'static str) -> Vessel<u32, std::io::ErrorKind> {
        match key {
            "retries" => Vessel::success(3),
            "timeout" => Vessel::success(30),
            _ => Vessel::failure(std::io::ErrorKind::NotFound),
        }
    }

    fn lookup(key: &'static str) -> Vessel<u32, LoadError> {
        match key {
            "retries" => Vessel::success(3),
            _ => Vessel::failure(LoadError::Missing(key)),
        }
    }

    fn total(first: &'static str, second: &'static str) -> Vessel<u32, LoadError> {
        let a = try_vessel!(read(first));
        let b = try_vessel!(lookup(second));
        Vessel::success(a + b)
    }

    #[test]
    fn continues_with_successes() {
        assert_eq!(total("timeout", "retries"), Vessel::Success(33));
    }

    #[test]
    fn returns_first_failure_converted() {
        assert_eq!(
            total("missing", "retries"),
            Vessel::Failure(LoadError::Io("NotFound".to_string()))
        );
        assert_eq!(
            total("timeout", "colour"),
            Vessel::Failure(LoadError::Missing("colour"))
        );
    }
}
