use crate::error::ApiError;

/// Two-branch outcome of an executed call: exactly one of `data` or `error`
/// is populated, never both, never neither.
///
/// Callers consume outcomes by branch inspection instead of `?`/`match` on a
/// propagated error. The error value stays inspectable by kind for
/// finer-grained handling (a 404 versus a network failure, say).
#[derive(Debug)]
pub struct ApiResult<T> {
    data: Option<T>,
    error: Option<ApiError>,
}

impl<T> ApiResult<T> {
    pub(crate) fn ok(data: T) -> Self {
        ApiResult {
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn err(error: ApiError) -> Self {
        ApiResult {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Convert back into a `Result` for callers that do want `?`.
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (None, Some(error)) => Err(error),
            // Unreachable by construction: both constructors fill one slot.
            _ => Err(ApiError::client("result carried neither data nor error")),
        }
    }
}

impl<T> From<Result<T, ApiError>> for ApiResult<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ApiResult::ok(data),
            Err(error) => ApiResult::err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_branch() {
        let ok: ApiResult<u32> = ApiResult::ok(7);
        assert!(ok.is_ok());
        assert_eq!(ok.data(), Some(&7));
        assert!(ok.error().is_none());

        let err: ApiResult<u32> = ApiResult::err(ApiError::client("boom"));
        assert!(!err.is_ok());
        assert!(err.data().is_none());
        assert!(err.error().is_some());
    }

    #[test]
    fn round_trips_through_result() {
        let ok: ApiResult<&str> = Ok("x").into();
        assert_eq!(ok.into_result().unwrap(), "x");

        let err: ApiResult<&str> = Err(ApiError::client("nope")).into();
        assert!(err.into_result().is_err());
    }
}
