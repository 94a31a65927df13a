use thiserror::Error;

/// Setup-time configuration failures.
///
/// These surface once, from constructors and config loading. Nothing in the
/// per-step API returns an error: numeric input is clamped, unknown tags are
/// ignored and failed gestures are dropped.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
    #[error("invalid range for {field}: min {min} > max {max}")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("malformed level config: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn ensure_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value > 0.0) {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(ensure_range("scale", 0.25, 3.0).is_ok());
        assert!(ensure_range("scale", 1.0, 1.0).is_ok());
        let err = ensure_range("scale", 3.0, 0.25).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { field: "scale", .. }));
    }

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(ensure_positive("dt", 0.016).is_ok());
        assert!(ensure_positive("dt", 0.0).is_err());
        assert!(ensure_positive("dt", -1.0).is_err());
        assert!(ensure_positive("dt", f32::NAN).is_err());
    }

    #[test]
    fn json_error_converts() {
        let err: ConfigError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("malformed level config"));
    }
}
