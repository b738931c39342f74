//! Success flag plus payload or message, returned by top-level entry points.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Result of an entry point, safe to hand to any caller.
///
/// Callers check `success` before reading `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Run `f`, turning both errors and panics into a failed outcome.
    pub fn capture<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T>,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result.into(),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Entry point panicked: {}", message);
                Self::failure(format!("Internal error: {}", message))
            }
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaxaError;

    #[test]
    fn test_from_result() {
        let ok: Outcome<u32> = Ok(3).into();
        assert!(ok.success);
        assert_eq!(ok.data, Some(3));

        let err: Outcome<u32> = Err(TaxaError::UnknownRank("9".into())).into();
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("Unknown taxonomic rank '9'"));
    }

    #[test]
    fn test_capture_panic() {
        let outcome: Outcome<u32> = Outcome::capture(|| panic!("boom"));
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("boom"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Outcome::<u32>::failure("Missing level parameter")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"Missing level parameter"}"#);
    }

    #[test]
    fn test_deserialize_without_default_payload() {
        use crate::data::{ComparisonTable, TaxonStat};
        use crate::taxonomy::Rank;

        let table = ComparisonTable::new(
            Rank::Genus,
            vec![TaxonStat {
                taxon: "Bacteroides".into(),
                control_avg: 2.0,
                uc_avg: 0.0,
                uc_std: 0.0,
                control_uc_ratio: f64::INFINITY,
                control_samples: 1,
                uc_samples: 1,
            }],
        );
        let json = serde_json::to_string(&Outcome::ok(table)).unwrap();
        let back: Outcome<ComparisonTable> = serde_json::from_str(&json).unwrap();
        assert!(back.success);
        assert!(back.data.unwrap().stats[0].is_control_only());

        let failed: Outcome<ComparisonTable> =
            serde_json::from_str(r#"{"success":false,"error":"boom"}"#).unwrap();
        assert!(failed.data.is_none());
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
