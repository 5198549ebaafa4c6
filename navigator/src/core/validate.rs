//! Trip request validation. Runs before any resource is touched.

use thiserror::Error;

use crate::core::geometry::{distance, Pose};
use crate::core::landmarks::LandmarkTable;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("unknown landmark '{name}'")]
    UnknownLandmark { name: String },
    #[error("trip too short: endpoints are {distance:.2} units apart (minimum {minimum:.2})")]
    TripTooShort { distance: f64, minimum: f64 },
}

/// Resolve both trip endpoints against the landmark table.
///
/// No side effects; failure leaves nothing to clean up.
pub fn resolve_endpoints<'a>(
    table: &'a LandmarkTable,
    start: &str,
    end: &str,
) -> Result<(&'a Pose, &'a Pose), ValidationError> {
    let start_pose = table
        .get(start)
        .ok_or_else(|| ValidationError::UnknownLandmark {
            name: start.to_string(),
        })?;
    let end_pose = table.get(end).ok_or_else(|| ValidationError::UnknownLandmark {
        name: end.to_string(),
    })?;
    Ok((start_pose, end_pose))
}

/// Reject degenerate trips whose endpoints are closer than `minimum`.
///
/// Called on road-projected poses, so the check reflects what the planner
/// would actually see. Returns the separation on success.
pub fn check_separation(start: &Pose, end: &Pose, minimum: f64) -> Result<f64, ValidationError> {
    let separation = distance(&start.position, &end.position);
    if separation < minimum {
        return Err(ValidationError::TripTooShort {
            distance: separation,
            minimum,
        });
    }
    Ok(separation)
}
