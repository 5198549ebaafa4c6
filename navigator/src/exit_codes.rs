//! Stable exit codes for the navigator CLI.

use crate::trip::TripOutcome;

/// Trip arrived, or the command succeeded.
pub const ARRIVED: i32 = 0;
/// Request rejected before any resource was touched, or invalid usage.
pub const REJECTED: i32 = 1;
/// Trip ended because the vehicle stopped making progress.
pub const STUCK: i32 = 2;
/// Trip ended because it exceeded its time budget.
pub const TIMED_OUT: i32 = 3;
/// Trip aborted on an operational fault.
pub const ABORTED: i32 = 4;

pub fn for_outcome(outcome: &TripOutcome) -> i32 {
    match outcome {
        TripOutcome::Arrived => ARRIVED,
        TripOutcome::Stuck => STUCK,
        TripOutcome::TimedOut => TIMED_OUT,
        TripOutcome::Aborted { .. } => ABORTED,
        TripOutcome::RejectedUnknownLandmark { .. }
        | TripOutcome::RejectedTripTooShort { .. }
        | TripOutcome::RejectedUnreachable => REJECTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::AbortCause;

    #[test]
    fn every_outcome_family_maps_to_a_distinct_code() {
        assert_eq!(for_outcome(&TripOutcome::Arrived), ARRIVED);
        assert_eq!(for_outcome(&TripOutcome::Stuck), STUCK);
        assert_eq!(for_outcome(&TripOutcome::TimedOut), TIMED_OUT);
        assert_eq!(
            for_outcome(&TripOutcome::Aborted {
                cause: AbortCause::Runtime("fault".to_string())
            }),
            ABORTED
        );
        assert_eq!(for_outcome(&TripOutcome::RejectedUnreachable), REJECTED);
    }
}
