//! Sweepstake state machine.
//!
//! ```text
//! upcoming -> active -> ended -> drawing_complete
//!     \          \        \
//!      +----------+--------+--> cancelled
//! ```
//!
//! `upcoming -> active -> ended` follow the clock and are derived at read
//! time, never written back. Stored transitions come from operator actions
//! (end early, cancel) and from a successful draw.

use chrono::{DateTime, Utc};

use crate::entities::{SweepstakeStatus, sweepstake_entity as sweepstakes};
use crate::error::SweepstakeError;

impl SweepstakeStatus {
    /// `drawing_complete` and `cancelled` have no outbound transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SweepstakeStatus::DrawingComplete | SweepstakeStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: SweepstakeStatus) -> bool {
        use SweepstakeStatus::*;
        matches!(
            (self, next),
            (Upcoming, Active)
                | (Upcoming, Cancelled)
                | (Active, Ended)
                | (Active, Cancelled)
                | (Ended, DrawingComplete)
                | (Ended, Cancelled)
        )
    }
}

/// The status a sweepstake is in at `now`. Use this everywhere status is
/// shown or enforced instead of the stored column.
pub fn derive_effective_status(
    sweepstake: &sweepstakes::Model,
    now: DateTime<Utc>,
) -> SweepstakeStatus {
    match sweepstake.status {
        SweepstakeStatus::Cancelled => SweepstakeStatus::Cancelled,
        _ if sweepstake.is_drawn => SweepstakeStatus::DrawingComplete,
        SweepstakeStatus::DrawingComplete => SweepstakeStatus::DrawingComplete,
        SweepstakeStatus::Ended => SweepstakeStatus::Ended,
        SweepstakeStatus::Upcoming | SweepstakeStatus::Active => {
            if now >= sweepstake.end_date {
                SweepstakeStatus::Ended
            } else if now >= sweepstake.start_date {
                SweepstakeStatus::Active
            } else {
                SweepstakeStatus::Upcoming
            }
        }
    }
}

pub fn ensure_transition(
    from: SweepstakeStatus,
    to: SweepstakeStatus,
) -> Result<(), SweepstakeError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(SweepstakeError::InvalidTransition { from, to })
    }
}

/// Manual "end early": only while active and before the scheduled end
pub fn check_end_early(
    sweepstake: &sweepstakes::Model,
    now: DateTime<Utc>,
) -> Result<(), SweepstakeError> {
    let effective = derive_effective_status(sweepstake, now);
    if effective != SweepstakeStatus::Active || now >= sweepstake.end_date {
        return Err(SweepstakeError::InvalidTransition {
            from: effective,
            to: SweepstakeStatus::Ended,
        });
    }
    Ok(())
}

/// Entry eligibility, checked in this order:
/// balance, end date, start date, effective status.
/// Authentication is checked by the caller before anything is loaded.
pub fn check_entry(
    sweepstake: &sweepstakes::Model,
    balance: i64,
    now: DateTime<Utc>,
) -> Result<(), SweepstakeError> {
    if balance < sweepstake.points_to_enter {
        return Err(SweepstakeError::InsufficientPoints {
            required: sweepstake.points_to_enter,
            available: balance,
        });
    }
    if now > sweepstake.end_date {
        return Err(SweepstakeError::SweepstakeEnded);
    }
    if now < sweepstake.start_date {
        return Err(SweepstakeError::SweepstakeNotStarted);
    }
    match derive_effective_status(sweepstake, now) {
        SweepstakeStatus::Active => Ok(()),
        other => Err(SweepstakeError::InvalidStatusForEntry(other)),
    }
}

/// Draw preconditions that depend on status only. The participant check
/// happens once the pool is loaded.
pub fn check_draw(
    sweepstake: &sweepstakes::Model,
    now: DateTime<Utc>,
) -> Result<(), SweepstakeError> {
    match derive_effective_status(sweepstake, now) {
        SweepstakeStatus::Ended => Ok(()),
        SweepstakeStatus::DrawingComplete => Err(SweepstakeError::AlreadyDrawn),
        SweepstakeStatus::Cancelled => Err(SweepstakeError::InvalidStatusForDraw(
            SweepstakeStatus::Cancelled,
        )),
        SweepstakeStatus::Upcoming | SweepstakeStatus::Active => {
            Err(SweepstakeError::SweepstakeNotEnded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sweepstake(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: SweepstakeStatus,
    ) -> sweepstakes::Model {
        sweepstakes::Model {
            id: 1,
            advertiser_id: 1,
            title: "Spa weekend".to_string(),
            description: "Two nights".to_string(),
            prize_details: "Spa voucher".to_string(),
            image_url: None,
            start_date: start,
            end_date: end,
            points_to_enter: 50,
            number_of_winners: 1,
            max_participants: None,
            status,
            is_drawn: false,
            draw_date: None,
            participant_count: 0,
            created_at: start,
            updated_at: start,
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now, now - Duration::days(1), now + Duration::days(1))
    }

    #[test]
    fn test_status_derived_from_dates() {
        let (now, start, end) = window();
        let s = sweepstake(start, end, SweepstakeStatus::Upcoming);
        assert_eq!(derive_effective_status(&s, now), SweepstakeStatus::Active);
        assert_eq!(
            derive_effective_status(&s, start - Duration::seconds(1)),
            SweepstakeStatus::Upcoming
        );
        assert_eq!(derive_effective_status(&s, end), SweepstakeStatus::Ended);
    }

    #[test]
    fn test_stored_operator_status_wins_over_dates() {
        let (now, start, end) = window();
        let ended = sweepstake(start, end, SweepstakeStatus::Ended);
        assert_eq!(derive_effective_status(&ended, now), SweepstakeStatus::Ended);

        let cancelled = sweepstake(start, end, SweepstakeStatus::Cancelled);
        assert_eq!(
            derive_effective_status(&cancelled, end + Duration::days(3)),
            SweepstakeStatus::Cancelled
        );

        let mut drawn = sweepstake(start, end, SweepstakeStatus::Ended);
        drawn.is_drawn = true;
        assert_eq!(
            derive_effective_status(&drawn, now),
            SweepstakeStatus::DrawingComplete
        );
    }

    #[test]
    fn test_transitions() {
        use SweepstakeStatus::*;
        assert!(Upcoming.can_transition_to(Active));
        assert!(Active.can_transition_to(Ended));
        assert!(Ended.can_transition_to(DrawingComplete));
        assert!(Ended.can_transition_to(Cancelled));
        assert!(!Upcoming.can_transition_to(DrawingComplete));
        assert!(!Active.can_transition_to(DrawingComplete));
        assert!(!Ended.can_transition_to(Active));

        for next in [Upcoming, Active, Ended, DrawingComplete, Cancelled] {
            assert!(!DrawingComplete.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(DrawingComplete.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Ended.is_terminal());

        assert_eq!(
            ensure_transition(Cancelled, Ended),
            Err(SweepstakeError::InvalidTransition {
                from: Cancelled,
                to: Ended
            })
        );
    }

    #[test]
    fn test_end_early_only_while_active() {
        let (now, start, end) = window();
        let active = sweepstake(start, end, SweepstakeStatus::Upcoming);
        assert!(check_end_early(&active, now).is_ok());

        let not_started = sweepstake(now + Duration::hours(1), end, SweepstakeStatus::Upcoming);
        assert!(matches!(
            check_end_early(&not_started, now),
            Err(SweepstakeError::InvalidTransition {
                from: SweepstakeStatus::Upcoming,
                ..
            })
        ));

        let already_over = sweepstake(start, now - Duration::hours(1), SweepstakeStatus::Active);
        assert!(check_end_early(&already_over, now).is_err());

        let ended = sweepstake(start, end, SweepstakeStatus::Ended);
        assert!(check_end_early(&ended, now).is_err());
    }

    #[test]
    fn test_entry_checks_run_in_order() {
        let (now, start, end) = window();

        // insufficient points is reported before anything about dates
        let over = sweepstake(start - Duration::days(5), start, SweepstakeStatus::Cancelled);
        assert_eq!(
            check_entry(&over, 10, now),
            Err(SweepstakeError::InsufficientPoints {
                required: 50,
                available: 10
            })
        );
        assert_eq!(check_entry(&over, 50, now), Err(SweepstakeError::SweepstakeEnded));

        let future = sweepstake(end, end + Duration::days(1), SweepstakeStatus::Upcoming);
        assert_eq!(
            check_entry(&future, 50, now),
            Err(SweepstakeError::SweepstakeNotStarted)
        );

        let cancelled = sweepstake(start, end, SweepstakeStatus::Cancelled);
        assert_eq!(
            check_entry(&cancelled, 50, now),
            Err(SweepstakeError::InvalidStatusForEntry(
                SweepstakeStatus::Cancelled
            ))
        );

        let closed_early = sweepstake(start, end, SweepstakeStatus::Ended);
        assert_eq!(
            check_entry(&closed_early, 50, now),
            Err(SweepstakeError::InvalidStatusForEntry(SweepstakeStatus::Ended))
        );

        let open = sweepstake(start, end, SweepstakeStatus::Upcoming);
        assert_eq!(check_entry(&open, 50, now), Ok(()));
    }

    #[test]
    fn test_draw_requires_ended() {
        let (now, start, end) = window();
        let open = sweepstake(start, end, SweepstakeStatus::Active);
        assert_eq!(check_draw(&open, now), Err(SweepstakeError::SweepstakeNotEnded));

        let past = sweepstake(start, now - Duration::minutes(1), SweepstakeStatus::Upcoming);
        assert_eq!(check_draw(&past, now), Ok(()));

        let closed_early = sweepstake(start, end, SweepstakeStatus::Ended);
        assert_eq!(check_draw(&closed_early, now), Ok(()));

        let mut drawn = sweepstake(start, end, SweepstakeStatus::DrawingComplete);
        drawn.is_drawn = true;
        assert_eq!(check_draw(&drawn, now), Err(SweepstakeError::AlreadyDrawn));

        let cancelled = sweepstake(start, end, SweepstakeStatus::Cancelled);
        assert_eq!(
            check_draw(&cancelled, now),
            Err(SweepstakeError::InvalidStatusForDraw(
                SweepstakeStatus::Cancelled
            ))
        );
    }
}
