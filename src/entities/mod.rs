pub mod point_transactions;
pub mod sweepstake_participants;
pub mod sweepstake_winners;
pub mod sweepstakes;
pub mod users;

pub use point_transactions as point_transaction_entity;
pub use point_transactions::PointTransactionKind;
pub use sweepstake_participants as participant_entity;
pub use sweepstake_winners as winner_entity;
pub use sweepstakes as sweepstake_entity;
pub use sweepstakes::SweepstakeStatus;
pub use users as user_entity;
pub use users::UserRole;
