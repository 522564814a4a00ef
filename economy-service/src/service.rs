use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use core_types::config::EconomyConfig;
use core_types::retry::ConflictRetry;
use core_types::tier::TierTable;
use core_types::types::UserId;
use ledger::{Account, AccountOrigin, AccountStore, LedgerError, StagedWrite, Version};
use log::{error, info, warn};
use parking_lot::Mutex;
use roll_engine::{RandomSource, RewardRoller};
use tokio::time::timeout;

use crate::{
    confirm::{ConfirmToken, ConfirmationSource},
    error::{EconomyError, Result},
    outcome::{ProfileView, RollOutcome, TransferOutcome, TransferRejection, TransferRequest},
};

/// Mediates every account mutation. Holds no per-invocation state; each call
/// re-reads current account state, so concurrent commands only contend on
/// the store's version guards.
pub struct EconomyService {
    store: Arc<dyn AccountStore>,
    roller: RewardRoller,
    rng: Mutex<Box<dyn RandomSource>>,
    confirmations: Arc<dyn ConfirmationSource>,
    cfg: EconomyConfig,
    retry: ConflictRetry,
}

impl EconomyService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        roller: RewardRoller,
        rng: Box<dyn RandomSource>,
        confirmations: Arc<dyn ConfirmationSource>,
        cfg: EconomyConfig,
    ) -> Self {
        Self {
            store,
            roller,
            rng: Mutex::new(rng),
            confirmations,
            cfg,
            retry: ConflictRetry::default(),
        }
    }

    /// Ordered tier table, for the tier-value listing and roll rendering.
    pub fn tier_table(&self) -> &TierTable {
        self.roller.table()
    }

    pub async fn roll_for(&self, user: UserId) -> Result<RollOutcome> {
        self.roll_for_at(user, Utc::now()).await
    }

    pub async fn roll_for_at(&self, user: UserId, now: DateTime<Utc>) -> Result<RollOutcome> {
        self.retry
            .run(EconomyError::is_contention, || self.roll_attempt(user, now))
            .await
            .map_err(|err| self.map_exhausted(err))
    }

    async fn roll_attempt(&self, user: UserId, now: DateTime<Utc>) -> Result<RollOutcome> {
        let blank = Account::fresh(user, self.roller.table(), now);
        let (record, origin) = self.store.get_or_create(blank)?;
        if origin == AccountOrigin::Created {
            info!("created ledger account for user {user}");
        }

        let mut account = record.account;
        let was_reset = account.reset_window_if_due(now);
        if account.earned_this_window >= self.cfg.hour_limit {
            // A reset observed on the way in is persisted even when the
            // roll itself is rejected; nothing else is written.
            if was_reset {
                self.guarded_update(record.version, account.clone())?;
            }
            return Ok(RollOutcome::RateLimited {
                resets_at: account.window_reset_at,
            });
        }

        let roll = {
            let mut rng = self.rng.lock();
            self.roller.perform_roll(rng.as_mut())
        };
        if !roll.is_whiff() {
            account.settle_roll(roll.points_won, &roll.matched_counts);
        }
        if !roll.is_whiff() || was_reset {
            self.guarded_update(record.version, account.clone())?;
        }

        Ok(RollOutcome::Rolled {
            roll,
            total_points: account.points,
            earned_this_window: account.earned_this_window,
        })
    }

    /// Read-only view; never creates an account as a side effect.
    pub fn get_profile(&self, user: UserId) -> Result<ProfileView> {
        match self.store.find(user)? {
            Some(record) => Ok(ProfileView {
                rolled_counts: record.account.rolled_counts,
                points: record.account.points,
            }),
            None => Ok(ProfileView {
                rolled_counts: self.roller.table().zeroed_counts(),
                points: 0,
            }),
        }
    }

    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome> {
        self.transfer_at(request, Utc::now()).await
    }

    /// Runs the transfer state machine: precondition validation, then the
    /// confirmation wait (the only suspending point in the core), then the
    /// atomic two-sided commit. Only an accepted confirmation mutates the
    /// ledger.
    pub async fn transfer_at(
        &self,
        request: TransferRequest,
        now: DateTime<Utc>,
    ) -> Result<TransferOutcome> {
        if let Some(rejection) = self.validate(&request)? {
            return Ok(TransferOutcome::Rejected(rejection));
        }

        let wait = Duration::from_secs(self.cfg.confirmation_timeout_s);
        let reply = match timeout(
            wait,
            self.confirmations.next_reply(request.giver, request.scope),
        )
        .await
        {
            Err(_) => return Ok(TransferOutcome::TimedOut),
            Ok(None) => {
                warn!(
                    "confirmation transport closed while awaiting user {}",
                    request.giver
                );
                return Ok(TransferOutcome::TimedOut);
            }
            Ok(Some(reply)) => reply,
        };

        match ConfirmToken::parse(&reply) {
            Some(ConfirmToken::Accept) => {
                self.retry
                    .run(EconomyError::is_contention, || {
                        self.transfer_attempt(&request, now)
                    })
                    .await
                    .map_err(|err| self.map_exhausted(err))
            }
            Some(ConfirmToken::Decline) => Ok(TransferOutcome::Declined),
            None => Ok(TransferOutcome::InvalidReply),
        }
    }

    fn validate(&self, request: &TransferRequest) -> Result<Option<TransferRejection>> {
        if request.giver == request.receiver {
            return Ok(Some(TransferRejection::SelfTransfer));
        }
        if request.points <= 0 {
            return Ok(Some(TransferRejection::NonPositiveAmount));
        }
        if !request.receiver_is_participant {
            return Ok(Some(TransferRejection::IneligibleReceiver));
        }
        let available = self
            .store
            .find(request.giver)?
            .map(|record| record.account.points)
            .unwrap_or(0);
        if available < request.points {
            return Ok(Some(TransferRejection::InsufficientFunds { available }));
        }
        Ok(None)
    }

    async fn transfer_attempt(
        &self,
        request: &TransferRequest,
        now: DateTime<Utc>,
    ) -> Result<TransferOutcome> {
        let giver = self.store.find(request.giver)?.ok_or_else(|| {
            error!("giver account {} vanished after validation", request.giver);
            EconomyError::Internal
        })?;
        if giver.account.points < request.points {
            // Funds moved while the confirmation was pending.
            return Ok(TransferOutcome::Rejected(
                TransferRejection::InsufficientFunds {
                    available: giver.account.points,
                },
            ));
        }
        let mut giver_account = giver.account;
        giver_account.points -= request.points;
        let giver_points = giver_account.points;

        let (credit, receiver_points) = match self.store.find(request.receiver)? {
            Some(record) => {
                let mut account = record.account;
                account.points += request.points;
                let points = account.points;
                (
                    StagedWrite {
                        expected_version: Some(record.version),
                        account,
                    },
                    points,
                )
            }
            None => {
                let mut account = Account::fresh(request.receiver, self.roller.table(), now);
                account.points = request.points;
                let points = account.points;
                (
                    StagedWrite {
                        expected_version: None,
                        account,
                    },
                    points,
                )
            }
        };

        match self.store.commit_transfer(
            StagedWrite {
                expected_version: Some(giver.version),
                account: giver_account,
            },
            credit,
        ) {
            Ok(()) => {
                info!(
                    "user {} gave {} points to user {}",
                    request.giver, request.points, request.receiver
                );
                Ok(TransferOutcome::Committed {
                    points: request.points,
                    giver_points,
                    receiver_points,
                })
            }
            Err(err @ LedgerError::NotFound { .. }) => {
                error!("ledger dropped an account mid-transfer: {err}");
                Err(EconomyError::Internal)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn guarded_update(&self, expected_version: Version, account: Account) -> Result<()> {
        match self.store.update(expected_version, account) {
            Ok(_) => Ok(()),
            Err(err @ LedgerError::NotFound { .. }) => {
                error!("ledger dropped an account mid-update: {err}");
                Err(EconomyError::Internal)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn map_exhausted(&self, err: EconomyError) -> EconomyError {
        if err.is_contention() {
            warn!("ledger contention exhausted retries: {err}");
            EconomyError::Contention {
                attempts: self.retry.max_attempts,
            }
        } else {
            err
        }
    }
}
