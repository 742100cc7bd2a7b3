use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::picks::PicksGateway;
use crate::dto::pick_dto::{Pick, UserPick};
use crate::dto::race_dto::{EventType, Race};
use crate::error::ClientError;

/// Per-position pick state for one league and event. Selections are
/// applied optimistically and reconciled with the server on every
/// mutation; the server stays the enforcement point for locking.
pub struct PickFlow {
    gateway: Arc<dyn PicksGateway>,
    league_id: i64,
    event: EventType,
    required_positions: Vec<u8>,
    picks_locked: bool,
    /// In-progress picks, position -> driver id.
    selections: HashMap<u8, i64>,
    /// Server-confirmed picks by position.
    confirmed: HashMap<u8, UserPick>,
    /// Positions with a submission in flight.
    submitting: HashSet<u8>,
}

impl PickFlow {
    pub fn new(
        gateway: Arc<dyn PicksGateway>,
        league_id: i64,
        event: EventType,
        mut required_positions: Vec<u8>,
    ) -> Self {
        required_positions.sort_unstable();
        Self {
            gateway,
            league_id,
            event,
            required_positions,
            picks_locked: false,
            selections: HashMap::new(),
            confirmed: HashMap::new(),
            submitting: HashSet::new(),
        }
    }

    /// Builds a flow for the given race event. Sprint picks only exist on
    /// sprint weekends.
    pub fn for_race(
        gateway: Arc<dyn PicksGateway>,
        league_id: i64,
        event: EventType,
        required_positions: Vec<u8>,
        race: &Race,
    ) -> Result<Self, ClientError> {
        if event == EventType::Sprint && !race.has_sprint {
            return Err(ClientError::NoSprintScheduled);
        }
        let mut flow = Self::new(gateway, league_id, event, required_positions);
        flow.sync_race(race);
        Ok(flow)
    }

    /// Mirrors the server's lock flag. The client never computes it.
    pub fn sync_race(&mut self, race: &Race) {
        self.picks_locked = race.picks_locked;
    }

    pub fn picks_locked(&self) -> bool {
        self.picks_locked
    }

    pub fn required_positions(&self) -> &[u8] {
        &self.required_positions
    }

    /// Advisory lock state for UI disabling only.
    pub fn is_position_locked(&self, position: u8) -> bool {
        self.picks_locked
            || self
                .confirmed
                .get(&position)
                .map(|pick| pick.is_locked)
                .unwrap_or(false)
    }

    /// Effective driver at a position, the local selection superseding the
    /// confirmed pick.
    pub fn driver_at(&self, position: u8) -> Option<i64> {
        self.selections.get(&position).copied().or_else(|| {
            self.confirmed
                .get(&position)
                .map(|pick| pick.driver_id)
        })
    }

    pub fn confirmed_pick(&self, position: u8) -> Option<&UserPick> {
        self.confirmed.get(&position)
    }

    /// Required positions with no pick yet.
    pub fn open_positions(&self) -> Vec<u8> {
        self.required_positions
            .iter()
            .copied()
            .filter(|&position| self.driver_at(position).is_none())
            .collect()
    }

    fn position_using_driver(&self, driver_id: i64, except: u8) -> Option<u8> {
        self.required_positions
            .iter()
            .copied()
            .filter(|&position| position != except)
            .find(|&position| self.driver_at(position) == Some(driver_id))
    }

    /// Picks a driver for a position: optimistic local apply, one
    /// submission call, rollback on failure. Every precondition failure
    /// returns before any network traffic.
    pub async fn select_driver(&mut self, position: u8, driver_id: i64) -> Result<(), ClientError> {
        if self.picks_locked {
            warn!("Picks are locked for this race, ignoring selection.");
            return Err(ClientError::PicksLocked);
        }
        if !self.required_positions.contains(&position) {
            return Err(ClientError::PositionNotRequired(position));
        }
        if self.is_position_locked(position) {
            return Err(ClientError::PositionLocked(position));
        }
        if self.submitting.contains(&position) {
            return Err(ClientError::SubmissionInFlight(position));
        }
        if self.driver_at(position) == Some(driver_id) {
            // Already in place, nothing to submit.
            return Ok(());
        }
        if let Some(taken_at) = self.position_using_driver(driver_id, position) {
            return Err(ClientError::DriverAlreadyPicked {
                driver_id,
                position: taken_at,
            });
        }

        let previous = self.selections.insert(position, driver_id);
        self.submitting.insert(position);
        info!(
            "Submitting P{} -> driver {} for league {} ({}).",
            position,
            driver_id,
            self.league_id,
            self.event.label()
        );

        let result = self
            .gateway
            .submit_pick(
                self.league_id,
                Pick {
                    position,
                    driver_id,
                },
                self.event,
            )
            .await;
        self.submitting.remove(&position);

        match result {
            Ok(()) => {
                self.refresh_confirmed().await;
                Ok(())
            }
            Err(e) => {
                // Put the mapping back exactly as it was before the call.
                match previous {
                    Some(previous_driver) => {
                        self.selections.insert(position, previous_driver);
                    }
                    None => {
                        self.selections.remove(&position);
                    }
                }
                warn!("Pick for P{} was rejected: {}", position, e);
                Err(e)
            }
        }
    }

    /// Removes the pick at a position, local and confirmed state alike,
    /// restoring both if the server refuses.
    pub async fn remove_pick(&mut self, position: u8) -> Result<(), ClientError> {
        if self.picks_locked {
            warn!("Picks are locked for this race, ignoring removal.");
            return Err(ClientError::PicksLocked);
        }
        if self.is_position_locked(position) {
            return Err(ClientError::PositionLocked(position));
        }
        if self.submitting.contains(&position) {
            return Err(ClientError::SubmissionInFlight(position));
        }

        let previous_selection = self.selections.remove(&position);
        let previous_confirmed = self.confirmed.remove(&position);
        if previous_selection.is_none() && previous_confirmed.is_none() {
            return Err(ClientError::NoPickAtPosition(position));
        }

        self.submitting.insert(position);
        info!(
            "Removing pick at P{} for league {} ({}).",
            position,
            self.league_id,
            self.event.label()
        );
        let result = self
            .gateway
            .remove_pick(self.league_id, position, self.event)
            .await;
        self.submitting.remove(&position);

        match result {
            Ok(()) => {
                self.refresh_confirmed().await;
                Ok(())
            }
            Err(e) => {
                if let Some(driver_id) = previous_selection {
                    self.selections.insert(position, driver_id);
                }
                if let Some(pick) = previous_confirmed {
                    self.confirmed.insert(position, pick);
                }
                warn!("Removal of P{} was rejected: {}", position, e);
                Err(e)
            }
        }
    }

    /// Replaces confirmed state with the authoritative server list. Local
    /// selections the server has since confirmed are dropped.
    pub async fn load_confirmed_picks(&mut self) -> Result<(), ClientError> {
        let picks = self
            .gateway
            .fetch_picks(self.league_id, self.event)
            .await?;
        self.apply_confirmed(picks);
        Ok(())
    }

    fn apply_confirmed(&mut self, picks: Vec<UserPick>) {
        self.confirmed = picks
            .into_iter()
            .map(|pick| (pick.position, pick))
            .collect();
        let confirmed = &self.confirmed;
        self.selections.retain(|position, driver_id| {
            confirmed.get(position).map(|pick| pick.driver_id) != Some(*driver_id)
        });
    }

    /// A mutation landed; a refresh failure must not undo it. The next
    /// activation refetch reconciles.
    async fn refresh_confirmed(&mut self) {
        if let Err(e) = self.load_confirmed_picks().await {
            warn!("Could not refresh confirmed picks: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct FakeState {
        server_picks: HashMap<u8, UserPick>,
        fail_submit: bool,
        fail_remove: bool,
        submit_calls: u32,
        remove_calls: u32,
        fetch_calls: u32,
    }

    #[derive(Default)]
    struct FakeGateway {
        state: Mutex<FakeState>,
    }

    impl FakeGateway {
        fn confirmed(position: u8, driver_id: i64, is_locked: bool) -> UserPick {
            UserPick {
                id: i64::from(position),
                league_id: 7,
                week_number: 8,
                position,
                driver_id,
                driver_name: format!("Driver {}", driver_id),
                driver_team: "Team".to_string(),
                is_locked,
                is_scored: false,
                points: None,
            }
        }

        fn network_calls(&self) -> u32 {
            let state = self.state.lock().unwrap();
            state.submit_calls + state.remove_calls + state.fetch_calls
        }
    }

    #[async_trait::async_trait]
    impl PicksGateway for FakeGateway {
        async fn fetch_picks(
            &self,
            _league_id: i64,
            _event: EventType,
        ) -> Result<Vec<UserPick>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.fetch_calls += 1;
            Ok(state.server_picks.values().cloned().collect())
        }

        async fn submit_pick(
            &self,
            _league_id: i64,
            pick: Pick,
            _event: EventType,
        ) -> Result<(), ClientError> {
            let mut state = self.state.lock().unwrap();
            state.submit_calls += 1;
            if state.fail_submit {
                return Err(ClientError::Rejected {
                    status: 409,
                    message: "rejected by server".to_string(),
                });
            }
            state
                .server_picks
                .insert(pick.position, Self::confirmed(pick.position, pick.driver_id, false));
            Ok(())
        }

        async fn remove_pick(
            &self,
            _league_id: i64,
            position: u8,
            _event: EventType,
        ) -> Result<(), ClientError> {
            let mut state = self.state.lock().unwrap();
            state.remove_calls += 1;
            if state.fail_remove {
                return Err(ClientError::Rejected {
                    status: 409,
                    message: "rejected by server".to_string(),
                });
            }
            state.server_picks.remove(&position);
            Ok(())
        }
    }

    fn race(picks_locked: bool, has_sprint: bool) -> Race {
        Race {
            race_name: "Monaco Grand Prix".to_string(),
            week_number: 8,
            race_date: Utc::now(),
            picks_locked,
            lock_time: None,
            has_sprint,
            country: Some("Monaco".to_string()),
        }
    }

    fn open_flow(positions: Vec<u8>) -> (Arc<FakeGateway>, PickFlow) {
        let gateway = Arc::new(FakeGateway::default());
        let flow = PickFlow::for_race(
            gateway.clone(),
            7,
            EventType::Race,
            positions,
            &race(false, false),
        )
        .unwrap();
        (gateway, flow)
    }

    #[tokio::test]
    async fn successful_selection_confirms_exactly_one_pick() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);

        flow.select_driver(1, 44).await.unwrap();

        assert_eq!(flow.driver_at(1), Some(44));
        assert_eq!(flow.confirmed_pick(1).unwrap().driver_id, 44);
        assert_eq!(flow.driver_at(10), None);
        assert_eq!(flow.open_positions(), vec![10]);

        let state = gateway.state.lock().unwrap();
        assert_eq!(state.submit_calls, 1);
        assert_eq!(state.fetch_calls, 1);
    }

    #[tokio::test]
    async fn duplicate_driver_is_rejected_before_any_network_call() {
        // League requires [1, 10]; driver 44 goes to P1, then the same
        // driver is attempted at P10.
        let (gateway, mut flow) = open_flow(vec![1, 10]);

        flow.select_driver(1, 44).await.unwrap();
        let calls_after_first = gateway.network_calls();

        let result = flow.select_driver(10, 44).await;
        assert!(matches!(
            result,
            Err(ClientError::DriverAlreadyPicked {
                driver_id: 44,
                position: 1,
            })
        ));
        assert_eq!(flow.driver_at(10), None);
        assert_eq!(gateway.network_calls(), calls_after_first);
    }

    #[tokio::test]
    async fn failed_submission_rolls_back_to_prior_state() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);

        flow.select_driver(1, 44).await.unwrap();
        gateway.state.lock().unwrap().fail_submit = true;

        let result = flow.select_driver(1, 63).await;
        assert!(matches!(result, Err(ClientError::Rejected { .. })));
        assert_eq!(flow.driver_at(1), Some(44));

        // A position that had no pick before the failed call stays unset.
        let result = flow.select_driver(10, 63).await;
        assert!(matches!(result, Err(ClientError::Rejected { .. })));
        assert_eq!(flow.driver_at(10), None);
    }

    #[tokio::test]
    async fn locked_race_is_a_no_op_without_network_traffic() {
        let gateway = Arc::new(FakeGateway::default());
        let mut flow = PickFlow::for_race(
            gateway.clone(),
            7,
            EventType::Race,
            vec![1, 10],
            &race(true, false),
        )
        .unwrap();

        assert!(matches!(
            flow.select_driver(1, 44).await,
            Err(ClientError::PicksLocked)
        ));
        assert!(matches!(
            flow.remove_pick(1).await,
            Err(ClientError::PicksLocked)
        ));
        assert_eq!(gateway.network_calls(), 0);
    }

    #[tokio::test]
    async fn removed_pick_is_gone_after_reloading_confirmed_state() {
        let (_, mut flow) = open_flow(vec![1, 10]);

        flow.select_driver(1, 44).await.unwrap();
        flow.remove_pick(1).await.unwrap();
        flow.load_confirmed_picks().await.unwrap();

        assert!(flow.confirmed_pick(1).is_none());
        assert_eq!(flow.driver_at(1), None);
    }

    #[tokio::test]
    async fn failed_removal_restores_local_and_confirmed_state() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);
        gateway
            .state
            .lock()
            .unwrap()
            .server_picks
            .insert(1, FakeGateway::confirmed(1, 44, false));
        flow.load_confirmed_picks().await.unwrap();

        gateway.state.lock().unwrap().fail_remove = true;
        let result = flow.remove_pick(1).await;

        assert!(matches!(result, Err(ClientError::Rejected { .. })));
        assert_eq!(flow.confirmed_pick(1).unwrap().driver_id, 44);
        assert_eq!(flow.driver_at(1), Some(44));
    }

    #[tokio::test]
    async fn removing_an_empty_position_fails_locally() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);

        assert!(matches!(
            flow.remove_pick(10).await,
            Err(ClientError::NoPickAtPosition(10))
        ));
        assert_eq!(gateway.network_calls(), 0);
    }

    #[tokio::test]
    async fn position_outside_the_required_set_is_rejected() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);

        assert!(matches!(
            flow.select_driver(5, 44).await,
            Err(ClientError::PositionNotRequired(5))
        ));
        assert_eq!(gateway.network_calls(), 0);
    }

    #[tokio::test]
    async fn locked_confirmed_position_rejects_changes() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);
        gateway
            .state
            .lock()
            .unwrap()
            .server_picks
            .insert(1, FakeGateway::confirmed(1, 44, true));
        flow.load_confirmed_picks().await.unwrap();

        assert!(flow.is_position_locked(1));
        assert!(!flow.is_position_locked(10));
        assert!(matches!(
            flow.select_driver(1, 63).await,
            Err(ClientError::PositionLocked(1))
        ));
        assert!(matches!(
            flow.remove_pick(1).await,
            Err(ClientError::PositionLocked(1))
        ));
    }

    #[tokio::test]
    async fn in_flight_position_refuses_a_second_submission() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);

        flow.submitting.insert(1);
        assert!(matches!(
            flow.select_driver(1, 44).await,
            Err(ClientError::SubmissionInFlight(1))
        ));
        assert_eq!(gateway.network_calls(), 0);
    }

    #[tokio::test]
    async fn reselecting_the_same_driver_does_not_resubmit() {
        let (gateway, mut flow) = open_flow(vec![1, 10]);

        flow.select_driver(1, 44).await.unwrap();
        flow.select_driver(1, 44).await.unwrap();

        assert_eq!(gateway.state.lock().unwrap().submit_calls, 1);
    }

    #[tokio::test]
    async fn confirmed_picks_supersede_matching_local_selections() {
        let (_, mut flow) = open_flow(vec![1, 10]);

        flow.select_driver(1, 44).await.unwrap();
        // The submission refetch already confirmed it; the local entry is
        // gone and the confirmed record is what remains.
        assert!(flow.selections.is_empty());
        assert_eq!(flow.confirmed_pick(1).unwrap().driver_id, 44);
    }

    #[test]
    fn sprint_flow_requires_a_sprint_weekend() {
        let gateway = Arc::new(FakeGateway::default());
        let result = PickFlow::for_race(
            gateway.clone(),
            7,
            EventType::Sprint,
            vec![1],
            &race(false, false),
        );
        assert!(matches!(result, Err(ClientError::NoSprintScheduled)));

        assert!(
            PickFlow::for_race(gateway, 7, EventType::Sprint, vec![1], &race(false, true))
                .is_ok()
        );
    }
}
