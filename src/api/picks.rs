use async_trait::async_trait;

use crate::api::client::ApiClient;
use crate::dto::pick_dto::{Pick, SubmitPicks, UserPick};
use crate::dto::race_dto::EventType;
use crate::error::ClientError;

pub async fn get_picks(
    client: &ApiClient,
    league_id: i64,
    event: EventType,
) -> Result<Vec<UserPick>, ClientError> {
    client
        .get_with_query(event.picks_path(), &[("leagueId", league_id.to_string())])
        .await
}

pub async fn submit_pick(
    client: &ApiClient,
    league_id: i64,
    pick: Pick,
    event: EventType,
) -> Result<(), ClientError> {
    let body = SubmitPicks {
        league_id,
        picks: vec![pick],
    };
    client.post_unit(event.picks_path(), &body).await
}

pub async fn remove_pick(
    client: &ApiClient,
    league_id: i64,
    position: u8,
    event: EventType,
) -> Result<(), ClientError> {
    client
        .delete_unit(
            &format!("{}/{}", event.picks_path(), position),
            &[("leagueId", league_id.to_string())],
        )
        .await
}

/// Seam between the pick selection flow and the network. The flow is
/// written against this trait so its state handling can be exercised with
/// a fake server in tests.
#[async_trait]
pub trait PicksGateway: Send + Sync {
    async fn fetch_picks(
        &self,
        league_id: i64,
        event: EventType,
    ) -> Result<Vec<UserPick>, ClientError>;

    async fn submit_pick(
        &self,
        league_id: i64,
        pick: Pick,
        event: EventType,
    ) -> Result<(), ClientError>;

    async fn remove_pick(
        &self,
        league_id: i64,
        position: u8,
        event: EventType,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl PicksGateway for ApiClient {
    async fn fetch_picks(
        &self,
        league_id: i64,
        event: EventType,
    ) -> Result<Vec<UserPick>, ClientError> {
        get_picks(self, league_id, event).await
    }

    async fn submit_pick(
        &self,
        league_id: i64,
        pick: Pick,
        event: EventType,
    ) -> Result<(), ClientError> {
        submit_pick(self, league_id, pick, event).await
    }

    async fn remove_pick(
        &self,
        league_id: i64,
        position: u8,
        event: EventType,
    ) -> Result<(), ClientError> {
        remove_pick(self, league_id, position, event).await
    }
}
