use tracing::info;

use crate::api::client::ApiClient;
use crate::dto::league_dto::{CreateLeague, League};
use crate::error::ClientError;

pub async fn get_leagues(client: &ApiClient) -> Result<Vec<League>, ClientError> {
    client.get("leagues").await
}

pub async fn get_public_leagues(client: &ApiClient) -> Result<Vec<League>, ClientError> {
    client.get("leagues/public").await
}

pub async fn get_required_positions(
    client: &ApiClient,
    league_id: i64,
) -> Result<Vec<u8>, ClientError> {
    client
        .get(&format!("leagues/{}/positions", league_id))
        .await
}

/// Creates a league. The position set is validated locally first so an
/// obviously bad request never leaves the device.
pub async fn create_league(
    client: &ApiClient,
    league: &CreateLeague,
) -> Result<League, ClientError> {
    validate_positions(&league.required_positions)?;
    info!("Creating league \"{}\".", league.name);
    client.post("leagues", league).await
}

fn validate_positions(positions: &[u8]) -> Result<(), ClientError> {
    if positions.is_empty() {
        return Err(ClientError::NoPositions);
    }
    let mut seen = std::collections::HashSet::new();
    for &position in positions {
        if !(1..=20).contains(&position) {
            return Err(ClientError::InvalidPosition(position));
        }
        if !seen.insert(position) {
            return Err(ClientError::DuplicatePosition(position));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_sane_position_set() {
        assert!(validate_positions(&[1, 5, 10, 20]).is_ok());
    }

    #[test]
    fn rejects_empty_position_set() {
        assert!(matches!(
            validate_positions(&[]),
            Err(ClientError::NoPositions)
        ));
    }

    #[test]
    fn rejects_positions_off_the_grid() {
        assert!(matches!(
            validate_positions(&[1, 21]),
            Err(ClientError::InvalidPosition(21))
        ));
        assert!(matches!(
            validate_positions(&[0]),
            Err(ClientError::InvalidPosition(0))
        ));
    }

    #[test]
    fn rejects_duplicate_positions() {
        assert!(matches!(
            validate_positions(&[3, 7, 3]),
            Err(ClientError::DuplicatePosition(3))
        ));
    }
}
