use tracing::info;

use crate::api::client::{ApiClient, with_backoff};
use crate::api::{drivers, leagues, picks, races};
use crate::dto::driver_dto::Driver;
use crate::dto::league_dto::League;
use crate::dto::pick_dto::UserPick;
use crate::dto::race_dto::{EventType, Race};
use crate::error::ClientError;

/// Everything the race screen needs, fetched concurrently and joined
/// before rendering.
pub struct RaceWeekend {
    pub race: Race,
    pub drivers: Vec<Driver>,
    pub leagues: Vec<League>,
}

pub async fn load_race_weekend(client: &ApiClient) -> Result<RaceWeekend, ClientError> {
    info!("Loading race weekend data.");

    let (race, mut drivers, leagues) = futures_util::try_join!(
        with_backoff(|| races::get_current_race(client)),
        with_backoff(|| drivers::get_drivers(client)),
        with_backoff(|| leagues::get_leagues(client)),
    )?;

    sort_drivers(&mut drivers);
    Ok(RaceWeekend {
        race,
        drivers,
        leagues,
    })
}

/// A league's pick board for one event: which positions it requires and
/// what the server has confirmed so far.
pub struct LeagueBoard {
    pub required_positions: Vec<u8>,
    pub confirmed: Vec<UserPick>,
}

pub async fn load_league_board(
    client: &ApiClient,
    league_id: i64,
    event: EventType,
) -> Result<LeagueBoard, ClientError> {
    info!("Loading {} board for league {}.", event.label(), league_id);

    let (mut required_positions, confirmed) = futures_util::try_join!(
        with_backoff(|| leagues::get_required_positions(client, league_id)),
        with_backoff(|| picks::get_picks(client, league_id, event)),
    )?;

    required_positions.sort_unstable();
    Ok(LeagueBoard {
        required_positions,
        confirmed,
    })
}

fn sort_drivers(drivers: &mut [Driver]) {
    drivers.sort_by(|a, b| {
        a.team
            .cmp(&b.team)
            .then(a.driver_number.cmp(&b.driver_number))
    });
}
