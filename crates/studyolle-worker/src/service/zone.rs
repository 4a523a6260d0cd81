use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

use entity::zone;

use crate::error::{AppError, AppResult};
use crate::util::uuid_v4;

/// `city,local_name_of_city,province` per line.
const ZONE_CSV: &str = include_str!("../../data/zone_kor.csv");

fn parse_zone_line(line: &str) -> Option<zone::ActiveModel> {
    let mut parts = line.split(',').map(str::trim);
    let city = parts.next().filter(|s| !s.is_empty())?;
    let local_name = parts.next().filter(|s| !s.is_empty())?;
    let province = parts.next().filter(|s| !s.is_empty())?;

    Some(zone::ActiveModel {
        id: Set(uuid_v4()),
        city: Set(city.to_string()),
        local_name_of_city: Set(local_name.to_string()),
        province: Set(province.to_string()),
    })
}

/// Load the bundled zone list once; a populated table is left untouched.
/// Returns the number of zones inserted.
pub async fn init_zone_data<C: ConnectionTrait>(db: &C) -> AppResult<usize> {
    if zone::Entity::find().count(db).await? > 0 {
        return Ok(0);
    }

    let mut zones = Vec::new();
    for (line_no, line) in ZONE_CSV.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let zone = parse_zone_line(line).ok_or_else(|| {
            AppError::Config(format!("zone_kor.csv line {} is malformed: {line}", line_no + 1))
        })?;
        zones.push(zone);
    }

    let inserted = zones.len();
    zone::Entity::insert_many(zones).exec_without_returning(db).await?;
    tracing::info!(inserted, "seeded zone data");
    Ok(inserted)
}

pub async fn find_by_city_and_province<C: ConnectionTrait>(
    db: &C,
    city: &str,
    province: &str,
) -> AppResult<Option<zone::Model>> {
    Ok(zone::Entity::find()
        .filter(zone::Column::City.eq(city))
        .filter(zone::Column::Province.eq(province))
        .one(db)
        .await?)
}

/// Display strings of every zone, for the zone input whitelist.
pub async fn all_names<C: ConnectionTrait>(db: &C) -> AppResult<Vec<String>> {
    Ok(zone::Entity::find()
        .order_by_asc(zone::Column::Province)
        .order_by_asc(zone::Column::City)
        .all(db)
        .await?
        .iter()
        .map(ToString::to_string)
        .collect())
}
