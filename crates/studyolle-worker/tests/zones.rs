mod common;

use sea_orm::{EntityTrait, PaginatorTrait};

use entity::zone;
use studyolle_worker::service::zone::{all_names, find_by_city_and_province, init_zone_data};

use common::memory_db;

#[tokio::test]
async fn zone_data_is_seeded_once() {
    let db = memory_db().await;

    let inserted = init_zone_data(&db).await.expect("seed");
    assert!(inserted > 0);
    assert_eq!(init_zone_data(&db).await.expect("second seed"), 0);
    assert_eq!(zone::Entity::find().count(&db).await.expect("count"), inserted as u64);

    let suwon = find_by_city_and_province(&db, "Suwon", "Gyeonggi")
        .await
        .expect("query")
        .expect("Suwon exists");
    assert_eq!(suwon.local_name_of_city, "수원시");
    assert!(all_names(&db)
        .await
        .expect("names")
        .contains(&"Suwon(수원시)/Gyeonggi".to_string()));
}
