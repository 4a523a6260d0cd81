use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::Serialize;

use entity::{account, study, study_manager, study_member, study_tag, study_zone, tag, zone};

use crate::error::{AppError, AppResult};
use crate::form::{is_valid_study_path, StudyDescriptionForm, StudyForm};
use crate::service::link;
use crate::util::{now_ts, uuid_v4};
use crate::validator::path_taken;

const MAX_TITLE_LEN: usize = 50;

/// A study together with everything its pages show.
#[derive(Debug, Clone, Serialize)]
pub struct StudyDetail {
    #[serde(flatten)]
    pub study: study::Model,
    pub managers: Vec<account::Model>,
    pub members: Vec<account::Model>,
    pub tags: Vec<tag::Model>,
    pub zones: Vec<zone::Model>,
}

impl StudyDetail {
    pub fn is_manager(&self, account_id: &str) -> bool {
        self.managers.iter().any(|a| a.id == account_id)
    }

    pub fn is_member(&self, account_id: &str) -> bool {
        self.members.iter().any(|a| a.id == account_id)
    }

    /// Published, recruiting, and the account is neither a member nor a manager.
    pub fn is_joinable(&self, account_id: &str) -> bool {
        self.study.published
            && self.study.recruiting
            && !self.is_member(account_id)
            && !self.is_manager(account_id)
    }

    pub fn tag_titles(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.title.clone()).collect()
    }

    pub fn zone_names(&self) -> Vec<String> {
        self.zones.iter().map(ToString::to_string).collect()
    }
}

/// Persist a new study; its creator becomes the first manager.
pub async fn create_new_study<C: ConnectionTrait>(
    db: &C,
    form: &StudyForm,
    account: &account::Model,
) -> AppResult<study::Model> {
    let now = now_ts();
    let created = study::ActiveModel {
        id: Set(uuid_v4()),
        path: Set(form.path.clone()),
        title: Set(form.title.trim().to_string()),
        short_description: Set(form.short_description.clone()),
        full_description: Set(form.full_description.clone()),
        image: Set(None),
        use_banner: Set(false),
        published: Set(false),
        published_at: Set(None),
        closed: Set(false),
        closed_at: Set(None),
        recruiting: Set(false),
        recruiting_updated_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    add_manager(db, &created, account).await?;
    tracing::info!(path = %created.path, manager = %account.nickname, "study created");
    Ok(created)
}

async fn find_by_path<C: ConnectionTrait>(db: &C, path: &str) -> AppResult<Option<study::Model>> {
    Ok(study::Entity::find()
        .filter(study::Column::Path.eq(path))
        .one(db)
        .await?)
}

pub async fn get_study<C: ConnectionTrait>(db: &C, path: &str) -> AppResult<study::Model> {
    find_by_path(db, path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("There is no study at {path}.")))
}

pub async fn load_detail<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<StudyDetail> {
    let managers = study.find_linked(study::Managers).all(db).await?;
    let members = study.find_linked(study::Members).all(db).await?;
    let tags = study.find_related(tag::Entity).all(db).await?;
    let zones = study.find_related(zone::Entity).all(db).await?;

    Ok(StudyDetail {
        study,
        managers,
        members,
        tags,
        zones,
    })
}

pub async fn get_study_detail<C: ConnectionTrait>(db: &C, path: &str) -> AppResult<StudyDetail> {
    let study = get_study(db, path).await?;
    load_detail(db, study).await
}

/// Load a study for its settings pages; only managers may proceed.
pub async fn get_study_to_update<C: ConnectionTrait>(
    db: &C,
    account: &account::Model,
    path: &str,
) -> AppResult<StudyDetail> {
    let detail = get_study_detail(db, path).await?;
    if !detail.is_manager(&account.id) {
        tracing::warn!(path, account = %account.nickname, "settings access denied");
        return Err(AppError::AccessDenied(
            "You are not allowed to use this feature.".to_string(),
        ));
    }
    Ok(detail)
}

fn touch(study: study::Model) -> study::ActiveModel {
    let mut active: study::ActiveModel = study.into();
    active.updated_at = Set(now_ts());
    active
}

pub async fn update_study_description<C: ConnectionTrait>(
    db: &C,
    study: study::Model,
    form: &StudyDescriptionForm,
) -> AppResult<study::Model> {
    let mut active = touch(study);
    active.short_description = Set(form.short_description.clone());
    active.full_description = Set(form.full_description.clone());
    Ok(active.update(db).await?)
}

pub async fn update_study_image<C: ConnectionTrait>(
    db: &C,
    study: study::Model,
    image: Option<String>,
) -> AppResult<study::Model> {
    let mut active = touch(study);
    active.image = Set(image);
    Ok(active.update(db).await?)
}

pub async fn enable_banner<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<study::Model> {
    let mut active = touch(study);
    active.use_banner = Set(true);
    Ok(active.update(db).await?)
}

pub async fn disable_banner<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<study::Model> {
    let mut active = touch(study);
    active.use_banner = Set(false);
    Ok(active.update(db).await?)
}

pub async fn add_tag<C: ConnectionTrait>(db: &C, study: &study::Model, tag: &tag::Model) -> AppResult<()> {
    link(
        db,
        study_tag::ActiveModel {
            study_id: Set(study.id.clone()),
            tag_id: Set(tag.id.clone()),
        },
    )
    .await
}

pub async fn remove_tag<C: ConnectionTrait>(db: &C, study: &study::Model, tag: &tag::Model) -> AppResult<()> {
    study_tag::Entity::delete_many()
        .filter(study_tag::Column::StudyId.eq(study.id.as_str()))
        .filter(study_tag::Column::TagId.eq(tag.id.as_str()))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn add_zone<C: ConnectionTrait>(db: &C, study: &study::Model, zone: &zone::Model) -> AppResult<()> {
    link(
        db,
        study_zone::ActiveModel {
            study_id: Set(study.id.clone()),
            zone_id: Set(zone.id.clone()),
        },
    )
    .await
}

pub async fn remove_zone<C: ConnectionTrait>(db: &C, study: &study::Model, zone: &zone::Model) -> AppResult<()> {
    study_zone::Entity::delete_many()
        .filter(study_zone::Column::StudyId.eq(study.id.as_str()))
        .filter(study_zone::Column::ZoneId.eq(zone.id.as_str()))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn publish<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<study::Model> {
    if study.closed || study.published {
        return Err(AppError::InvalidState(
            "The study cannot be published: it is already published or closed.".to_string(),
        ));
    }

    let now = now_ts();
    let mut active = touch(study);
    active.published = Set(true);
    active.published_at = Set(Some(now));
    let published = active.update(db).await?;
    tracing::info!(path = %published.path, "study published");
    Ok(published)
}

/// Close a published study. Recruiting stops with it.
pub async fn close<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<study::Model> {
    if !study.published || study.closed {
        return Err(AppError::InvalidState(
            "The study cannot be closed: it is not published or already closed.".to_string(),
        ));
    }

    let now = now_ts();
    let mut active = touch(study);
    active.closed = Set(true);
    active.closed_at = Set(Some(now));
    active.recruiting = Set(false);
    let closed = active.update(db).await?;
    tracing::info!(path = %closed.path, "study closed");
    Ok(closed)
}

async fn set_recruiting<C: ConnectionTrait>(
    db: &C,
    study: study::Model,
    recruiting: bool,
) -> AppResult<study::Model> {
    let now = now_ts();
    if !study.can_update_recruiting(now) {
        tracing::warn!(path = %study.path, recruiting, "recruiting toggle refused");
        return Err(AppError::InvalidState(
            "Recruiting settings cannot change more than once an hour, and only on a published study."
                .to_string(),
        ));
    }

    let mut active = touch(study);
    active.recruiting = Set(recruiting);
    active.recruiting_updated_at = Set(Some(now));
    Ok(active.update(db).await?)
}

pub async fn start_recruit<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<study::Model> {
    set_recruiting(db, study, true).await
}

pub async fn stop_recruit<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<study::Model> {
    set_recruiting(db, study, false).await
}

pub async fn is_valid_path<C: ConnectionTrait>(db: &C, new_path: &str) -> AppResult<bool> {
    if !is_valid_study_path(new_path) {
        return Ok(false);
    }
    Ok(!path_taken(db, new_path).await?)
}

pub async fn update_path<C: ConnectionTrait>(
    db: &C,
    study: study::Model,
    new_path: &str,
) -> AppResult<study::Model> {
    let mut active = touch(study);
    active.path = Set(new_path.to_string());
    Ok(active.update(db).await?)
}

pub fn is_valid_title(new_title: &str) -> bool {
    !new_title.trim().is_empty() && new_title.chars().count() <= MAX_TITLE_LEN
}

pub async fn update_title<C: ConnectionTrait>(
    db: &C,
    study: study::Model,
    new_title: &str,
) -> AppResult<study::Model> {
    let mut active = touch(study);
    active.title = Set(new_title.trim().to_string());
    Ok(active.update(db).await?)
}

/// Delete a study that was never published, with its links.
pub async fn remove<C: ConnectionTrait>(db: &C, study: study::Model) -> AppResult<()> {
    if !study.is_removable() {
        return Err(AppError::InvalidState(
            "A study that has been published cannot be removed.".to_string(),
        ));
    }

    let id = study.id.clone();
    study_manager::Entity::delete_many()
        .filter(study_manager::Column::StudyId.eq(id.as_str()))
        .exec(db)
        .await?;
    study_member::Entity::delete_many()
        .filter(study_member::Column::StudyId.eq(id.as_str()))
        .exec(db)
        .await?;
    study_tag::Entity::delete_many()
        .filter(study_tag::Column::StudyId.eq(id.as_str()))
        .exec(db)
        .await?;
    study_zone::Entity::delete_many()
        .filter(study_zone::Column::StudyId.eq(id.as_str()))
        .exec(db)
        .await?;
    study.delete(db).await?;

    tracing::info!(study = %id, "study removed");
    Ok(())
}

async fn add_manager<C: ConnectionTrait>(
    db: &C,
    study: &study::Model,
    account: &account::Model,
) -> AppResult<()> {
    link(
        db,
        study_manager::ActiveModel {
            study_id: Set(study.id.clone()),
            account_id: Set(account.id.clone()),
        },
    )
    .await
}

/// Join a study. Only allowed while it is joinable for the account.
pub async fn add_member<C: ConnectionTrait>(
    db: &C,
    detail: &StudyDetail,
    account: &account::Model,
) -> AppResult<()> {
    if !detail.is_joinable(&account.id) {
        return Err(AppError::InvalidState(
            "This study is not accepting you as a new member.".to_string(),
        ));
    }

    link(
        db,
        study_member::ActiveModel {
            study_id: Set(detail.study.id.clone()),
            account_id: Set(account.id.clone()),
        },
    )
    .await?;
    tracing::info!(path = %detail.study.path, member = %account.nickname, "member joined");
    Ok(())
}

pub async fn remove_member<C: ConnectionTrait>(
    db: &C,
    detail: &StudyDetail,
    account: &account::Model,
) -> AppResult<()> {
    if !detail.is_member(&account.id) {
        return Err(AppError::InvalidState("You are not a member of this study.".to_string()));
    }

    study_member::Entity::delete_many()
        .filter(study_member::Column::StudyId.eq(detail.study.id.as_str()))
        .filter(study_member::Column::AccountId.eq(account.id.as_str()))
        .exec(db)
        .await?;
    tracing::info!(path = %detail.study.path, member = %account.nickname, "member left");
    Ok(())
}
