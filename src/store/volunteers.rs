use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use tracing::debug;

use super::{
    Identifier, StoreError,
    donors::{DonorInput, Upserted},
    non_empty, normalize_email,
};
use crate::entities::{prelude::*, volunteer, volunteer_shift};

pub async fn find_volunteer_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<volunteer::Model>, StoreError> {
    Ok(Volunteer::find()
        .filter(volunteer::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?)
}

pub async fn find_volunteer(
    db: &DatabaseConnection,
    identifier: &Identifier,
) -> Result<Option<volunteer::Model>, StoreError> {
    match identifier {
        Identifier::Id(id) => Ok(Volunteer::find_by_id(*id).one(db).await?),
        Identifier::Email(email) => find_volunteer_by_email(db, email).await,
    }
}

/// Volunteers share the donor contact shape; the external id is ignored.
pub async fn upsert_volunteer(
    db: &DatabaseConnection,
    input: DonorInput,
) -> Result<Upserted<volunteer::Model>, StoreError> {
    let email = normalize_email(&input.email)?;
    let now = Utc::now().naive_utc();
    let first_name = non_empty(input.first_name);
    let last_name = non_empty(input.last_name);
    let phone = non_empty(input.phone);

    match find_volunteer_by_email(db, &email).await? {
        Some(existing) => {
            let mut model: volunteer::ActiveModel = existing.into();
            if first_name.is_some() {
                model.first_name = Set(first_name);
            }
            if last_name.is_some() {
                model.last_name = Set(last_name);
            }
            if phone.is_some() {
                model.phone = Set(phone);
            }
            model.updated_at = Set(now);
            Ok(Upserted::Updated(model.update(db).await?))
        }
        None => {
            let model = volunteer::ActiveModel {
                email: Set(email),
                first_name: Set(first_name),
                last_name: Set(last_name),
                phone: Set(phone),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let created = model.insert(db).await?;
            debug!("Created volunteer {} ({})", created.id, created.email);
            Ok(Upserted::Created(created))
        }
    }
}

/// Records a shift, creating the volunteer on their first one.
pub async fn log_shift(
    db: &DatabaseConnection,
    email: &str,
    hours: f64,
    shift_date: Option<NaiveDateTime>,
) -> Result<(volunteer::Model, volunteer_shift::Model), StoreError> {
    let volunteer = upsert_volunteer(
        db,
        DonorInput {
            email: email.to_string(),
            ..Default::default()
        },
    )
    .await?
    .into_inner();

    let now = Utc::now().naive_utc();
    let shift = volunteer_shift::ActiveModel {
        hours: Set(hours),
        shift_date: Set(shift_date.unwrap_or(now)),
        email: Set(volunteer.email.clone()),
        volunteer_id: Set(Some(volunteer.id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(
        "Logged {} hours for volunteer {} (shift {})",
        shift.hours, volunteer.id, shift.id
    );
    Ok((volunteer, shift))
}

/// Shifts for one volunteer, newest first.
pub async fn shifts_for_volunteer(
    db: &DatabaseConnection,
    volunteer_id: i32,
) -> Result<Vec<volunteer_shift::Model>, StoreError> {
    Ok(VolunteerShift::find()
        .filter(volunteer_shift::Column::VolunteerId.eq(volunteer_id))
        .order_by_desc(volunteer_shift::Column::ShiftDate)
        .order_by_desc(volunteer_shift::Column::Id)
        .all(db)
        .await?)
}
