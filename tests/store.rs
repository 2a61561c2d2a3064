mod common;

use chrono::NaiveDate;
use common::{at, test_db};
use impact_wrapped::{
    impact::fiscal::FiscalYear,
    store::{
        Identifier, StoreError,
        donors::{
            DonorInput, NewDonation, donations_for_donor, donor_history, find_donor,
            insert_donation, upsert_donor,
        },
        segments::{SegmentCriteria, segment_donors},
        volunteers::{find_volunteer, log_shift, shifts_for_volunteer},
    },
};
use sea_orm::EntityTrait;

fn donor(email: &str) -> DonorInput {
    DonorInput {
        email: email.to_string(),
        ..Default::default()
    }
}

fn gift(email: &str, amount: f64, timestamp: chrono::NaiveDateTime) -> NewDonation {
    NewDonation {
        email: email.to_string(),
        amount,
        timestamp,
        external_donation_id: None,
        imported: false,
    }
}

#[tokio::test]
async fn upserting_the_same_email_keeps_one_donor() {
    let db = test_db().await;

    let first = upsert_donor(
        &db,
        DonorInput {
            email: "Ada@Example.org".to_string(),
            first_name: Some("Ada".to_string()),
            ..Default::default()
        },
        true,
    )
    .await
    .unwrap();
    assert!(first.was_created());

    let second = upsert_donor(
        &db,
        DonorInput {
            email: " ada@example.org ".to_string(),
            last_name: Some("Lovelace".to_string()),
            first_name: Some("  ".to_string()),
            ..Default::default()
        },
        true,
    )
    .await
    .unwrap();
    assert!(!second.was_created());

    let donor = second.into_inner();
    assert_eq!(donor.email, "ada@example.org");
    assert_eq!(donor.first_name.as_deref(), Some("Ada"));
    assert_eq!(donor.last_name.as_deref(), Some("Lovelace"));
    assert!(donor.last_imported.is_some());

    let all = impact_wrapped::entities::prelude::Donor::find()
        .all(&db)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn invalid_emails_are_rejected() {
    let db = test_db().await;
    let err = upsert_donor(&db, donor("nobody"), false).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidEmail(_)));
}

#[tokio::test]
async fn donations_link_to_donor_by_email() {
    let db = test_db().await;
    let orphan = insert_donation(&db, gift("grace@example.org", 5.0, at(2024, 1, 1)))
        .await
        .unwrap();
    assert_eq!(orphan.donor_id, None);

    let ada = upsert_donor(&db, donor("ada@example.org"), false)
        .await
        .unwrap()
        .into_inner();
    let linked = insert_donation(&db, gift("ADA@example.org", 10.0, at(2024, 1, 1)))
        .await
        .unwrap();
    assert_eq!(linked.donor_id, Some(ada.id));
    assert_eq!(linked.email, "ada@example.org");
}

#[tokio::test]
async fn history_is_newest_first_with_fiscal_buckets() {
    let db = test_db().await;
    let ada = upsert_donor(&db, donor("ada@example.org"), false)
        .await
        .unwrap()
        .into_inner();
    for (amount, timestamp) in [
        (25.0, at(2024, 6, 30)),
        (50.0, at(2024, 7, 1)),
        (100.0, at(2025, 3, 1)),
        (10.0, at(2023, 12, 25)),
    ] {
        insert_donation(&db, gift("ada@example.org", amount, timestamp))
            .await
            .unwrap();
    }

    let donations = donations_for_donor(&db, ada.id).await.unwrap();
    let amounts: Vec<f64> = donations.iter().map(|d| d.amount).collect();
    assert_eq!(amounts, vec![100.0, 50.0, 25.0, 10.0]);

    let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let history = donor_history(&db, &Identifier::parse("ada@example.org"), today)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(history.total_donated, 185.0);
    assert_eq!(history.current_fiscal_year, FiscalYear(2025));
    assert_eq!(history.current_fiscal_year_total, 150.0);

    let buckets: Vec<(String, f64, usize)> = history
        .fiscal_years
        .iter()
        .map(|fy| (fy.label.clone(), fy.total, fy.count))
        .collect();
    assert_eq!(
        buckets,
        vec![
            ("FY2025".to_string(), 150.0, 2),
            ("FY2024".to_string(), 35.0, 2),
        ]
    );

    let context = history.context();
    assert_eq!(context.gift_count, 4);
    assert_eq!(context.lifetime_total, 185.0);
}

#[tokio::test]
async fn donors_are_found_by_id_email_or_external_id() {
    let db = test_db().await;
    let ada = upsert_donor(
        &db,
        DonorInput {
            email: "ada@example.org".to_string(),
            external_id: Some("90210".to_string()),
            ..Default::default()
        },
        false,
    )
    .await
    .unwrap()
    .into_inner();

    let by_id = find_donor(&db, &Identifier::Id(ada.id)).await.unwrap();
    assert_eq!(by_id.map(|d| d.id), Some(ada.id));

    let by_email = find_donor(&db, &Identifier::parse("ADA@example.org"))
        .await
        .unwrap();
    assert_eq!(by_email.map(|d| d.id), Some(ada.id));

    let by_external = find_donor(&db, &Identifier::parse("90210")).await.unwrap();
    assert_eq!(by_external.map(|d| d.id), Some(ada.id));

    let missing = donor_history(
        &db,
        &Identifier::parse("nobody@example.org"),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    )
    .await
    .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn segments_filter_by_total_count_and_fiscal_year() {
    let db = test_db().await;
    for email in ["ada@example.org", "grace@example.org", "kat@example.org"] {
        upsert_donor(&db, donor(email), false).await.unwrap();
    }
    for (email, amount, timestamp) in [
        ("ada@example.org", 500.0, at(2024, 8, 1)),
        ("ada@example.org", 600.0, at(2025, 2, 1)),
        ("grace@example.org", 2000.0, at(2023, 1, 1)),
        ("kat@example.org", 20.0, at(2024, 9, 1)),
    ] {
        insert_donation(&db, gift(email, amount, timestamp))
            .await
            .unwrap();
    }

    let major = segment_donors(
        &db,
        SegmentCriteria {
            name: "Major donors".to_string(),
            min_total: Some(1000.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let emails: Vec<&str> = major.donors.iter().map(|m| m.email.as_str()).collect();
    assert_eq!(emails, vec!["grace@example.org", "ada@example.org"]);
    assert_eq!(major.donor_count, 2);

    let repeat_this_year = segment_donors(
        &db,
        SegmentCriteria {
            name: "Repeat FY2025".to_string(),
            min_donations: Some(2),
            fiscal_year: Some(2025),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(repeat_this_year.donor_count, 1);
    assert_eq!(repeat_this_year.donors[0].email, "ada@example.org");
    assert_eq!(repeat_this_year.donors[0].total, 1100.0);

    let everyone = segment_donors(
        &db,
        SegmentCriteria {
            name: "All".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(everyone.donor_count, 3);
}

#[tokio::test]
async fn volunteer_shifts_create_the_volunteer_once() {
    let db = test_db().await;
    let (first, _) = log_shift(&db, "Sam@Example.org", 3.0, Some(at(2024, 5, 1)))
        .await
        .unwrap();
    let (second, latest) = log_shift(&db, "sam@example.org", 2.5, Some(at(2024, 6, 1)))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(latest.volunteer_id, Some(first.id));

    let found = find_volunteer(&db, &Identifier::parse("sam@example.org"))
        .await
        .unwrap()
        .unwrap();
    let shifts = shifts_for_volunteer(&db, found.id).await.unwrap();
    let hours: Vec<f64> = shifts.iter().map(|s| s.hours).collect();
    assert_eq!(hours, vec![2.5, 3.0]);

    assert!(
        find_volunteer(&db, &Identifier::Id(found.id + 1))
            .await
            .unwrap()
            .is_none()
    );
}
