//! Inserts a handful of demo donors with donations spread over two fiscal years.

use chrono::NaiveDate;
use impact_wrapped::{
    config::Config,
    database::setup_database,
    store::donors::{
        DonorInput, NewDonation, find_donation_by_external_id, insert_donation, upsert_donor,
    },
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DONORS: &[(&str, &str, &str)] = &[
    ("test.donor1@example.org", "Ada", "Lovelace"),
    ("test.donor2@example.org", "Grace", "Hopper"),
    ("test.donor3@example.org", "Katherine", "Johnson"),
];

const DONATIONS: &[(&str, f64, (i32, u32, u32), &str)] = &[
    ("test.donor1@example.org", 100.0, (2024, 3, 15), "SEED-1"),
    ("test.donor1@example.org", 250.0, (2024, 9, 1), "SEED-2"),
    ("test.donor1@example.org", 50.0, (2025, 1, 20), "SEED-3"),
    ("test.donor2@example.org", 1000.0, (2024, 12, 31), "SEED-4"),
    ("test.donor3@example.org", 25.0, (2024, 6, 30), "SEED-5"),
    ("test.donor3@example.org", 25.0, (2024, 7, 1), "SEED-6"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = setup_database(&config.database_url).await?;

    for (email, first_name, last_name) in DONORS {
        let donor = upsert_donor(
            &db,
            DonorInput {
                email: email.to_string(),
                first_name: Some(first_name.to_string()),
                last_name: Some(last_name.to_string()),
                ..Default::default()
            },
            false,
        )
        .await?
        .into_inner();
        info!("Seeded donor {} ({})", donor.id, donor.email);
    }

    let mut created = 0;
    for (email, amount, (year, month, day), external_id) in DONATIONS {
        if find_donation_by_external_id(&db, external_id)
            .await?
            .is_some()
        {
            continue;
        }
        let timestamp = NaiveDate::from_ymd_opt(*year, *month, *day)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .ok_or_else(|| anyhow::anyhow!("invalid seed date {year}-{month}-{day}"))?;
        insert_donation(
            &db,
            NewDonation {
                email: email.to_string(),
                amount: *amount,
                timestamp,
                external_donation_id: Some(external_id.to_string()),
                imported: false,
            },
        )
        .await?;
        created += 1;
    }

    println!(
        "Seeded {} donors and {} new donations",
        DONORS.len(),
        created
    );
    Ok(())
}
