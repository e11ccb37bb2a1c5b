//! Storage checks that need a live Postgres. Point DATABASE_URL at a
//! disposable database to run them; without a reachable database every test
//! returns early.

use anyhow::Result;
use rust_decimal_macros::dec;
use uuid::Uuid;
use verifund_api::models::{Currency, NewUser};
use verifund_api::storage::{CreditStorage, RateStorage, UserStorage};

async fn connect() -> Result<Option<sqlx::PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };
    let Ok(pool) = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
    else {
        return Ok(None);
    };
    sqlx::migrate!().run(&pool).await?;
    Ok(Some(pool))
}

#[tokio::test]
async fn set_rate_keeps_one_active_row_per_pair() -> Result<()> {
    let Some(pool) = connect().await? else {
        return Ok(());
    };
    let rates = RateStorage::new(pool.clone());
    rates
        .set_rate(Currency::Php, Currency::Puso, dec!(1.25), "treasury")
        .await?;
    rates
        .set_rate(Currency::Php, Currency::Puso, dec!(1.30), "treasury")
        .await?;

    let (active,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM exchange_rates
         WHERE from_currency = 'PHP' AND to_currency = 'PUSO' AND is_active",
    )
    .fetch_one(&pool)
    .await?;
    assert_eq!(active, 1);

    let current = rates
        .get_active(Currency::Php, Currency::Puso)
        .await?
        .expect("pair was just set");
    assert_eq!(current.rate, dec!(1.30));
    assert_eq!(current.source, "treasury");

    // put the seeded peg back for anything else using this database
    rates
        .set_rate(Currency::Php, Currency::Puso, dec!(1.0), "default")
        .await?;
    Ok(())
}

#[tokio::test]
async fn concurrent_credit_bumps_both_count() -> Result<()> {
    let Some(pool) = connect().await? else {
        return Ok(());
    };
    let users = UserStorage::new(pool.clone());
    let creator = users
        .create(NewUser {
            email: format!("creator-{}@verifund.ph", Uuid::new_v4()),
            display_name: "Credit Creator".to_string(),
        })
        .await?;

    let credit = CreditStorage::new(pool.clone());
    // Two completions racing to create the user's first credit row.
    let (first, second) = tokio::join!(
        credit.record_completion(creator.id),
        credit.record_completion(creator.id)
    );
    first?;
    second?;

    let score = credit.get(creator.id).await?;
    assert_eq!(score.campaigns_completed, 2);
    assert_eq!(score.score, 66);
    assert_eq!(score.rating, "Fair");

    let after_report = credit.record_report(creator.id).await?;
    assert_eq!(after_report.campaigns_completed, 2);
    assert_eq!(after_report.reports_submitted, 1);
    assert_eq!(after_report.score, 69);
    Ok(())
}
