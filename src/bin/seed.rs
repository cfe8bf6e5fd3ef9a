use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Parser;
use fake::{
    faker::{
        address::en::{BuildingNumber, CityName, StreetName},
        internet::en::SafeEmail,
        name::en::Name,
        phone_number::en::PhoneNumber,
    },
    Fake,
};
use rand::{seq::SliceRandom, Rng};

use gymdesk::{
    config::Settings,
    db,
    domain::{CreateMemberRequest, Plan},
    service::{seed_service::ensure_seed_data, ServiceContext},
};

/// Populate a gymdesk database with sample members.
#[derive(Parser, Debug)]
#[command(name = "seed", version)]
struct Args {
    /// Database to seed. Falls back to DATABASE_URL, then the configured database.
    #[arg(long)]
    database_url: Option<String>,

    /// Number of randomly generated members to add.
    #[arg(long, default_value_t = 0)]
    fake_members: usize,

    /// Delete every member before seeding.
    #[arg(long)]
    reset: bool,
}

const PAYMENT_METHODS: [&str; 3] = ["Cash", "Credit Card", "Bank Transfer"];

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn ymd(y: i32, m: u32, d: u32) -> anyhow::Result<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| anyhow::anyhow!("invalid date {}-{}-{}", y, m, d))?;
    Ok(midnight(date))
}

fn historical_members() -> anyhow::Result<Vec<CreateMemberRequest>> {
    Ok(vec![
        CreateMemberRequest {
            name: "John Doe".to_string(),
            age: 28,
            contact: "123-456-7890".to_string(),
            email: Some("john@example.com".to_string()),
            address: Some("123 Main St".to_string()),
            emergency_contact: Some("Jane Doe (987-654-3210)".to_string()),
            health_notes: Some("Allergic to peanuts".to_string()),
            plan_id: 2,
            payment_method: Some("Credit Card".to_string()),
            start_date: ymd(2024, 3, 1)?,
            expiry_date: ymd(2024, 6, 1)?,
        },
        CreateMemberRequest {
            name: "Jane Smith".to_string(),
            age: 30,
            contact: "987-654-3210".to_string(),
            email: Some("jane@example.com".to_string()),
            address: Some("456 Oak Ave".to_string()),
            emergency_contact: Some("John Smith (123-456-7890)".to_string()),
            health_notes: Some("None".to_string()),
            plan_id: 3,
            payment_method: Some("Bank Transfer".to_string()),
            start_date: ymd(2024, 1, 10)?,
            expiry_date: ymd(2025, 1, 10)?,
        },
    ])
}

fn fake_member<R: Rng>(rng: &mut R, plan: &Plan, today: NaiveDate) -> CreateMemberRequest {
    let start_date = midnight(today - Duration::days(rng.gen_range(0..365)));
    let address = format!(
        "{} {}, {}",
        BuildingNumber().fake_with_rng::<String, _>(rng),
        StreetName().fake_with_rng::<String, _>(rng),
        CityName().fake_with_rng::<String, _>(rng),
    );

    CreateMemberRequest {
        name: Name().fake_with_rng(rng),
        age: rng.gen_range(16..=70),
        contact: PhoneNumber().fake_with_rng(rng),
        email: Some(SafeEmail().fake_with_rng(rng)),
        address: Some(address),
        emergency_contact: None,
        health_notes: None,
        plan_id: plan.plan_id,
        payment_method: PAYMENT_METHODS.choose(rng).map(|m| m.to_string()),
        start_date,
        expiry_date: start_date + Duration::days(plan.duration_days),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let settings = Settings::new().unwrap_or_default();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| settings.database.url.clone());

    println!("Seeding {}", database_url);

    let db_pool = db::connect(&database_url, 1).await?;
    db::run_migrations(&db_pool).await?;
    let ctx = ServiceContext::new(db_pool);

    if args.reset {
        let removed = ctx.member_repo.delete_all().await?;
        println!("  removed {} existing members", removed);
    }

    let report = ensure_seed_data(&ctx, &settings.admin).await?;
    if report.plans_inserted > 0 {
        println!("  inserted {} plans", report.plans_inserted);
    }
    if report.admin_created {
        println!("  created admin '{}'", settings.admin.username);
    }

    if ctx.member_repo.count().await? == 0 {
        for request in historical_members()? {
            let member = ctx.member_service.add_member(request).await?;
            println!("  added {} ({})", member.name, member.id);
        }
    }

    if args.fake_members > 0 {
        let plans = ctx.plan_repo.list().await?;
        let today = Utc::now().date_naive();
        let mut rng = rand::thread_rng();

        for _ in 0..args.fake_members {
            let Some(plan) = plans.choose(&mut rng) else {
                anyhow::bail!("plan catalog is empty");
            };
            let request = fake_member(&mut rng, plan, today);
            ctx.member_service.add_member(request).await?;
        }
        println!("  added {} generated members", args.fake_members);
    }

    println!("Done: {} members in total", ctx.member_repo.count().await?);
    Ok(())
}
