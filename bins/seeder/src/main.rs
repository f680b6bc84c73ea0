//! Demo data seeder for JobLedger development.
//!
//! Creates a contractor with a login, a small catalog, one project with
//! priced entries and a payment, and a draft estimate. Running it again is a
//! no-op once the demo login exists.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use jobledger_core::auth::hash_password;
use jobledger_core::billing::{Margin, MaterialUsage, Rates};
use jobledger_db::{
    CatalogRepository, ContractorRepository, EntryRepository, EstimateRepository,
    ProjectRepository, UserRepository,
    repositories::{
        CreateContractorInput, EntryInput, EstimateInput, MaterialInput, PaymentInput,
        ProjectInput, RateSourceInput,
    },
};
use jobledger_shared::AppConfig;

const DEMO_EMAIL: &str = "demo@jobledger.dev";
const DEMO_PASSWORD: &str = "jobledger-demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    println!("Connecting to database...");
    let db = jobledger_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let users = UserRepository::new(db.clone());
    if users.email_exists(DEMO_EMAIL).await? {
        println!("  Demo login already exists, skipping...");
        return Ok(());
    }

    println!("Seeding contractor...");
    let contractor = ContractorRepository::new(db.clone())
        .create(CreateContractorInput {
            name: "Demo Excavation LLC".to_string(),
            email: "office@jobledger.dev".to_string(),
            phone: Some("555-0100".to_string()),
            material_margin: Margin::new(dec!(20))?,
        })
        .await?;
    let password_hash = hash_password(DEMO_PASSWORD)?;
    users.create(contractor.id, DEMO_EMAIL, &password_hash).await?;
    println!("  Login: {DEMO_EMAIL} / {DEMO_PASSWORD}");

    println!("Seeding catalog...");
    let catalog = Catalog::seed(&CatalogRepository::new(db.clone()), contractor.id).await?;

    println!("Seeding project...");
    seed_project(&db, contractor.id, &catalog).await?;

    println!("Seeding estimate...");
    seed_estimate(&db, contractor.id, &catalog).await?;

    println!("Seeding complete!");
    Ok(())
}

struct Catalog {
    excavator: Uuid,
    operator: Uuid,
    gravel: Uuid,
}

impl Catalog {
    async fn seed(repo: &CatalogRepository, contractor_id: Uuid) -> anyhow::Result<Self> {
        let excavator = repo
            .create_asset(contractor_id, rate_source("Mini Excavator", dec!(45), dec!(95))?)
            .await?;
        repo.create_asset(contractor_id, rate_source("Dump Truck", dec!(60), dec!(110))?)
            .await?;

        let operator = repo
            .create_employee(contractor_id, rate_source("Sam Ortiz", dec!(32), dec!(65))?)
            .await?;
        repo.create_employee(contractor_id, rate_source("Lee Park", dec!(25), dec!(50))?)
            .await?;

        let gravel = repo
            .create_material(contractor_id, material("Crushed gravel", "ton", dec!(28), None)?)
            .await?;
        repo.create_material(contractor_id, material("Topsoil", "yd", dec!(22), Some(dec!(30)))?)
            .await?;
        repo.create_material(contractor_id, material("Filter fabric", "roll", dec!(85), None)?)
            .await?;

        Ok(Self {
            excavator: excavator.id,
            operator: operator.id,
            gravel: gravel.id,
        })
    }
}

fn rate_source(name: &str, cost: Decimal, billable: Decimal) -> anyhow::Result<RateSourceInput> {
    Ok(RateSourceInput {
        name: name.to_string(),
        rates: Rates::new(cost, billable)?,
    })
}

fn material(
    description: &str,
    unit: &str,
    cost: Decimal,
    markup: Option<Decimal>,
) -> anyhow::Result<MaterialInput> {
    Ok(MaterialInput {
        description: description.to_string(),
        unit: unit.to_string(),
        pricing: MaterialUsage::new(cost, markup)?,
    })
}

async fn seed_project(
    db: &sea_orm::DatabaseConnection,
    contractor_id: Uuid,
    catalog: &Catalog,
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let start = today - Duration::days(6);

    let project = ProjectRepository::new(db.clone())
        .create(
            contractor_id,
            ProjectInput {
                name: "Miller Driveway".to_string(),
                start_date: start,
                end_date: None,
            },
        )
        .await?;

    let entries = EntryRepository::new(db.clone());
    for day in 0..3 {
        entries
            .create_job_entry(
                contractor_id,
                project.id,
                start + Duration::days(day),
                EntryInput {
                    hours: dec!(8),
                    asset_id: Some(catalog.excavator),
                    employee_id: Some(catalog.operator),
                    description: "Excavate and grade driveway base".to_string(),
                    ..EntryInput::default()
                },
            )
            .await?;
    }
    entries
        .create_job_entry(
            contractor_id,
            project.id,
            start + Duration::days(2),
            EntryInput {
                hours: dec!(14),
                material_id: Some(catalog.gravel),
                description: "Gravel base delivered".to_string(),
                ..EntryInput::default()
            },
        )
        .await?;

    ProjectRepository::new(db.clone())
        .add_payment(
            contractor_id,
            project.id,
            PaymentInput {
                amount: dec!(1500),
                date: today,
                notes: "Deposit, check 1042".to_string(),
            },
        )
        .await?;

    println!("  Created project: {}", project.name);
    Ok(())
}

async fn seed_estimate(
    db: &sea_orm::DatabaseConnection,
    contractor_id: Uuid,
    catalog: &Catalog,
) -> anyhow::Result<()> {
    let estimate = EstimateRepository::new(db.clone())
        .create(
            contractor_id,
            EstimateInput {
                name: "Patel Backyard Drainage".to_string(),
                customer_name: "Priya Patel".to_string(),
                customer_email: "priya@example.com".to_string(),
                notes: "Price holds for 30 days.".to_string(),
            },
        )
        .await?;

    let entries = EntryRepository::new(db.clone());
    entries
        .create_estimate_entry(
            contractor_id,
            estimate.id,
            EntryInput {
                hours: dec!(12),
                asset_id: Some(catalog.excavator),
                employee_id: Some(catalog.operator),
                description: "Trench for french drain".to_string(),
                ..EntryInput::default()
            },
        )
        .await?;
    entries
        .create_estimate_entry(
            contractor_id,
            estimate.id,
            EntryInput {
                hours: dec!(6),
                material_id: Some(catalog.gravel),
                description: "Drain rock".to_string(),
                ..EntryInput::default()
            },
        )
        .await?;

    println!("  Created estimate: {}", estimate.name);
    Ok(())
}
