use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::prelude::*;

// SHA-256 of "123456".
const DEMO_PASSWORD_DIGEST: &str =
    "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92";

const DEMO_CUSTOMERS: [(&str, &str, &str); 3] = [
    ("3958dc9e-712f-4377-85e9-fec4b6a6442a", "Delba de Oliveira", "delba@oliveira.com"),
    ("3958dc9e-742f-4377-85e9-fec4b6a6442a", "Lee Robinson", "lee@robinson.com"),
    ("3958dc9e-737f-4377-85e9-fec4b6a6442a", "Hector Simpson", "hector@simpson.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./invoices.db?mode=rwc".to_string());

    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => {
            migration::Migrator::status(&db).await?;
        }
        "seed" => {
            migration::Migrator::up(&db, None).await?;
            seed(&db).await?;
        }
        _ => {
            eprintln!("Usage: cargo run -p migration -- [up|down|fresh|status|seed]");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Insert a demo user (`user@nextmail.com` / `123456`) and a few customers.
async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT OR IGNORE INTO users (email, name, password) VALUES (?, ?, ?)",
        vec![
            "user@nextmail.com".into(),
            "User".into(),
            DEMO_PASSWORD_DIGEST.into(),
        ],
    ))
    .await?;

    for (id, name, email) in DEMO_CUSTOMERS {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT OR IGNORE INTO customers (id, name, email) VALUES (?, ?, ?)",
            vec![id.into(), name.into(), email.into()],
        ))
        .await?;
    }

    Ok(())
}
