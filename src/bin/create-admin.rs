/// Create a back-office admin, or reset the password of an existing one.
///
/// Usage: create-admin --email EMAIL --password PASSWORD [--first-name NAME] [--last-name NAME]
use clap::Parser;

use lounge_menu_api::{db, services::auth::AuthService};

#[derive(Parser)]
#[command(name = "create-admin", about = "Create or reset a lounge menu admin account")]
struct Args {
    #[arg(long)]
    email: String,

    /// At least 8 characters
    #[arg(long, env = "ADMIN_PASSWORD")]
    password: String,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let admin = AuthService::upsert_admin(
        &pool,
        &args.email,
        &args.password,
        args.first_name.as_deref(),
        args.last_name.as_deref(),
    )
    .await?;

    tracing::info!(admin_id = %admin.id, email = %admin.email, "admin account ready");
    Ok(())
}
