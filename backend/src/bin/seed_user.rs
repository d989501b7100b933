use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use backend::{auth::credentials::seed_user, config::config_loader};
use invoicing::{
    domain::value_objects::credentials::{Credentials, EMAIL_FIELD, PASSWORD_FIELD},
    infra::db::{postgres::postgres_connection, repositories::users::UserPostgres},
};
use tracing::error;

const USAGE: &str = "usage: seed_user <name> <email> <password>";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("seed_user failed: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    invoicing::observability::init_observability("seed_user")?;

    let mut args = std::env::args().skip(1);
    let name = args.next().context(USAGE)?;
    let email = args.next().context(USAGE)?;
    let password = args.next().context(USAGE)?;

    let credentials = Credentials::parse(&HashMap::from([
        (EMAIL_FIELD.to_string(), email),
        (PASSWORD_FIELD.to_string(), password),
    ]))
    .context("email must be valid and password at least 6 characters")?;

    let database_url = config_loader::database_url()?;
    let postgres_pool = postgres_connection::establish_connection(&database_url)?;
    let user_repository = UserPostgres::new(Arc::new(postgres_pool));

    seed_user(&user_repository, &name, credentials).await?;

    Ok(())
}
