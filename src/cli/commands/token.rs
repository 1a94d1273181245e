use anyhow::Context;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::User;
use crate::database::{self, DatabaseError, UserStore};

/// How the token subject is named on the command line
#[derive(Debug, Clone)]
pub enum UserRef {
    Id(Uuid),
    Login(String),
}

impl std::fmt::Display for UserRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRef::Id(id) => write!(f, "{}", id),
            UserRef::Login(login) => write!(f, "'{}'", login),
        }
    }
}

pub async fn find_user<S: UserStore + ?Sized>(store: &S, user: &UserRef) -> Result<Option<User>, DatabaseError> {
    match user {
        UserRef::Id(id) => store.find_user(*id).await,
        UserRef::Login(login) => store.find_user_by_login(login).await,
    }
}

/// Mint a token for a user that already exists in the store
pub async fn handle(user_ref: UserRef, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let store = database::open_store(&config.database).await?;

    let user = find_user(store.as_ref(), &user_ref)
        .await?
        .with_context(|| format!("user {} not found", user_ref))?;
    let actor = user
        .to_actor()
        .with_context(|| format!("user {} has unknown role '{}'", user_ref, user.role))?;

    let token = generate_jwt(&Claims::new(actor.id, actor.role))?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "success": true,
                "data": {
                    "token": token,
                    "user_id": actor.id,
                    "role": actor.role,
                    "expires_in_hours": config.security.jwt_expiry_hours
                }
            })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
