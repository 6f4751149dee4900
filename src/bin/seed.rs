use anyhow::Context;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use unitedpackers_api::{
    db::{OrmConn, create_orm_conn, run_migrations},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Role},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,unitedpackers_api=debug".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "Admin", "admin@unitedpackers.example", "admin123", Role::Admin).await?;
    let user_id = ensure_user(&orm, "Demo Customer", "user@unitedpackers.example", "user1234", Role::User).await?;

    tracing::info!(%admin_id, %user_id, "seed completed");
    Ok(())
}

/// Creates the account, or resets its role and password if the email exists.
async fn ensure_user(
    orm: &OrmConn,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let existing = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?;

    let user = match existing {
        Some(user) => {
            let mut active: UserActive = user.into();
            active.role = Set(role);
            active.password_hash = Set(password_hash);
            active.update(orm).await?
        }
        None => {
            UserActive {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                email: Set(email.to_string()),
                phone: Set(None),
                password_hash: Set(password_hash),
                role: Set(role),
                created_at: NotSet,
            }
            .insert(orm)
            .await?
        }
    };

    Ok(user.id)
}
