use crate::{
    auth::AuthService,
    config::{AdminConfig, DEFAULT_ADMIN_PASSWORD},
    domain::{default_plans, CreateAdminRequest},
    error::Result,
    service::ServiceContext,
};

/// What [`ensure_seed_data`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub plans_inserted: usize,
    pub admin_created: bool,
}

/// Inserts the plan catalog and the default admin, each only when its table is empty.
pub async fn ensure_seed_data(ctx: &ServiceContext, admin: &AdminConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if ctx.plan_repo.count().await? == 0 {
        for plan in default_plans() {
            ctx.plan_repo.insert(&plan).await?;
            report.plans_inserted += 1;
        }
        tracing::info!("Seeded {} membership plans", report.plans_inserted);
    }

    if ctx.admin_repo.count().await? == 0 {
        let password_hash = AuthService::hash_password(&admin.password).await?;
        ctx.admin_repo
            .create(CreateAdminRequest {
                username: admin.username.clone(),
                password_hash,
                full_name: admin.full_name.clone(),
            })
            .await?;
        report.admin_created = true;

        if admin.password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!(
                "Seeded admin '{}' with the built-in default password; change it before exposing this server",
                admin.username
            );
        } else {
            tracing::info!("Seeded admin '{}'", admin.username);
        }
    }

    Ok(report)
}
