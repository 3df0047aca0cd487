use booking_payments_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::auth::Claims,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use uuid::Uuid;

const DEMO_TENANT: Uuid = Uuid::from_u128(0x7e4a_0001_0000_4000_8000_0000_0000_0001);
const DEMO_BUSINESS: Uuid = Uuid::from_u128(0x7e4a_0002_0000_4000_8000_0000_0000_0001);
const DEMO_CUSTOMER: Uuid = Uuid::from_u128(0x7e4a_0003_0000_4000_8000_0000_0000_0001);
const DEMO_OWNER: Uuid = Uuid::from_u128(0x7e4a_0003_0000_4000_8000_0000_0000_0002);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let pool = orm.get_postgres_connection_pool();

    seed_items(pool).await?;
    seed_cash_config(pool).await?;

    println!("Seed completed. Tenant ID: {DEMO_TENANT}, Business ID: {DEMO_BUSINESS}");

    if let Ok(secret) = std::env::var("JWT_SECRET") {
        let customer = demo_token(&secret, DEMO_CUSTOMER, "customer", None)?;
        let owner = demo_token(&secret, DEMO_OWNER, "admin", Some(DEMO_BUSINESS))?;
        println!("Customer token: {customer}");
        println!("Business admin token: {owner}");
    }
    Ok(())
}

async fn seed_items(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let items = vec![
        (1_u128, "Ferris Mug", "product", Decimal::new(1200, 2), None),
        (2, "Async Rust Workshop", "event", Decimal::new(4999, 2), Some(30)),
        (3, "Code Review Session", "service", Decimal::new(10000, 2), Some(5)),
        (4, "Conference Pass", "event", Decimal::new(25000, 2), None),
    ];

    for (n, name, kind, price, capacity) in items {
        sqlx::query(
            r#"
            INSERT INTO items (id, tenant_id, business_id, name, kind, price, currency, capacity)
            VALUES ($1, $2, $3, $4, $5, $6, 'USD', $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::from_u128(0x7e4a_0004_0000_4000_8000_0000_0000_0000 + n))
        .bind(DEMO_TENANT)
        .bind(DEMO_BUSINESS)
        .bind(name)
        .bind(kind)
        .bind(price)
        .bind(capacity)
        .execute(pool)
        .await?;
    }

    println!("Seeded items");
    Ok(())
}

async fn seed_cash_config(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tenant_payment_configs (id, tenant_id, provider_code, enabled, config)
        VALUES ($1, $2, 'CASH', TRUE, $3)
        ON CONFLICT (tenant_id, provider_code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(DEMO_TENANT)
    .bind(serde_json::json!({ "instructions": "Pay at the front desk" }))
    .execute(pool)
    .await?;

    println!("Enabled cash payments for the demo tenant");
    Ok(())
}

fn demo_token(
    secret: &str,
    user_id: Uuid,
    role: &str,
    business_id: Option<Uuid>,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        tenant_id: DEMO_TENANT,
        business_id,
        exp: (chrono::Utc::now().timestamp() + 24 * 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
