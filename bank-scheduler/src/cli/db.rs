use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DbConfig {
    #[serde(default)]
    pub pg_con: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            pg_con: String::new(),
            pool_size: default_pool_size(),
        }
    }
}

pub async fn init_pool(config: &DbConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect(&config.pg_con)
        .await?;
    Ok(pool)
}

fn default_pool_size() -> u32 {
    20
}
