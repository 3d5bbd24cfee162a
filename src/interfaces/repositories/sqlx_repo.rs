use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxAssetRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxShareRepo {
    pub pool: PgPool,
}
