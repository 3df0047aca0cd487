use std::sync::Arc;

use crate::{
    db::{DbPool, OrmConn},
    gateways::GatewayRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub gateways: Arc<GatewayRegistry>,
}

impl AppState {
    pub fn new(orm: OrmConn, gateways: GatewayRegistry) -> Self {
        Self {
            pool: orm.get_postgres_connection_pool().clone(),
            orm,
            gateways: Arc::new(gateways),
        }
    }
}
