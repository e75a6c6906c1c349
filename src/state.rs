use std::sync::Arc;

use crate::{config::AppConfig, db::OrmConn, payments::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub payments: Arc<dyn PaymentGateway>,
}
