mod campaign;
mod contribution;
mod credit;
mod notification;
mod rate;
mod report;
mod ticket;
mod transaction;
mod user;
mod volunteer;
mod webhooks;
pub use campaign::*;
pub use contribution::*;
pub use credit::*;
pub use notification::*;
pub use rate::*;
pub use report::*;
pub use ticket::*;
pub use transaction::*;
pub use user::*;
pub use volunteer::*;
pub use webhooks::*;

use crate::config::Config;
use crate::conversion_service::ConversionService;
use crate::payments::PayMongoClient;
use crate::storage::{
    CampaignStorage, ContributionStorage, CreditStorage, NotificationStorage, RateStorage,
    ReportStorage, TicketStorage, TransactionStorage, UserStorage, VolunteerStorage,
};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStorage,
    pub campaigns: CampaignStorage,
    pub contributions: ContributionStorage,
    pub transactions: TransactionStorage,
    pub volunteers: VolunteerStorage,
    pub tickets: TicketStorage,
    pub notifications: NotificationStorage,
    pub reports: ReportStorage,
    pub credit: CreditStorage,
    pub conversions: ConversionService,
    pub payments: PayMongoClient,
    pub webhook_secret: String,
}

impl AppState {
    pub fn new(pool: sqlx::PgPool, config: &Config) -> Self {
        Self {
            users: UserStorage::new(pool.clone()),
            campaigns: CampaignStorage::new(pool.clone()),
            contributions: ContributionStorage::new(pool.clone()),
            transactions: TransactionStorage::new(pool.clone()),
            volunteers: VolunteerStorage::new(pool.clone()),
            tickets: TicketStorage::new(pool.clone()),
            notifications: NotificationStorage::new(pool.clone()),
            reports: ReportStorage::new(pool.clone()),
            credit: CreditStorage::new(pool.clone()),
            conversions: ConversionService::new(RateStorage::new(pool.clone())),
            payments: PayMongoClient::new(&config.paymongo_base_url, &config.paymongo_secret_key),
            webhook_secret: config.webhook_secret.clone(),
        }
    }
}
