mod campaigns;
mod contributions;
mod credit;
mod notifications;
mod rates;
mod reports;
mod tickets;
mod transactions;
mod users;
mod volunteers;

pub use campaigns::{CampaignFilter, CampaignStorage};
pub use contributions::{ContributionOutcome, ContributionStorage, TipOutcome};
pub use credit::CreditStorage;
pub use notifications::NotificationStorage;
pub use rates::RateStorage;
pub use reports::ReportStorage;
pub use tickets::TicketStorage;
pub use transactions::TransactionStorage;
pub use users::UserStorage;
pub use volunteers::VolunteerStorage;
