pub mod constants;
pub mod error;
pub mod page;
pub mod prices;
pub mod startup;

pub use error::ErrorPage;
pub use page::{Page, PageWrapper};
pub use prices::PricesPage;
pub use startup::StartupPage;
