pub mod models;
pub mod pii;

pub use models::codes::{CodeEnum, OptionalServiceType, PackageType};
pub use models::customer::{Customer, CustomerId, CustomerOptionService, CustomerPackage, Prefecture};
pub use models::order::{OptionSelection, OrderValidationError, PackageCounts, UserOrder};
pub use pii::Masked;
