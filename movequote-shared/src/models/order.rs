use serde::{Deserialize, Serialize};

use crate::models::codes::{OptionalServiceType, PackageType};
use crate::pii::Masked;

/// A customer's relocation request as submitted from the quote form.
///
/// Contact fields are masked so that the request can be logged with `{:?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOrder {
    pub customer_name: Masked<String>,
    pub tel: Masked<String>,
    pub email: Masked<String>,
    pub old_prefecture_id: String,
    pub old_address: Masked<String>,
    pub new_prefecture_id: String,
    pub new_address: Masked<String>,
    pub move_month_id: i32,
    #[serde(flatten)]
    pub packages: PackageCounts,
    #[serde(flatten)]
    pub options: OptionSelection,
}

/// Item counts per package type
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageCounts {
    #[serde(rename = "box", default)]
    pub boxes: u32,
    #[serde(default)]
    pub bed: u32,
    #[serde(default)]
    pub bicycle: u32,
    #[serde(default)]
    pub washing_machine: u32,
}

impl PackageCounts {
    pub fn count_of(&self, package: PackageType) -> u32 {
        match package {
            PackageType::Box => self.boxes,
            PackageType::Bed => self.bed,
            PackageType::Bicycle => self.bicycle,
            PackageType::WashingMachine => self.washing_machine,
        }
    }
}

/// Optional service flags as ticked on the form
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionSelection {
    #[serde(default)]
    pub washing_machine_installation: bool,
    #[serde(default)]
    pub box_collect: bool,
    #[serde(default)]
    pub new_life_set: bool,
    #[serde(default)]
    pub furniture_setting: bool,
    #[serde(default)]
    pub public_fee: bool,
}

impl OptionSelection {
    /// Each flag maps to exactly one service.
    pub fn is_selected(&self, service: OptionalServiceType) -> bool {
        match service {
            OptionalServiceType::WashingMachineInstall => self.washing_machine_installation,
            OptionalServiceType::BoxCollect => self.box_collect,
            OptionalServiceType::NewLifeSet => self.new_life_set,
            OptionalServiceType::FurnitureSetting => self.furniture_setting,
            OptionalServiceType::PublicFee => self.public_fee,
        }
    }

    /// Selected services in code order
    pub fn selected(&self) -> impl Iterator<Item = OptionalServiceType> + '_ {
        use crate::models::codes::CodeEnum;
        OptionalServiceType::ALL
            .iter()
            .copied()
            .filter(move |s| self.is_selected(*s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("{0} must not be blank")]
    Blank(&'static str),
    #[error("move_month_id must be between 1 and 12, got {0}")]
    InvalidMonth(i32),
    #[error("invalid telephone number")]
    InvalidTel,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("{field} count {count} is out of range")]
    CountOutOfRange { field: &'static str, count: u32 },
}

impl UserOrder {
    /// Checks only the fields that feed the price: both prefecture ids,
    /// the move month and the item counts.
    pub fn validate_for_pricing(&self) -> Result<(), OrderValidationError> {
        let regions = [
            ("old_prefecture_id", self.old_prefecture_id.as_str()),
            ("new_prefecture_id", self.new_prefecture_id.as_str()),
        ];
        for (field, value) in regions {
            if value.trim().is_empty() {
                return Err(OrderValidationError::Blank(field));
            }
        }

        if !(1..=12).contains(&self.move_month_id) {
            return Err(OrderValidationError::InvalidMonth(self.move_month_id));
        }

        let counts = [
            ("box", self.packages.boxes),
            ("bed", self.packages.bed),
            ("bicycle", self.packages.bicycle),
            ("washing_machine", self.packages.washing_machine),
        ];
        for (field, count) in counts {
            if i32::try_from(count).is_err() {
                return Err(OrderValidationError::CountOutOfRange { field, count });
            }
        }

        Ok(())
    }

    /// Full check before an order is stored: the pricing fields plus the
    /// customer's contact details.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        let required = [
            ("customer_name", self.customer_name.expose().as_str()),
            ("tel", self.tel.expose().as_str()),
            ("email", self.email.expose().as_str()),
            ("old_address", self.old_address.expose().as_str()),
            ("new_address", self.new_address.expose().as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(OrderValidationError::Blank(field));
            }
        }

        self.validate_for_pricing()?;

        if !is_phone_number(self.tel.expose()) {
            return Err(OrderValidationError::InvalidTel);
        }

        match self.email.expose().split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(OrderValidationError::InvalidEmail),
        }

        Ok(())
    }
}

/// Digits with the usual separators: `090-1234-5678`, `(03) 1234 5678`, `+81 3 1234 5678`.
fn is_phone_number(tel: &str) -> bool {
    tel.chars().any(|c| c.is_ascii_digit())
        && tel
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | ' ' | '(' | ')'))
}
