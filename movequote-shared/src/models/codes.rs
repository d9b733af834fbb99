use serde::{Deserialize, Serialize};

/// A closed set of codes stored as integers in the database.
pub trait CodeEnum: Copy + Sized + 'static {
    /// Every variant, ordered by code
    const ALL: &'static [Self];

    fn code(self) -> i32;

    fn label(self) -> &'static str;

    fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }
}

/// Kinds of household items a customer can move
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageType {
    Box,
    Bed,
    Bicycle,
    WashingMachine,
}

impl CodeEnum for PackageType {
    const ALL: &'static [Self] = &[
        PackageType::Box,
        PackageType::Bed,
        PackageType::Bicycle,
        PackageType::WashingMachine,
    ];

    fn code(self) -> i32 {
        match self {
            PackageType::Box => 1,
            PackageType::Bed => 2,
            PackageType::Bicycle => 3,
            PackageType::WashingMachine => 4,
        }
    }

    fn label(self) -> &'static str {
        match self {
            PackageType::Box => "Cardboard box",
            PackageType::Bed => "Bed",
            PackageType::Bicycle => "Bicycle",
            PackageType::WashingMachine => "Washing machine",
        }
    }
}

/// Add-on services selectable next to the move itself
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionalServiceType {
    WashingMachineInstall,
    BoxCollect,
    NewLifeSet,
    FurnitureSetting,
    PublicFee,
}

impl CodeEnum for OptionalServiceType {
    const ALL: &'static [Self] = &[
        OptionalServiceType::WashingMachineInstall,
        OptionalServiceType::BoxCollect,
        OptionalServiceType::NewLifeSet,
        OptionalServiceType::FurnitureSetting,
        OptionalServiceType::PublicFee,
    ];

    fn code(self) -> i32 {
        match self {
            OptionalServiceType::WashingMachineInstall => 1,
            OptionalServiceType::BoxCollect => 2,
            OptionalServiceType::NewLifeSet => 3,
            OptionalServiceType::FurnitureSetting => 4,
            OptionalServiceType::PublicFee => 5,
        }
    }

    fn label(self) -> &'static str {
        match self {
            OptionalServiceType::WashingMachineInstall => "Washing machine installation",
            OptionalServiceType::BoxCollect => "Cardboard box collection",
            OptionalServiceType::NewLifeSet => "New life set",
            OptionalServiceType::FurnitureSetting => "Furniture arrangement",
            OptionalServiceType::PublicFee => "Utility contract service",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique_and_ordered() {
        let codes: Vec<i32> = OptionalServiceType::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);

        let codes: Vec<i32> = PackageType::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4]);

        let labels: HashSet<&str> = OptionalServiceType::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), OptionalServiceType::ALL.len());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(PackageType::from_code(3), Some(PackageType::Bicycle));
        assert_eq!(OptionalServiceType::from_code(5), Some(OptionalServiceType::PublicFee));
        assert_eq!(OptionalServiceType::from_code(0), None);
        assert_eq!(PackageType::from_code(5), None);
    }

    #[test]
    fn test_serialization_format() {
        let json = serde_json::to_string(&OptionalServiceType::WashingMachineInstall).unwrap();
        assert_eq!(json, "\"WASHING_MACHINE_INSTALL\"");
    }
}
