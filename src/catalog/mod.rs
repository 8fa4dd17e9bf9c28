//! Static test catalog: checklist items, systems, car roles, and train sets.
//!
//! Everything here is read-only process data; the rest of the crate borrows it.

mod data;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Number of train sets in the fleet (`TS01`..=`TS17`).
pub const TRAIN_SET_COUNT: u8 = 17;

/// Consist label printed on report headers.
pub const CONSIST: &str = "DMC1-TC1-MC1-MC2-TC2-DMC2";

/// Controlled document the checksheet is issued under.
pub const DOCUMENT_NUMBER: &str = "GR/TD/3434";

/// Revision of [`DOCUMENT_NUMBER`].
pub const DOCUMENT_REVISION: u32 = 0;

/// One checklist entry tied to a circuit and its expected behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestItem {
    pub id: u32,
    pub system: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub drawing: &'static str,
    pub expected: &'static str,
}

/// A functional grouping of test items and its checksheet section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemSection {
    pub name: &'static str,
    pub section: &'static str,
}

/// Systems in checksheet order.
pub const SYSTEMS: [SystemSection; 10] = [
    SystemSection {
        name: "Train System",
        section: "4.1",
    },
    SystemSection {
        name: "Interior & Lighting",
        section: "4.2",
    },
    SystemSection {
        name: "Gangway & Coupler",
        section: "4.3",
    },
    SystemSection {
        name: "Traction System",
        section: "4.4",
    },
    SystemSection {
        name: "Brake System",
        section: "4.5",
    },
    SystemSection {
        name: "Auxiliary Electric",
        section: "4.6",
    },
    SystemSection {
        name: "Door System",
        section: "4.7",
    },
    SystemSection {
        name: "Air Conditioning",
        section: "4.8",
    },
    SystemSection {
        name: "Train Management",
        section: "4.9",
    },
    SystemSection {
        name: "Communication Systems",
        section: "4.10",
    },
];

/// All checklist items in checksheet order.
#[must_use]
pub fn test_items() -> &'static [TestItem] {
    data::TEST_ITEMS
}

/// Look up an item by id.
#[must_use]
pub fn find_item(id: u32) -> Option<&'static TestItem> {
    data::TEST_ITEMS.iter().find(|item| item.id == id)
}

/// System names in checksheet order.
pub fn system_names() -> impl Iterator<Item = &'static str> {
    SYSTEMS.iter().map(|s| s.name)
}

/// Section number for a system name.
#[must_use]
pub fn section_of(system: &str) -> Option<&'static str> {
    SYSTEMS
        .iter()
        .find(|s| s.name == system)
        .map(|s| s.section)
}

/// Items grouped by system, in checksheet order; systems without items are skipped.
pub fn items_by_system() -> Vec<(&'static str, Vec<&'static TestItem>)> {
    system_names()
        .map(|system| {
            let items = test_items()
                .iter()
                .filter(|item| item.system == system)
                .collect::<Vec<_>>();
            (system, items)
        })
        .filter(|(_, items)| !items.is_empty())
        .collect()
}

/// Train-set identifiers offered to the operator.
pub fn train_set_ids() -> impl Iterator<Item = String> {
    (1..=TRAIN_SET_COUNT).map(|n| format!("TS{n:02}"))
}

/// Whether `id` is one of [`train_set_ids`].
#[must_use]
pub fn is_known_train_set(id: &str) -> bool {
    id.strip_prefix("TS")
        .filter(|digits| digits.len() == 2)
        .and_then(|digits| digits.parse::<u8>().ok())
        .is_some_and(|n| (1..=TRAIN_SET_COUNT).contains(&n))
}

/// Role family, decided by the car label prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarKind {
    /// Driving motor car.
    DrivingMotor,
    /// Trailer car.
    Trailer,
    /// Motor car.
    Motor,
}

impl CarKind {
    /// Systems exercised on this kind of car during the simulated sequence.
    #[must_use]
    pub fn tested_systems(self) -> &'static [&'static str] {
        match self {
            Self::DrivingMotor => &["Train System", "Interior & Lighting", "Door System"],
            Self::Trailer => &["Auxiliary Electric", "Air Conditioning"],
            Self::Motor => &["Traction System", "Brake System"],
        }
    }
}

/// The six car positions of a trainset, in coupling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarRole {
    Dmc1,
    Tc1,
    Mc1,
    Mc2,
    Tc2,
    Dmc2,
}

impl CarRole {
    /// Coupling order DMC1 → DMC2.
    pub const ALL: [Self; 6] = [
        Self::Dmc1,
        Self::Tc1,
        Self::Mc1,
        Self::Mc2,
        Self::Tc2,
        Self::Dmc2,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dmc1 => "DMC1",
            Self::Tc1 => "TC1",
            Self::Mc1 => "MC1",
            Self::Mc2 => "MC2",
            Self::Tc2 => "TC2",
            Self::Dmc2 => "DMC2",
        }
    }

    #[must_use]
    pub const fn kind(self) -> CarKind {
        match self {
            Self::Dmc1 | Self::Dmc2 => CarKind::DrivingMotor,
            Self::Tc1 | Self::Tc2 => CarKind::Trailer,
            Self::Mc1 | Self::Mc2 => CarKind::Motor,
        }
    }
}

impl fmt::Display for CarRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown car {s:?}; expected one of {CONSIST}"))
    }
}
