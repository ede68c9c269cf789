//! Wavelength unit catalog.
//!
//! Conversion is done through `uom` length quantities so every unit shares
//! the same SI base; titles come from the `uom` long names.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;
use uom::si::length::{angstrom, centimeter, meter, micrometer, millimeter, nanometer};
use uom::si::Unit;

use crate::error::Error;

/// Wavelength units supported by the spectral axis controls.
///
/// Ordered by metric scale, from meter down to sub-nanometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WavelengthUnit {
    #[default]
    Meter,
    Centimeter,
    Millimeter,
    Micrometer,
    Nanometer,
    Angstrom,
}

impl WavelengthUnit {
    /// Catalog order used to populate unit selectors.
    pub const ALL: [WavelengthUnit; 6] = [
        WavelengthUnit::Meter,
        WavelengthUnit::Centimeter,
        WavelengthUnit::Millimeter,
        WavelengthUnit::Micrometer,
        WavelengthUnit::Nanometer,
        WavelengthUnit::Angstrom,
    ];

    /// Canonical long (singular) name of the unit.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            Self::Meter => <meter as Unit>::singular(),
            Self::Centimeter => <centimeter as Unit>::singular(),
            Self::Millimeter => <millimeter as Unit>::singular(),
            Self::Micrometer => <micrometer as Unit>::singular(),
            Self::Nanometer => <nanometer as Unit>::singular(),
            Self::Angstrom => <angstrom as Unit>::singular(),
        }
    }

    /// Unit symbol, e.g. `nm`.
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Meter => <meter as Unit>::abbreviation(),
            Self::Centimeter => <centimeter as Unit>::abbreviation(),
            Self::Millimeter => <millimeter as Unit>::abbreviation(),
            Self::Micrometer => <micrometer as Unit>::abbreviation(),
            Self::Nanometer => <nanometer as Unit>::abbreviation(),
            Self::Angstrom => <angstrom as Unit>::abbreviation(),
        }
    }

    /// Human-readable title: the long name, title-cased and folded to
    /// ASCII, so the angstrom is titled `Angstrom` rather than `Ångström`.
    #[must_use]
    pub fn title(self) -> String {
        title_case(&fold_ascii(self.long_name()))
    }

    /// Look up a unit by its title.
    #[must_use]
    pub fn from_title(title: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.title() == title)
    }

    /// Wrap a value expressed in this unit as a length quantity.
    #[must_use]
    pub fn to_length(self, value: f64) -> Length {
        match self {
            Self::Meter => Length::new::<meter>(value),
            Self::Centimeter => Length::new::<centimeter>(value),
            Self::Millimeter => Length::new::<millimeter>(value),
            Self::Micrometer => Length::new::<micrometer>(value),
            Self::Nanometer => Length::new::<nanometer>(value),
            Self::Angstrom => Length::new::<angstrom>(value),
        }
    }

    /// Express a length quantity as a plain number in this unit.
    #[must_use]
    pub fn from_length(self, length: Length) -> f64 {
        match self {
            Self::Meter => length.get::<meter>(),
            Self::Centimeter => length.get::<centimeter>(),
            Self::Millimeter => length.get::<millimeter>(),
            Self::Micrometer => length.get::<micrometer>(),
            Self::Nanometer => length.get::<nanometer>(),
            Self::Angstrom => length.get::<angstrom>(),
        }
    }

    /// Convert a value from this unit to `target`.
    #[must_use]
    pub fn convert(self, value: f64, target: WavelengthUnit) -> f64 {
        if self == target {
            return value;
        }
        target.from_length(self.to_length(value))
    }
}

impl fmt::Display for WavelengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for WavelengthUnit {
    type Err = Error;

    /// Accepts a title, a long name or an abbreviation, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|unit| {
                unit.long_name().to_lowercase() == wanted
                    || unit.title().to_lowercase() == wanted
                    || unit.abbreviation().to_lowercase() == wanted
                    || format!("{unit:?}").to_lowercase() == wanted
            })
            .ok_or_else(|| Error::UnknownUnit(s.to_string()))
    }
}

fn fold_ascii(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'å' | 'ä' => 'a',
            'Å' | 'Ä' => 'A',
            'ö' => 'o',
            'Ö' => 'O',
            'µ' | 'μ' => 'u',
            other => other,
        })
        .collect()
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
