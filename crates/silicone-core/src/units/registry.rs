//! Mass magnitudes used in emissions units.
//!
//! The magnitude of an emissions unit is a mass unit, optionally SI-prefixed
//! (`t`, `kt`, `Mt`, `Gt`, `g`, `kg`, `Tg`, ...). Factors returned by this module
//! are relative to the megatonne, the mass unit of `Mt CO2-equiv/yr`.

/// SI prefix multipliers.
#[derive(Debug, Clone, Copy)]
pub struct SiPrefix {
    pub symbol: &'static str,
    pub factor: f64,
}

/// SI prefixes, the two-letter `da` first so it wins over `d`.
pub static SI_PREFIXES: &[SiPrefix] = &[
    SiPrefix {
        symbol: "da",
        factor: 1e1,
    },
    SiPrefix {
        symbol: "E",
        factor: 1e18,
    },
    SiPrefix {
        symbol: "P",
        factor: 1e15,
    },
    SiPrefix {
        symbol: "T",
        factor: 1e12,
    },
    SiPrefix {
        symbol: "G",
        factor: 1e9,
    },
    SiPrefix {
        symbol: "M",
        factor: 1e6,
    },
    SiPrefix {
        symbol: "k",
        factor: 1e3,
    },
    SiPrefix {
        symbol: "h",
        factor: 1e2,
    },
    SiPrefix {
        symbol: "d",
        factor: 1e-1,
    },
    SiPrefix {
        symbol: "c",
        factor: 1e-2,
    },
    SiPrefix {
        symbol: "m",
        factor: 1e-3,
    },
    SiPrefix {
        symbol: "u",
        factor: 1e-6,
    }, // using 'u' for micro (μ)
];

/// Unprefixed mass units and their size in kg.
static BASE_MASS_UNITS: &[(&str, f64)] = &[("g", 1e-3), ("t", 1e3)];

/// Kilograms per megatonne.
pub const KG_PER_MEGATONNE: f64 = 1e9;

fn base_mass_in_kg(symbol: &str) -> Option<f64> {
    BASE_MASS_UNITS
        .iter()
        .find(|(base, _)| *base == symbol)
        .map(|(_, kg)| *kg)
}

/// Size of a (possibly prefixed) mass unit in kg.
pub fn mass_in_kg(symbol: &str) -> Option<f64> {
    if let Some(kg) = base_mass_in_kg(symbol) {
        return Some(kg);
    }

    SI_PREFIXES.iter().find_map(|prefix| {
        symbol
            .strip_prefix(prefix.symbol)
            .and_then(base_mass_in_kg)
            .map(|kg| kg * prefix.factor)
    })
}

/// Multiplier converting a quantity in `magnitude` to megatonnes.
///
/// ```
/// use silicone_core::units::magnitude_factor;
///
/// assert_eq!(magnitude_factor("Mt"), Some(1.0));
/// assert_eq!(magnitude_factor("bad"), None);
/// ```
pub fn magnitude_factor(magnitude: &str) -> Option<f64> {
    mass_in_kg(magnitude).map(|kg| kg / KG_PER_MEGATONNE)
}
