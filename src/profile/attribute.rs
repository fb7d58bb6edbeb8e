// Attribute vocabulary - the closed set of cacao sensory attributes
//
// Attribute identifiers are a fixed enum so that typos in configuration or
// export records are caught at the boundary instead of silently creating a
// new dictionary key. Everything keyed by attribute uses AttributeMap.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Ordered map keyed by attribute identifier
pub type AttributeMap<V> = BTreeMap<AttributeId, V>;

/// Sensory attribute that can be marked dominant during a tasting
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AttributeId {
    Cacao,
    Acidity,
    Bitterness,
    Astringency,
    FreshFruit,
    BrownFruit,
    Vegetal,
    Floral,
    Woody,
    Spice,
    Nutty,
    CaramelPanela,
    Roast,
    Sweetness,
    Citrus,
    Berry,
    DriedFruit,
    Herbal,
    Malty,
    Mouldy,
    Smoky,
    Musty,
    OffFlavor,
}

impl AttributeId {
    /// Every attribute, in declaration order
    pub const ALL: [AttributeId; 23] = [
        AttributeId::Cacao,
        AttributeId::Acidity,
        AttributeId::Bitterness,
        AttributeId::Astringency,
        AttributeId::FreshFruit,
        AttributeId::BrownFruit,
        AttributeId::Vegetal,
        AttributeId::Floral,
        AttributeId::Woody,
        AttributeId::Spice,
        AttributeId::Nutty,
        AttributeId::CaramelPanela,
        AttributeId::Roast,
        AttributeId::Sweetness,
        AttributeId::Citrus,
        AttributeId::Berry,
        AttributeId::DriedFruit,
        AttributeId::Herbal,
        AttributeId::Malty,
        AttributeId::Mouldy,
        AttributeId::Smoky,
        AttributeId::Musty,
        AttributeId::OffFlavor,
    ];

    /// Stable snake_case identifier used in records and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeId::Cacao => "cacao",
            AttributeId::Acidity => "acidity",
            AttributeId::Bitterness => "bitterness",
            AttributeId::Astringency => "astringency",
            AttributeId::FreshFruit => "fresh_fruit",
            AttributeId::BrownFruit => "brown_fruit",
            AttributeId::Vegetal => "vegetal",
            AttributeId::Floral => "floral",
            AttributeId::Woody => "woody",
            AttributeId::Spice => "spice",
            AttributeId::Nutty => "nutty",
            AttributeId::CaramelPanela => "caramel_panela",
            AttributeId::Roast => "roast",
            AttributeId::Sweetness => "sweetness",
            AttributeId::Citrus => "citrus",
            AttributeId::Berry => "berry",
            AttributeId::DriedFruit => "dried_fruit",
            AttributeId::Herbal => "herbal",
            AttributeId::Malty => "malty",
            AttributeId::Mouldy => "mouldy",
            AttributeId::Smoky => "smoky",
            AttributeId::Musty => "musty",
            AttributeId::OffFlavor => "off_flavor",
        }
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttribute(pub String);

impl fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown attribute '{}'", self.0)
    }
}

impl std::error::Error for UnknownAttribute {}

impl FromStr for AttributeId {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        AttributeId::ALL
            .iter()
            .copied()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}
