use std::collections::HashMap;
use std::sync::OnceLock;

use crate::utils::text::title_case;

/// Political region name (title case) to the rainfall climatology subdivision
/// that covers it. The two sources partition the country differently, so
/// several states collapse into one combined subdivision.
pub const SUBDIVISION_ALIASES: &[(&str, &str)] = &[
    ("Andaman And Nicobar Islands", "Andaman & Nicobar Islands"),
    ("Andhra Pradesh", "Coastal Andhra Pradesh"),
    ("Arunachal Pradesh", "Arunachal Pradesh"),
    ("Assam", "Assam & Meghalaya"),
    ("Bihar", "Bihar"),
    ("Chhattisgarh", "Chhattisgarh"),
    ("Delhi", "Haryana Delhi & Chandigarh"),
    ("Goa", "Konkan & Goa"),
    ("Gujarat", "Gujarat Region"),
    ("Haryana", "Haryana Delhi & Chandigarh"),
    ("Himachal Pradesh", "Himachal Pradesh"),
    ("Jammu And Kashmir", "Jammu & Kashmir"),
    ("Jharkhand", "Jharkhand"),
    ("Karnataka", "Coastal Karnataka"),
    ("Kerala", "Kerala"),
    ("Ladakh", "Jammu & Kashmir"),
    ("Madhya Pradesh", "West Madhya Pradesh"),
    ("Maharashtra", "Madhya Maharashtra"),
    ("Manipur", "Naga Mani Mizo Tripura"),
    ("Meghalaya", "Assam & Meghalaya"),
    ("Mizoram", "Naga Mani Mizo Tripura"),
    ("Nagaland", "Naga Mani Mizo Tripura"),
    ("Odisha", "Orissa"),
    ("Puducherry", "Tamil Nadu"),
    ("Punjab", "Punjab"),
    ("Rajasthan", "East Rajasthan"),
    ("Sikkim", "Sub Himalayan West Bengal & Sikkim"),
    ("Tamil Nadu", "Tamil Nadu"),
    ("Telangana", "Telangana"),
    ("Tripura", "Naga Mani Mizo Tripura"),
    ("Uttar Pradesh", "East Uttar Pradesh"),
    ("Uttarakhand", "Uttarakhand"),
    ("West Bengal", "Gangetic West Bengal"),
];

/// Maps raw region names onto canonical subdivision names.
///
/// Total: every input yields a name. Unmapped names come back title-cased.
#[derive(Debug, Clone)]
pub struct RegionNormalizer {
    aliases: HashMap<String, String>,
}

impl RegionNormalizer {
    pub fn new() -> Self {
        Self::with_aliases(SUBDIVISION_ALIASES.iter().copied())
    }

    pub fn with_aliases<'a>(aliases: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(raw, canonical)| (title_case(raw.trim()), canonical.to_string()))
            .collect();
        Self { aliases }
    }

    /// Process-wide instance built from [`SUBDIVISION_ALIASES`] on first use
    pub fn shared() -> &'static RegionNormalizer {
        static SHARED: OnceLock<RegionNormalizer> = OnceLock::new();
        SHARED.get_or_init(RegionNormalizer::new)
    }

    pub fn normalize(&self, raw_name: &str) -> String {
        let titled = title_case(raw_name.trim());
        match self.aliases.get(&titled) {
            Some(canonical) => canonical.clone(),
            None => titled,
        }
    }

    /// `None` stays `None` so it reads as "no match" in later joins
    pub fn normalize_opt(&self, raw_name: Option<&str>) -> Option<String> {
        raw_name.map(|name| self.normalize(name))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for RegionNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the process-wide alias table
pub fn normalize_region(raw_name: &str) -> String {
    RegionNormalizer::shared().normalize(raw_name)
}
