//! The fixed catalog of checklist entries expected in each section.
//!
//! The order of each catalog is the canonical order data entry follows. The
//! legacy normalizer relies on it for positional matching, and the aggregator
//! uses it to order rendered rows.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One expected checklist entry: its stable key and its human label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub label: &'static str,
}

const fn entry(key: &'static str, label: &'static str) -> CatalogEntry {
    CatalogEntry { key, label }
}

const OPTICS: &[CatalogEntry] = &[
    entry("reflector", "Reflector"),
    entry("uvFilter", "UV Filter"),
    entry("integratorRod", "Integrator Rod"),
    entry("coldMirror", "Cold Mirror"),
    entry("foldMirror", "Fold Mirror"),
];

const ELECTRONICS: &[CatalogEntry] = &[
    entry("touchPanel", "Touch Panel"),
    entry("evbBoard", "EVB Board"),
    entry("imcbBoard", "IMCB Board"),
    entry("pibBoard", "PIB Board"),
    entry("icpBoard", "ICP Board"),
    entry("imbsBoard", "IMB/S Board"),
];

const MECHANICAL: &[CatalogEntry] = &[
    entry("acBlowerVane", "AC Blower and Vane Switch"),
    entry("extractorVane", "Extractor Vane Switch"),
    entry("exhaustCfm", "Exhaust CFM Value"),
    entry("lightEngineFans", "Light Engine Fans"),
    entry("cardCageFans", "Card Cage Top and Bottom Fans"),
    entry("radiatorFanPump", "Radiator Fan and Pump"),
    entry("pumpConnectorHose", "Pump Connector and Hose"),
    entry("securityLampHouseLock", "Security and Lamp House Lock Switch"),
    entry("lampLocMechanism", "Lamp LOC Mechanism X, Y and Z"),
];

const CONSUMABLES: &[CatalogEntry] = &[
    entry("airIntakeFilter", "Air Intake Filter"),
    entry("ladFilter", "LAD Filter"),
    entry("radFilter", "RAD Filter"),
    entry("lamp", "Lamp"),
];

const COOLANT: &[CatalogEntry] = &[
    entry("levelAndColor", "Level and Color"),
    entry("radiatorCondition", "Radiator Condition"),
];

const LIGHT_ENGINE_TEST_PATTERNS: &[CatalogEntry] = &[
    entry("white", "White"),
    entry("red", "Red"),
    entry("green", "Green"),
    entry("blue", "Blue"),
    entry("black", "Black"),
];

const IMAGE_EVALUATION: &[CatalogEntry] = &[
    entry("focusBoresight", "Focus and Boresight"),
    entry("integratorPosition", "Integrator Position"),
    entry("spotsOnScreen", "Spots on Screen after PPM"),
    entry("screenCropping", "Screen Cropping"),
    entry("convergence", "Convergence Checked"),
    entry("channelsChecked", "Channels Checked"),
    entry("pixelDefects", "Pixel Defects"),
    entry("imageVibration", "Excessive Image Vibration"),
    entry("liteLoc", "LiteLOC"),
];

/// A checklist section of an inspection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Optics,
    Electronics,
    Mechanical,
    Consumables,
    Coolant,
    LightEngineTestPatterns,
    ImageEvaluation,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Optics,
        SectionKind::Electronics,
        SectionKind::Mechanical,
        SectionKind::Consumables,
        SectionKind::Coolant,
        SectionKind::LightEngineTestPatterns,
        SectionKind::ImageEvaluation,
    ];

    /// The record field this section is stored under.
    pub fn field_name(self) -> &'static str {
        match self {
            SectionKind::Optics => "optics",
            SectionKind::Electronics => "electronics",
            SectionKind::Mechanical => "mechanical",
            SectionKind::Consumables => "consumables",
            SectionKind::Coolant => "coolant",
            SectionKind::LightEngineTestPatterns => "lightEngineTestPatterns",
            SectionKind::ImageEvaluation => "imageEvaluation",
        }
    }

    /// Human-readable section title.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Optics => "Optics",
            SectionKind::Electronics => "Electronics",
            SectionKind::Mechanical => "Mechanical",
            SectionKind::Consumables => "Consumables",
            SectionKind::Coolant => "Coolant",
            SectionKind::LightEngineTestPatterns => "Light Engine Test Patterns",
            SectionKind::ImageEvaluation => "Image Evaluation",
        }
    }

    /// Prefix used for per-item literal tokens, e.g. `OPT` in `OPT_REFLECTOR_STATUS`.
    pub fn token_prefix(self) -> &'static str {
        match self {
            SectionKind::Optics => "OPT",
            SectionKind::Electronics => "ELEC",
            SectionKind::Mechanical => "MECH",
            SectionKind::Consumables => "CONS",
            SectionKind::Coolant => "COOL",
            SectionKind::LightEngineTestPatterns => "LE",
            SectionKind::ImageEvaluation => "IMG",
        }
    }

    /// Token carrying the whole numbered block for this section.
    pub fn block_token(self) -> &'static str {
        match self {
            SectionKind::Optics => "OPTICS_CHECKLIST",
            SectionKind::Electronics => "ELECTRONICS_CHECKLIST",
            SectionKind::Mechanical => "MECHANICAL_CHECKLIST",
            SectionKind::Consumables => "CONSUMABLES_CHECKLIST",
            SectionKind::Coolant => "COOLANT_CHECKLIST",
            SectionKind::LightEngineTestPatterns => "LIGHT_ENGINE_CHECKLIST",
            SectionKind::ImageEvaluation => "IMAGE_EVALUATION_CHECKLIST",
        }
    }

    /// The ordered list of entries this section is expected to contain.
    pub fn catalog(self) -> &'static [CatalogEntry] {
        match self {
            SectionKind::Optics => OPTICS,
            SectionKind::Electronics => ELECTRONICS,
            SectionKind::Mechanical => MECHANICAL,
            SectionKind::Consumables => CONSUMABLES,
            SectionKind::Coolant => COOLANT,
            SectionKind::LightEngineTestPatterns => LIGHT_ENGINE_TEST_PATTERNS,
            SectionKind::ImageEvaluation => IMAGE_EVALUATION,
        }
    }

    /// Looks up the label of a catalog key.
    pub fn label_for(self, key: &str) -> Option<&'static str> {
        self.catalog()
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.label)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
