use serde::{Deserialize, Serialize};

/// Constant properties shared by all cells of one [CellKind].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellKindSpec {
    /// Short symbol used in configuration files and by renderers
    pub symbol: &'static str,
    /// Human readable name
    pub name: &'static str,
    /// Radius of the disk representing the cell
    pub radius: f64,
    /// Mass which scales all forces
    pub mass: f64,
    /// Sensitivity to the outward margination drift
    pub margin_bias: f64,
    /// Adhesiveness of the cell. Not used by the numerics.
    pub adhesion: Option<f64>,
    /// RGB color suggested for rendering
    pub color: [u8; 3],
    /// Movement is augmented by the steering policy and the population is fitness managed
    pub policy_driven: bool,
    /// Touching cells of this kind costs policy-driven cells fitness
    pub immune: bool,
}

const ERYTHROCYTE: CellKindSpec = CellKindSpec {
    symbol: "RBC",
    name: "Red Blood Cell",
    radius: 5.0,
    mass: 1.0,
    margin_bias: 0.12,
    adhesion: None,
    color: [231, 76, 60],
    policy_driven: false,
    immune: false,
};

const PLATELET: CellKindSpec = CellKindSpec {
    symbol: "PLT",
    name: "Platelet",
    radius: 3.2,
    mass: 0.55,
    margin_bias: 0.55,
    adhesion: None,
    color: [241, 196, 15],
    policy_driven: false,
    immune: false,
};

const NEUTROPHIL: CellKindSpec = CellKindSpec {
    symbol: "NEU",
    name: "Neutrophil",
    radius: 8.5,
    mass: 2.5,
    margin_bias: 0.35,
    adhesion: Some(0.35),
    color: [210, 210, 255],
    policy_driven: false,
    immune: true,
};

const LYMPHOCYTE: CellKindSpec = CellKindSpec {
    symbol: "LYM",
    name: "Lymphocyte",
    radius: 7.0,
    mass: 1.8,
    margin_bias: 0.15,
    adhesion: Some(0.05),
    color: [180, 200, 255],
    policy_driven: false,
    immune: false,
};

const MONOCYTE: CellKindSpec = CellKindSpec {
    symbol: "MONO",
    name: "Monocyte",
    radius: 9.5,
    mass: 3.0,
    margin_bias: 0.45,
    adhesion: Some(0.45),
    color: [160, 180, 220],
    policy_driven: false,
    immune: true,
};

const TUMOR_CELL: CellKindSpec = CellKindSpec {
    symbol: "CTC",
    name: "Circulating Tumor Cell",
    radius: 7.8,
    mass: 2.6,
    margin_bias: 0.30,
    adhesion: None,
    color: [180, 80, 200],
    policy_driven: true,
    immune: false,
};

/// Fixed catalogue of cell kinds.
///
/// Kinds are serialized by their [symbol](CellKindSpec::symbol) such that population targets
/// can be written as `{"RBC": 240, "CTC": 6}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Red blood cell
    #[serde(rename = "RBC")]
    Erythrocyte,
    /// Platelet
    #[serde(rename = "PLT")]
    Platelet,
    /// Neutrophil
    #[serde(rename = "NEU")]
    Neutrophil,
    /// Lymphocyte
    #[serde(rename = "LYM")]
    Lymphocyte,
    /// Monocyte
    #[serde(rename = "MONO")]
    Monocyte,
    /// Circulating tumor cell, the only policy-driven kind
    #[serde(rename = "CTC")]
    TumorCell,
}

impl CellKind {
    /// All kinds in catalogue order.
    pub const ALL: [CellKind; 6] = [
        CellKind::Erythrocyte,
        CellKind::Platelet,
        CellKind::Neutrophil,
        CellKind::Lymphocyte,
        CellKind::Monocyte,
        CellKind::TumorCell,
    ];

    /// Constant properties of this kind.
    pub const fn spec(&self) -> &'static CellKindSpec {
        match self {
            CellKind::Erythrocyte => &ERYTHROCYTE,
            CellKind::Platelet => &PLATELET,
            CellKind::Neutrophil => &NEUTROPHIL,
            CellKind::Lymphocyte => &LYMPHOCYTE,
            CellKind::Monocyte => &MONOCYTE,
            CellKind::TumorCell => &TUMOR_CELL,
        }
    }

    /// See [CellKindSpec::symbol]
    pub const fn symbol(&self) -> &'static str {
        self.spec().symbol
    }

    /// See [CellKindSpec::radius]
    pub const fn radius(&self) -> f64 {
        self.spec().radius
    }

    /// See [CellKindSpec::mass]
    pub const fn mass(&self) -> f64 {
        self.spec().mass
    }

    /// See [CellKindSpec::policy_driven]
    pub const fn is_policy_driven(&self) -> bool {
        self.spec().policy_driven
    }

    /// See [CellKindSpec::immune]
    pub const fn is_immune(&self) -> bool {
        self.spec().immune
    }

    /// Looks up a kind by its symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }

    /// The largest radius of any kind in the catalogue.
    pub fn largest_radius() -> f64 {
        Self::ALL
            .iter()
            .map(CellKind::radius)
            .fold(0.0, f64::max)
    }
}

impl core::fmt::Display for CellKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
