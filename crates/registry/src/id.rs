use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference type component of a canonical ID, inferred from the source
/// file's extension class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RefType {
    Doc,
    Code,
    Cfg,
    Ref,
}

impl RefType {
    pub fn code(self) -> &'static str {
        match self {
            RefType::Doc => "DOC",
            RefType::Code => "CODE",
            RefType::Cfg => "CFG",
            RefType::Ref => "REF",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DOC" => Some(RefType::Doc),
            "CODE" => Some(RefType::Code),
            "CFG" => Some(RefType::Cfg),
            "REF" => Some(RefType::Ref),
            _ => None,
        }
    }

    /// Classify by the source file's extension (lowercase, no dot).
    pub fn for_extension(extension: &str) -> Self {
        match extension {
            "md" | "mdx" | "rst" | "txt" | "html" => RefType::Doc,
            "py" | "rs" | "js" | "ts" | "css" => RefType::Code,
            "json" | "yaml" | "yml" | "toml" | "ini" | "cfg" => RefType::Cfg,
            _ => RefType::Ref,
        }
    }
}

/// Subsystem component of a canonical ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subsystem {
    Atlas,
    Coruja,
    Ethik,
    Koios,
    Mycelium,
    Nexus,
    /// Fallback category
    Core,
}

impl Subsystem {
    pub fn code(self) -> &'static str {
        match self {
            Subsystem::Atlas => "ATLAS",
            Subsystem::Coruja => "CORUJA",
            Subsystem::Ethik => "ETHIK",
            Subsystem::Koios => "KOIOS",
            Subsystem::Mycelium => "MYCELIUM",
            Subsystem::Nexus => "NEXUS",
            Subsystem::Core => "CORE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ATLAS" => Some(Subsystem::Atlas),
            "CORUJA" => Some(Subsystem::Coruja),
            "ETHIK" => Some(Subsystem::Ethik),
            "KOIOS" => Some(Subsystem::Koios),
            "MYCELIUM" => Some(Subsystem::Mycelium),
            "NEXUS" => Some(Subsystem::Nexus),
            "CORE" => Some(Subsystem::Core),
            _ => None,
        }
    }
}

/// Ordered keyword table for subsystem inference, evaluated top to bottom.
/// The first keyword found (case-insensitive) in the legacy text wins;
/// anything unmatched falls back to CORE.
pub const SUBSYSTEM_KEYWORDS: &[(&str, Subsystem)] = &[
    ("ETHIK", Subsystem::Ethik),
    ("KOIOS", Subsystem::Koios),
    ("NEXUS", Subsystem::Nexus),
    ("MYCELIUM", Subsystem::Mycelium),
    ("ATLAS", Subsystem::Atlas),
    ("CORUJA", Subsystem::Coruja),
    ("ROADMAP", Subsystem::Core),
    ("MQP", Subsystem::Core),
];

pub fn infer_subsystem(legacy_text: &str) -> Subsystem {
    let upper = legacy_text.to_uppercase();
    for (keyword, subsystem) in SUBSYSTEM_KEYWORDS {
        if upper.contains(keyword) {
            return *subsystem;
        }
    }
    Subsystem::Core
}

/// Structured identifier `EGOS-<TYPE>-<SUBSYSTEM>-<NUMBER>`.
///
/// `(type, subsystem, sequence)` is unique and sequence numbers are never
/// reused within a `(type, subsystem)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CanonicalId {
    pub ref_type: RefType,
    pub subsystem: Subsystem,
    pub sequence: u32,
}

impl CanonicalId {
    pub fn new(ref_type: RefType, subsystem: Subsystem, sequence: u32) -> Self {
        Self {
            ref_type,
            subsystem,
            sequence,
        }
    }

    /// Parse a canonical ID string with known type and subsystem codes.
    pub fn parse(text: &str) -> Option<Self> {
        let parts = xref_patterns::parse_canonical(text)?;
        Some(Self {
            ref_type: RefType::from_code(parts.ref_type)?,
            subsystem: Subsystem::from_code(parts.subsystem)?,
            sequence: parts.sequence,
        })
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EGOS-{}-{}-{:04}",
            self.ref_type.code(),
            self.subsystem.code(),
            self.sequence
        )
    }
}

impl From<CanonicalId> for String {
    fn from(id: CanonicalId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CanonicalId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CanonicalId::parse(&value).ok_or_else(|| format!("not a canonical ID: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_zero_padded() {
        let id = CanonicalId::new(RefType::Doc, Subsystem::Ethik, 1);
        assert_eq!(id.to_string(), "EGOS-DOC-ETHIK-0001");

        let wide = CanonicalId::new(RefType::Ref, Subsystem::Core, 12345);
        assert_eq!(wide.to_string(), "EGOS-REF-CORE-12345");
    }

    #[test]
    fn display_round_trips_through_parse() {
        let id = CanonicalId::new(RefType::Cfg, Subsystem::Nexus, 42);
        assert_eq!(CanonicalId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn keyword_table_is_ordered_with_core_fallback() {
        assert_eq!(infer_subsystem("ETHIK module"), Subsystem::Ethik);
        assert_eq!(infer_subsystem("see koios standards"), Subsystem::Koios);
        // First match in table order wins
        assert_eq!(infer_subsystem("KOIOS and ETHIK"), Subsystem::Ethik);
        assert_eq!(infer_subsystem("ROADMAP.md"), Subsystem::Core);
        assert_eq!(infer_subsystem("some random doc"), Subsystem::Core);
    }

    #[test]
    fn extension_classes_map_to_types() {
        assert_eq!(RefType::for_extension("md"), RefType::Doc);
        assert_eq!(RefType::for_extension("py"), RefType::Code);
        assert_eq!(RefType::for_extension("yaml"), RefType::Cfg);
        assert_eq!(RefType::for_extension("csv"), RefType::Ref);
    }
}
