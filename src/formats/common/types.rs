//! Resource type registry shared by the GFF writer and ERF key table

/// Numeric field type ids used in the GFF field array.
pub type FieldTypeId = u32;

pub(crate) const TYPE_BYTE: FieldTypeId = 0;
pub(crate) const TYPE_CHAR: FieldTypeId = 1;
pub(crate) const TYPE_WORD: FieldTypeId = 2;
pub(crate) const TYPE_SHORT: FieldTypeId = 3;
pub(crate) const TYPE_DWORD: FieldTypeId = 4;
pub(crate) const TYPE_INT: FieldTypeId = 5;
pub(crate) const TYPE_DWORD64: FieldTypeId = 6;
pub(crate) const TYPE_INT64: FieldTypeId = 7;
pub(crate) const TYPE_FLOAT: FieldTypeId = 8;
pub(crate) const TYPE_DOUBLE: FieldTypeId = 9;
pub(crate) const TYPE_CEXOSTRING: FieldTypeId = 10;
pub(crate) const TYPE_RESREF: FieldTypeId = 11;
pub(crate) const TYPE_CEXOLOCSTRING: FieldTypeId = 12;
pub(crate) const TYPE_VOID: FieldTypeId = 13;
pub(crate) const TYPE_STRUCT: FieldTypeId = 14;
pub(crate) const TYPE_LIST: FieldTypeId = 15;
pub(crate) const TYPE_ORIENTATION: FieldTypeId = 16;
pub(crate) const TYPE_VECTOR: FieldTypeId = 17;
pub(crate) const TYPE_STRREF: FieldTypeId = 18;

/// Aurora resource types relevant to the GFF and ERF formats.
///
/// The discriminants are the engine's own numeric ids, as stored in ERF key
/// entries and KEY/BIF tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ResourceType {
    Res = 0,
    Are = 2012,
    Ifo = 2014,
    TwoDa = 2017,
    Git = 2023,
    Uti = 2025,
    Utc = 2027,
    Dlg = 2029,
    Utt = 2032,
    Uts = 2035,
    Ute = 2040,
    Utd = 2042,
    Utp = 2044,
    Gui = 2047,
    Utm = 2051,
    Jrl = 2056,
    Utw = 2058,
    Pth = 3017,
}

impl ResourceType {
    /// The engine's numeric id for this resource type.
    #[must_use]
    pub fn type_id(self) -> u16 {
        self as u16
    }

    /// Look up a resource type by its numeric id.
    #[must_use]
    pub fn from_type_id(id: u16) -> Option<Self> {
        match id {
            0 => Some(ResourceType::Res),
            2012 => Some(ResourceType::Are),
            2014 => Some(ResourceType::Ifo),
            2017 => Some(ResourceType::TwoDa),
            2023 => Some(ResourceType::Git),
            2025 => Some(ResourceType::Uti),
            2027 => Some(ResourceType::Utc),
            2029 => Some(ResourceType::Dlg),
            2032 => Some(ResourceType::Utt),
            2035 => Some(ResourceType::Uts),
            2040 => Some(ResourceType::Ute),
            2042 => Some(ResourceType::Utd),
            2044 => Some(ResourceType::Utp),
            2047 => Some(ResourceType::Gui),
            2051 => Some(ResourceType::Utm),
            2056 => Some(ResourceType::Jrl),
            2058 => Some(ResourceType::Utw),
            3017 => Some(ResourceType::Pth),
            _ => None,
        }
    }

    /// The 3-letter GFF signature for this type, if it is GFF-backed.
    ///
    /// `TwoDa` is the only member without one.
    #[must_use]
    pub fn gff_signature(self) -> Option<&'static str> {
        match self {
            ResourceType::Res => Some("RES"),
            ResourceType::Are => Some("ARE"),
            ResourceType::Ifo => Some("IFO"),
            ResourceType::Git => Some("GIT"),
            ResourceType::Uti => Some("UTI"),
            ResourceType::Utc => Some("UTC"),
            ResourceType::Dlg => Some("DLG"),
            ResourceType::Utt => Some("UTT"),
            ResourceType::Uts => Some("UTS"),
            ResourceType::Ute => Some("UTE"),
            ResourceType::Utd => Some("UTD"),
            ResourceType::Utp => Some("UTP"),
            ResourceType::Gui => Some("GUI"),
            ResourceType::Utm => Some("UTM"),
            ResourceType::Jrl => Some("JRL"),
            ResourceType::Utw => Some("UTW"),
            ResourceType::Pth => Some("PTH"),
            ResourceType::TwoDa => None,
        }
    }

    /// The conventional file extension for this type.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ResourceType::Res => "res",
            ResourceType::Are => "are",
            ResourceType::Ifo => "ifo",
            ResourceType::TwoDa => "2da",
            ResourceType::Git => "git",
            ResourceType::Uti => "uti",
            ResourceType::Utc => "utc",
            ResourceType::Dlg => "dlg",
            ResourceType::Utt => "utt",
            ResourceType::Uts => "uts",
            ResourceType::Ute => "ute",
            ResourceType::Utd => "utd",
            ResourceType::Utp => "utp",
            ResourceType::Gui => "gui",
            ResourceType::Utm => "utm",
            ResourceType::Jrl => "jrl",
            ResourceType::Utw => "utw",
            ResourceType::Pth => "pth",
        }
    }

    /// Look up a resource type by file extension (case-insensitive).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lower = ext.to_lowercase();
        [
            ResourceType::Res,
            ResourceType::Are,
            ResourceType::Ifo,
            ResourceType::TwoDa,
            ResourceType::Git,
            ResourceType::Uti,
            ResourceType::Utc,
            ResourceType::Dlg,
            ResourceType::Utt,
            ResourceType::Uts,
            ResourceType::Ute,
            ResourceType::Utd,
            ResourceType::Utp,
            ResourceType::Gui,
            ResourceType::Utm,
            ResourceType::Jrl,
            ResourceType::Utw,
            ResourceType::Pth,
        ]
        .into_iter()
        .find(|ty| ty.extension() == lower)
    }
}
