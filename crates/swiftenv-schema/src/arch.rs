//! CPU architectures of published binaries.

/// CPU architecture a published binary is built for.
///
/// Download links that carry no explicit architecture suffix are `x86_64`
/// builds, so that is the default. Newer Linux snapshots also ship an
/// `aarch64` variant whose filename ends in `-aarch64`.
///
/// # Example
///
/// ```
/// use swiftenv_schema::Arch;
///
/// let arch: Arch = "arm64".parse().unwrap();
/// assert_eq!(arch, Arch::Aarch64);
/// assert_eq!(arch.as_str(), "aarch64");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    Default,
)]
pub enum Arch {
    /// 64-bit Intel/AMD.
    #[default]
    #[serde(rename = "x86_64")]
    X86_64,
    /// 64-bit ARM.
    #[serde(rename = "aarch64")]
    Aarch64,
}

impl Arch {
    /// Every architecture the catalog knows about.
    pub const ALL: [Self; 2] = [Self::X86_64, Self::Aarch64];

    /// Key used for this architecture inside a record's `binaries` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}
