use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Gimp,
    Chrome,
    Vsc,
    LibreofficeCalc,
    LibreofficeImpress,
    LibreofficeWriter,
    Thunderbird,
    Os,
    Generic,
}

/// Scoring and tie-break order: on equal scores the earlier domain wins.
/// `Generic` is not scored; it is the zero-score fallback.
pub const DOMAIN_PRIORITY: &[Domain] = &[
    Domain::Gimp,
    Domain::Chrome,
    Domain::Vsc,
    Domain::LibreofficeCalc,
    Domain::LibreofficeImpress,
    Domain::LibreofficeWriter,
    Domain::Thunderbird,
    Domain::Os,
];

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Gimp => "gimp",
            Domain::Chrome => "chrome",
            Domain::Vsc => "vsc",
            Domain::LibreofficeCalc => "libreoffice_calc",
            Domain::LibreofficeImpress => "libreoffice_impress",
            Domain::LibreofficeWriter => "libreoffice_writer",
            Domain::Thunderbird => "thunderbird",
            Domain::Os => "os",
            Domain::Generic => "generic",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gimp" => Ok(Domain::Gimp),
            "chrome" => Ok(Domain::Chrome),
            "vsc" | "vscode" => Ok(Domain::Vsc),
            "libreoffice_calc" | "calc" => Ok(Domain::LibreofficeCalc),
            "libreoffice_impress" | "impress" => Ok(Domain::LibreofficeImpress),
            "libreoffice_writer" | "writer" => Ok(Domain::LibreofficeWriter),
            "thunderbird" => Ok(Domain::Thunderbird),
            "os" => Ok(Domain::Os),
            "generic" => Ok(Domain::Generic),
            other => Err(format!("unknown domain '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainScores {
    pub best: Domain,
    pub scores: BTreeMap<Domain, u32>,
}

impl DomainScores {
    pub fn score(&self, domain: Domain) -> u32 {
        self.scores.get(&domain).copied().unwrap_or(0)
    }
}
