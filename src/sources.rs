//! The five Data USA datasets and where they are read from.

use std::fmt;

/// A dataset feeding one series of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Population,
    NonCitizen,
    Age,
    Tuition,
    Aid,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Population,
        Dataset::NonCitizen,
        Dataset::Age,
        Dataset::Tuition,
        Dataset::Aid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Population => "population",
            Dataset::NonCitizen => "non_citizen",
            Dataset::Age => "age",
            Dataset::Tuition => "tuition",
            Dataset::Aid => "aid",
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Dataset::Population => urls::POPULATION,
            Dataset::NonCitizen => urls::NON_CITIZEN,
            Dataset::Age => urls::AGE,
            Dataset::Tuition => urls::TUITION,
            Dataset::Aid => urls::AID,
        }
    }
}

/// Public Data USA endpoints used when no override is configured.
pub mod urls {
    pub const POPULATION: &str = "https://datausa.io/api/data?drilldowns=Nation&measures=Population";
    pub const NON_CITIZEN: &str =
        "https://wad.datausa.io/api/data?measure=Citizenship%20Status&drilldowns=Citizenship";
    pub const AGE: &str =
        "https://wad.datausa.io/api/data?drilldowns=Year,Age&measures=Total+Population";
    pub const TUITION: &str = "https://wad.datausa.io/api/data?Geography=01000US&measures=State%20Tuition&drilldowns=Sector";
    pub const AID: &str = "https://wad.datausa.io/api/data?University=210809:similar,210809,210809:parents&measures=Median%20Grant%20Or%20Scholarship%20Award&drilldowns=Income%20Range";
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field names read from each dataset's records.
pub mod fields {
    pub const YEAR: &str = "Year";
    pub const ID_YEAR: &str = "ID Year";
    pub const POPULATION: &str = "Population";
    pub const CITIZENSHIP: &str = "Citizenship";
    pub const CITIZENSHIP_STATUS: &str = "Citizenship Status";
    pub const AGE: &str = "Age";
    pub const TOTAL_POPULATION: &str = "Total Population";
    pub const STATE_TUITION: &str = "State Tuition";
    pub const MEDIAN_AID: &str = "Median Grant Or Scholarship Award";

    /// `Citizenship` value excluded from the non-citizen series.
    pub const CITIZEN: &str = "Citizen";
}

/// Where each dataset is loaded from: an `http(s)` URL or a local file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub population: String,
    pub non_citizen: String,
    pub age: String,
    pub tuition: String,
    pub aid: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            population: Dataset::Population.default_url().to_string(),
            non_citizen: Dataset::NonCitizen.default_url().to_string(),
            age: Dataset::Age.default_url().to_string(),
            tuition: Dataset::Tuition.default_url().to_string(),
            aid: Dataset::Aid.default_url().to_string(),
        }
    }
}

impl Sources {
    pub fn get(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Population => &self.population,
            Dataset::NonCitizen => &self.non_citizen,
            Dataset::Age => &self.age,
            Dataset::Tuition => &self.tuition,
            Dataset::Aid => &self.aid,
        }
    }
}
