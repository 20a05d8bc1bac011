use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

pub const UNKNOWN_REGION: &str = "Unknown Region";
pub const UNKNOWN_CRIME: &str = "Unknown Crime";
pub const UNKNOWN_PREMISE: &str = "Unknown Premise";
pub const UNKNOWN_WEAPON: &str = "Unknown Weapon";
pub const UNKNOWN_YEAR: &str = "Unknown Year";

/// A single crime incident as stored in the collection.
///
/// Every field keeps the raw text that was entered or imported. Numeric and
/// date interpretation happens at aggregation time, so a malformed value only
/// lowers the quality of the derived numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub date: String,
    pub time_occurred: String,
    pub region: String,
    pub crime: String,
    pub victim_age: String,
    pub victim_sex: String,
    pub victim_descent: String,
    pub suspect_age: String,
    pub suspect_sex: String,
    pub premise: String,
    pub weapons_used: String,
}

impl CrimeRecord {
    pub fn victim_age(&self) -> Option<u32> {
        parse_age(&self.victim_age)
    }

    pub fn suspect_age(&self) -> Option<u32> {
        parse_age(&self.suspect_age)
    }

    /// Copy of the record with every field trimmed of surrounding whitespace.
    pub fn trimmed(&self) -> Self {
        Self {
            id: self.id,
            date: self.date.trim().to_string(),
            time_occurred: self.time_occurred.trim().to_string(),
            region: self.region.trim().to_string(),
            crime: self.crime.trim().to_string(),
            victim_age: self.victim_age.trim().to_string(),
            victim_sex: self.victim_sex.trim().to_string(),
            victim_descent: self.victim_descent.trim().to_string(),
            suspect_age: self.suspect_age.trim().to_string(),
            suspect_sex: self.suspect_sex.trim().to_string(),
            premise: self.premise.trim().to_string(),
            weapons_used: self.weapons_used.trim().to_string(),
        }
    }

    /// Enumerated fields whose value is outside the known option set.
    ///
    /// Empty values are not reported; they are simply absent.
    pub fn unknown_options(&self) -> Vec<(&'static str, &str)> {
        let checks: [(&'static str, &str, fn(&str) -> bool); 7] = [
            ("region", &self.region, |v| v.parse::<Region>().is_ok()),
            ("crime", &self.crime, |v| v.parse::<CrimeType>().is_ok()),
            ("victim sex", &self.victim_sex, |v| v.parse::<Sex>().is_ok()),
            ("victim descent", &self.victim_descent, |v| {
                v.parse::<Descent>().is_ok()
            }),
            ("suspect sex", &self.suspect_sex, |v| v.parse::<Sex>().is_ok()),
            ("premise", &self.premise, |v| v.parse::<Premise>().is_ok()),
            ("weapons used", &self.weapons_used, |v| {
                v.parse::<Weapon>().is_ok()
            }),
        ];

        checks
            .into_iter()
            .filter(|(_, value, known)| !value.is_empty() && !known(value))
            .map(|(field, value, _)| (field, value))
            .collect()
    }
}

fn parse_age(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Administrative regions of the Philippines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Region {
    #[strum(serialize = "National Capital Region")]
    NationalCapitalRegion,
    #[strum(serialize = "Ilocos")]
    Ilocos,
    #[strum(serialize = "Cagayan Valley")]
    CagayanValley,
    #[strum(serialize = "Central Luzon")]
    CentralLuzon,
    #[strum(serialize = "Calabarzon")]
    Calabarzon,
    #[strum(serialize = "Mimaropa")]
    Mimaropa,
    #[strum(serialize = "Bicol")]
    Bicol,
    #[strum(serialize = "Western Visayas")]
    WesternVisayas,
    #[strum(serialize = "Central Visayas")]
    CentralVisayas,
    #[strum(serialize = "Eastern Visayas")]
    EasternVisayas,
    #[strum(serialize = "Zamboanga Peninsula")]
    ZamboangaPeninsula,
    #[strum(serialize = "Northern Mindanao")]
    NorthernMindanao,
    #[strum(serialize = "Davao")]
    Davao,
    #[strum(serialize = "Soccsksargen")]
    Soccsksargen,
    #[strum(serialize = "Caraga")]
    Caraga,
    #[strum(serialize = "Autonomous Region in Muslim Mindanao")]
    Armm,
    #[strum(serialize = "Cordillera Administrative Region")]
    CordilleraAdministrativeRegion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum CrimeType {
    Cybercrime,
    #[strum(serialize = "Vehicular Crime")]
    VehicularCrime,
    Kidnapping,
    #[strum(serialize = "Hit and Run")]
    HitAndRun,
    #[strum(serialize = "Physical Injury")]
    PhysicalInjury,
    Arson,
    Fraud,
    #[strum(serialize = "Human Trafficking")]
    HumanTrafficking,
    Assault,
    Rape,
    #[strum(serialize = "Illegal Drugs")]
    IllegalDrugs,
    Murder,
    Theft,
    Homicide,
    Robbery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Descent {
    Filipino,
    Foreigner,
}

/// Kind of location where an incident took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Premise {
    Bar,
    Market,
    Home,
    Mall,
    Street,
    Hospital,
    School,
    Highway,
    Office,
    Park,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Weapon {
    #[strum(serialize = "No Weapon")]
    NoWeapon,
    Computer,
    #[strum(serialize = "Personal Weapon")]
    PersonalWeapon,
    Firearm,
    Vehicle,
    #[strum(serialize = "Blunt Instrument")]
    BluntInstrument,
    #[strum(serialize = "Bodily Force")]
    BodilyForce,
    Knife,
    Drugs,
}

/// Which party of an incident a demographic breakdown refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    #[default]
    Victim,
    Suspect,
}

/// Display names of every value in an option set, in declaration order.
pub fn option_names<E: IntoEnumIterator + std::fmt::Display>() -> Vec<String> {
    E::iter().map(|value| value.to_string()).collect()
}
