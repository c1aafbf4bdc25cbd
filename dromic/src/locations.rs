//! PSGC location hierarchy: region -> province -> city -> barangay.
//!
//! The reference tables are embedded in the binary as JSON and parsed once at startup into a
//! read-only [`LocationDirectory`] shared through `AppState`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const REGIONS_JSON: &str = include_str!("../data/psgc/regions.json");
const PROVINCES_JSON: &str = include_str!("../data/psgc/provinces.json");
const CITIES_JSON: &str = include_str!("../data/psgc/cities.json");
const BARANGAYS_JSON: &str = include_str!("../data/psgc/barangays.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Region {
    pub reg_id: u32,
    pub code_correspondence: String,
    pub name: String,
    #[serde(rename = "altName")]
    pub alt_name: String,
    pub code: String,
    pub geo_level: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Province {
    pub prov_id: u32,
    pub code_correspondence: String,
    pub name: String,
    pub code: String,
    pub geo_level: String,
    pub old_name: Option<String>,
    pub income_classification: String,
    pub region: String,
    pub region_correspondence: String,
    pub reg_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct City {
    pub city_id: u32,
    pub code_correspondence: String,
    pub name: String,
    pub code: String,
    pub classification: String,
    pub old_name: Option<String>,
    pub city_class: Option<String>,
    pub income_classification: String,
    pub province: String,
    pub province_correspondence: String,
    pub prov_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Barangay {
    pub brgy_id: u32,
    pub code_correspondence: String,
    pub name: String,
    pub code: String,
    pub geo_level: String,
    pub old_name: Option<String>,
    pub city_class: Option<String>,
    pub urb_rur: String,
    pub city: String,
    pub city_correspondence: String,
    pub city_id: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    regions: Vec<Region>,
    provinces: Vec<Province>,
    cities: Vec<City>,
    barangays: Vec<Barangay>,
}

impl LocationDirectory {
    /// Parse the tables compiled into the binary.
    pub fn load_embedded() -> Result<Self, serde_json::Error> {
        Self::from_json(REGIONS_JSON, PROVINCES_JSON, CITIES_JSON, BARANGAYS_JSON)
    }

    pub fn from_json(regions: &str, provinces: &str, cities: &str, barangays: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            regions: serde_json::from_str(regions)?,
            provinces: serde_json::from_str(provinces)?,
            cities: serde_json::from_str(cities)?,
            barangays: serde_json::from_str(barangays)?,
        })
    }

    /// No regions means nothing below them can be navigated.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn provinces_by_region(&self, reg_id: u32) -> Vec<&Province> {
        self.provinces.iter().filter(|p| p.reg_id == reg_id).collect()
    }

    pub fn cities_by_province(&self, prov_id: u32) -> Vec<&City> {
        self.cities.iter().filter(|c| c.prov_id == prov_id).collect()
    }

    pub fn barangays_by_city(&self, city_id: u32) -> Vec<&Barangay> {
        self.barangays.iter().filter(|b| b.city_id == city_id).collect()
    }

    pub fn region(&self, reg_id: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.reg_id == reg_id)
    }

    pub fn province(&self, prov_id: u32) -> Option<&Province> {
        self.provinces.iter().find(|p| p.prov_id == prov_id)
    }

    pub fn city(&self, city_id: u32) -> Option<&City> {
        self.cities.iter().find(|c| c.city_id == city_id)
    }

    pub fn barangay(&self, brgy_id: u32) -> Option<&Barangay> {
        self.barangays.iter().find(|b| b.brgy_id == brgy_id)
    }

    /// Counts per level, reported by the health check.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (self.regions.len(), self.provinces.len(), self.cities.len(), self.barangays.len())
    }
}
