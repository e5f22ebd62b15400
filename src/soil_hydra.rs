use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{HydroError, Result, positive};
use crate::infiltration::GreenAmpt;

const BUILTIN_TEXTURES: &str = include_str!("../data/soil_parameters.toml");

pub const WATER_DENSITY: f64 = 1.0; // [g/cm³]

// Masses of one soil core weighed at several moisture states
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SoilSample {
    pub volume: f64,              // Core volume [cm³]
    pub initial_mass: f64,        // Mass as sampled [g]
    pub dry_mass: f64,            // Oven-dry mass [g]
    pub saturated_mass: f64,      // Mass when saturated [g]
    pub field_capacity_mass: f64, // Mass after free drainage [g]
}

impl SoilSample {
    pub fn new(
        volume: f64,
        initial_mass: f64,
        dry_mass: f64,
        saturated_mass: f64,
        field_capacity_mass: f64,
    ) -> Result<Self> {
        let sample = SoilSample {
            volume,
            initial_mass,
            dry_mass,
            saturated_mass,
            field_capacity_mass,
        };
        sample.validate()?;
        Ok(sample)
    }

    pub fn validate(&self) -> Result<()> {
        positive("volume", self.volume)?;
        positive("dry mass", self.dry_mass)?;
        for (name, mass) in [
            ("initial mass", self.initial_mass),
            ("saturated mass", self.saturated_mass),
            ("field capacity mass", self.field_capacity_mass),
        ] {
            positive(name, mass)?;
            if mass < self.dry_mass {
                return Err(HydroError::OutOfRange {
                    name,
                    value: mass,
                    reason: "cannot be lighter than the oven-dry sample",
                });
            }
        }
        if self.saturated_mass < self.field_capacity_mass {
            return Err(HydroError::OutOfRange {
                name: "saturated mass",
                value: self.saturated_mass,
                reason: "cannot be lighter than the sample at field capacity",
            });
        }
        Ok(())
    }

    // Volume of water [cm³] held when the sample weighs `mass`
    fn water_volume(&self, mass: f64) -> f64 {
        (mass - self.dry_mass) / WATER_DENSITY
    }

    /** Mass of water per mass of dry soil, as sampled. */
    pub fn gravimetric_water_content(&self) -> f64 {
        (self.initial_mass - self.dry_mass) / self.dry_mass
    }

    pub fn volumetric_water_content(&self) -> f64 {
        self.water_volume(self.initial_mass) / self.volume
    }

    /** Pore volume fraction, taken as the water held at saturation. */
    pub fn porosity(&self) -> f64 {
        self.water_volume(self.saturated_mass) / self.volume
    }

    pub fn field_capacity(&self) -> f64 {
        self.water_volume(self.field_capacity_mass) / self.volume
    }

    /** Plant-available water between field capacity and the wilting point. */
    pub fn available_water(&self, wilting_point: f64) -> f64 {
        self.field_capacity() - wilting_point
    }

    pub fn bulk_density(&self) -> f64 {
        self.dry_mass / self.volume
    }

    pub fn degree_of_saturation(&self) -> f64 {
        self.volumetric_water_content() / self.porosity()
    }
}

// Green-Ampt parameters of one soil texture class
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SoilTexture {
    pub porosity: f64,           // [cm³/cm³]
    pub effective_porosity: f64, // [cm³/cm³]
    pub suction_head: f64,       // Wetting-front suction head [cm]
    pub ks: f64,                 // Saturated hydraulic conductivity [cm/hr]
}

impl SoilTexture {
    /** Green-Ampt model for this texture starting from water content `theta_init`. */
    pub fn green_ampt(&self, theta_init: f64) -> Result<GreenAmpt> {
        GreenAmpt::new(self.ks, self.suction_head, self.porosity, theta_init)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoilTextureTable {
    textures: BTreeMap<String, SoilTexture>,
}

pub const DEFAULT_TEXTURE: &str = "loam";

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

impl SoilTextureTable {
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let raw: BTreeMap<String, SoilTexture> = toml::from_str(toml_str)?;
        let textures = raw
            .into_iter()
            .map(|(name, texture)| (normalize(&name), texture))
            .collect();
        Ok(SoilTextureTable { textures })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml_str = fs::read_to_string(path).map_err(|source| HydroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&toml_str).map_err(|source| HydroError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /** Rawls et al. texture classes shipped with the crate. */
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_TEXTURES).map_err(|source| HydroError::Toml {
            path: "data/soil_parameters.toml".into(),
            source,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&SoilTexture> {
        self.textures.get(&normalize(name))
    }

    /**
    Looks up `name`, treating an empty name as loam and falling back to loam
    for names the table does not know.
    */
    pub fn resolve(&self, name: &str) -> Result<SoilTexture> {
        let mut soil_name = normalize(name);
        if soil_name.is_empty() {
            soil_name = DEFAULT_TEXTURE.to_string();
        }

        if let Some(texture) = self.textures.get(&soil_name) {
            return Ok(*texture);
        }

        log::warn!("unknown soil texture '{name}', using {DEFAULT_TEXTURE}");
        self.textures
            .get(DEFAULT_TEXTURE)
            .copied()
            .ok_or_else(|| HydroError::UnknownTexture(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn core_sample() -> SoilSample {
        SoilSample::new(100.0, 176.0, 164.0, 218.0, 188.0).unwrap()
    }

    #[test]
    fn water_contents_of_core() {
        let sample = core_sample();
        assert_relative_eq!(sample.gravimetric_water_content(), 12.0 / 164.0);
        assert_relative_eq!(sample.volumetric_water_content(), 0.12);
        assert_relative_eq!(sample.porosity(), 0.54);
        assert_relative_eq!(sample.field_capacity(), 0.24);
        assert_relative_eq!(sample.available_water(0.04), 0.20, epsilon = 1e-12);
        assert_relative_eq!(sample.bulk_density(), 1.64);
        assert_relative_eq!(sample.degree_of_saturation(), 0.12 / 0.54, epsilon = 1e-12);
    }

    #[test]
    fn inconsistent_masses_are_rejected() {
        assert!(SoilSample::new(100.0, 150.0, 164.0, 218.0, 188.0).is_err());
        assert!(SoilSample::new(100.0, 176.0, 164.0, 180.0, 188.0).is_err());
        assert!(SoilSample::new(0.0, 176.0, 164.0, 218.0, 188.0).is_err());
    }

    #[test]
    fn builtin_table_has_all_texture_classes() {
        let table = SoilTextureTable::builtin().unwrap();
        assert_eq!(table.names().count(), 11);
        let loam = table.get("Loam").unwrap();
        assert_relative_eq!(loam.suction_head, 8.89);
        assert_relative_eq!(loam.ks, 0.34);
        assert!(table.get("silty clay loam").is_some());
        assert!(table.get("sandy-loam").is_some());
    }

    #[test]
    fn empty_and_unknown_names_resolve_to_loam() {
        let table = SoilTextureTable::builtin().unwrap();
        let loam = *table.get(DEFAULT_TEXTURE).unwrap();
        assert_eq!(table.resolve("").unwrap(), loam);
        assert_eq!(table.resolve("peat").unwrap(), loam);
        assert_eq!(table.resolve("clay").unwrap().ks, 0.03);
    }

    #[test]
    fn unknown_name_without_loam_is_an_error() {
        let table = SoilTextureTable::from_toml_str(
            "[sand]\nporosity = 0.437\neffective_porosity = 0.417\nsuction_head = 4.95\nks = 11.78\n",
        )
        .unwrap();
        assert!(matches!(
            table.resolve("peat"),
            Err(HydroError::UnknownTexture(_))
        ));
    }

    #[test]
    fn texture_builds_green_ampt_model() {
        let table = SoilTextureTable::builtin().unwrap();
        let model = table.resolve("silt loam").unwrap().green_ampt(0.2).unwrap();
        assert_relative_eq!(model.moisture_deficit(), 0.301, epsilon = 1e-12);
    }
}
