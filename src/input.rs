use crate::errors::CalculationError;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::io::{BufReader, Read};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

pub fn ingest_request(json: impl Read) -> Result<CalculationRequest, anyhow::Error> {
    let reader = BufReader::new(json);
    Ok(serde_json::from_reader(reader)?)
}

/// A closed enumeration selected by a tag from the incentive regulation.
pub trait TaggedCategory: FromStr<Err = strum::ParseError> + Into<&'static str> + Copy {
    /// Human-readable name of the enumeration, used in error messages.
    const CATEGORY: &'static str;

    fn tag(self) -> &'static str {
        self.into()
    }
}

/// Parse a free-text tag, ignoring surrounding whitespace and ASCII case.
pub fn parse_tag<T: TaggedCategory>(raw: &str) -> Result<T, CalculationError> {
    T::from_str(raw.trim()).map_err(|_| CalculationError::unknown_category(T::CATEGORY, raw))
}

macro_rules! tagged_category {
    ($category_type:ty, $category:literal) => {
        impl TaggedCategory for $category_type {
            const CATEGORY: &'static str = $category;
        }

        impl TryFrom<String> for $category_type {
            type Error = CalculationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                parse_tag(&value)
            }
        }
    };
}

/// Climate zone (A warmest to F coldest).
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(ascii_case_insensitive)]
pub enum Zone {
    A,
    B,
    C,
    D,
    E,
    F,
}

tagged_category!(Zone, "climate zone");

/// Electric heat pump families of Table 9.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(ascii_case_insensitive)]
pub enum HeatPumpType {
    #[strum(serialize = "aria_acqua")]
    AirToWater,
    #[strum(serialize = "aria_aria_split")]
    AirToAirSplit,
    #[strum(serialize = "aria_aria_vrf")]
    AirToAirVrf,
    #[strum(serialize = "aria_aria_rooftop")]
    AirToAirRooftop,
    #[strum(serialize = "acqua_aria")]
    WaterToAir,
    #[strum(serialize = "acqua_acqua")]
    WaterToWater,
    #[strum(serialize = "salamoia_aria")]
    BrineToAir,
    #[strum(serialize = "salamoia_acqua")]
    BrineToWater,
    #[strum(serialize = "fixed_double_duct")]
    FixedDoubleDuct,
}

tagged_category!(HeatPumpType, "heat pump type");

impl HeatPumpType {
    /// Whether the efficiency is given as COP35 (with a fixed kp) instead of SCOP.
    pub fn uses_cop35(&self) -> bool {
        matches!(self, HeatPumpType::FixedDoubleDuct)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(ascii_case_insensitive)]
pub enum HybridSystemType {
    #[strum(serialize = "ibrido_factory_made")]
    FactoryMadeHybrid,
    #[strum(serialize = "bivalente_addon")]
    BivalentAddOn,
}

tagged_category!(HybridSystemType, "hybrid system type");

#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(ascii_case_insensitive)]
pub enum BiomassDevice {
    #[strum(serialize = "caldaia")]
    Boiler,
    #[strum(serialize = "stufa_termocamino_legna")]
    WoodStove,
    #[strum(serialize = "stufa_termocamino_pellet")]
    PelletStove,
}

tagged_category!(BiomassDevice, "biomass device");

impl BiomassDevice {
    /// Stoves and thermo-fireplaces use the logarithmic power formula.
    pub fn is_stove(&self) -> bool {
        matches!(self, BiomassDevice::WoodStove | BiomassDevice::PelletStove)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(ascii_case_insensitive)]
pub enum SolarApplication {
    /// Domestic hot water
    #[strum(serialize = "acs")]
    DomesticHotWater,
    /// Domestic hot water with low temperature space heating or district network
    #[strum(serialize = "acs_risc_bassaT_rete")]
    DomesticHotWaterAndLowTempHeating,
    #[strum(serialize = "concentrazione")]
    Concentrating,
    #[strum(serialize = "solar_cooling")]
    SolarCooling,
}

tagged_category!(SolarApplication, "solar thermal application");

#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(ascii_case_insensitive)]
pub enum CollectorKind {
    /// Flat plate or evacuated tube collectors, rated by Qcol/Qsol
    #[strum(serialize = "piano_sottovuoto")]
    FlatOrVacuum,
    /// Factory made systems, rated by the QL loss figure in MJ
    #[strum(serialize = "factory_made")]
    FactoryMade,
    #[strum(serialize = "concentrazione")]
    Concentrating,
}

tagged_category!(CollectorKind, "solar collector kind");

/// Additional percentage points of eligible expense for PV + storage.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum BonusPoints {
    #[default]
    None = 0,
    Five = 5,
    Ten = 10,
    Fifteen = 15,
}

impl BonusPoints {
    pub fn points(&self) -> f64 {
        *self as u8 as f64
    }
}

impl TryFrom<u8> for BonusPoints {
    type Error = CalculationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BonusPoints::None),
            5 => Ok(BonusPoints::Five),
            10 => Ok(BonusPoints::Ten),
            15 => Ok(BonusPoints::Fifteen),
            other => Err(CalculationError::unknown_category(
                "bonus percentage points",
                &other.to_string(),
            )),
        }
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(ascii_case_insensitive)]
pub enum EvChargingCategory {
    /// Single phase, 7.4 < P <= 22 kW, capped per charging point
    #[strum(serialize = "a_mono")]
    SinglePhase,
    /// Three phase, 7.4 < P <= 22 kW, capped per charging point
    #[strum(serialize = "a_tri")]
    ThreePhase,
    /// 22 < P <= 50 kW, capped per kW
    #[strum(serialize = "b_22_50")]
    From22To50Kw,
    /// 50 < P <= 100 kW, capped per infrastructure
    #[strum(serialize = "b_50_100")]
    From50To100Kw,
    /// P > 100 kW, capped per infrastructure
    #[strum(serialize = "b_gt100")]
    Above100Kw,
}

tagged_category!(EvChargingCategory, "EV charging category");

impl EvChargingCategory {
    pub fn is_power_proportional(&self) -> bool {
        matches!(self, EvChargingCategory::From22To50Kw)
    }
}

fn default_kp() -> f64 {
    1.0
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeatPumpInput {
    pub zone: Zone,
    pub heat_pump_type: HeatPumpType,
    /// Rated heating power, in kW
    pub prated_kw: f64,
    pub scop: Option<f64>,
    /// Only used (and required) by fixed double duct units
    pub cop35: Option<f64>,
    #[serde(default = "default_kp")]
    pub kp: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HybridSystemInput {
    pub system_type: HybridSystemType,
    /// Nominal power of the boiler, in kW
    pub boiler_pn_kw: f64,
    pub heat_pump: HeatPumpInput,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BiomassInput {
    pub zone: Zone,
    pub device: BiomassDevice,
    /// Nominal power, in kW
    pub pn_kw: f64,
    /// Reduction of primary particulate emissions, in percent
    pub reduction_pp_percent: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SolarThermalInput {
    pub application: SolarApplication,
    /// Declared gross area of the whole solar field, in m2
    pub sl_m2: f64,
    pub modules_n: u32,
    /// Gross area of a single module, in m2
    pub module_ag_m2: f64,
    pub collector_kind: CollectorKind,
    /// Qcol or Qsol, in kWht/year per module
    pub q_kwht_per_module: Option<f64>,
    /// QL, in MJ/year per module
    pub ql_mj_per_module: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PvStorageInput {
    pub p_pv_kw: f64,
    pub cost_pv_eur: f64,
    #[serde(default)]
    pub storage_kwh: f64,
    #[serde(default)]
    pub cost_storage_eur: f64,
    #[serde(default)]
    pub bonus_points: BonusPoints,
    #[serde(default)]
    pub public_building: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvChargingInput {
    pub eligible_cost_eur: f64,
    pub category: EvChargingCategory,
    /// Only used (and required) by the power-proportional category
    pub power_kw: Option<f64>,
}

/// A primary generator whose total incentive sets the ceiling of an add-on.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "intervention", rename_all = "snake_case")]
pub enum PrimaryGenerator {
    HeatPump(HeatPumpInput),
    HybridSystem(HybridSystemInput),
    Biomass(BiomassInput),
    SolarThermal(SolarThermalInput),
}

/// The ceiling of an add-on: either a known total or a generator to calculate first.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryIncentive {
    TotalIncentiveEur(f64),
    Generator(PrimaryGenerator),
}

// Dispatch on the JSON shape first, so that errors inside an embedded generator keep their message.
impl<'de> Deserialize<'de> for PrimaryIncentive {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Value = Deserialize::deserialize(deserializer)?;
        match value {
            Value::Number(total) => total
                .as_f64()
                .map(PrimaryIncentive::TotalIncentiveEur)
                .ok_or_else(|| de::Error::custom("primary total incentive is not a valid number")),
            Value::Object(_) => PrimaryGenerator::deserialize(value)
                .map(PrimaryIncentive::Generator)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "primary must be a total incentive in EUR or a primary generator request, found {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "intervention", rename_all = "snake_case")]
pub enum CalculationRequest {
    HeatPump(HeatPumpInput),
    HybridSystem(HybridSystemInput),
    Biomass(BiomassInput),
    SolarThermal(SolarThermalInput),
    PvStorage {
        primary: PrimaryIncentive,
        pv_storage: PvStorageInput,
    },
    EvCharging {
        primary: PrimaryIncentive,
        ev_charging: EvChargingInput,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case("aria_acqua", HeatPumpType::AirToWater)]
    #[case("  ARIA_ARIA_SPLIT ", HeatPumpType::AirToAirSplit)]
    #[case("Fixed_Double_Duct", HeatPumpType::FixedDoubleDuct)]
    fn should_parse_heat_pump_tags(#[case] raw: &str, #[case] expected: HeatPumpType) {
        assert_eq!(parse_tag::<HeatPumpType>(raw).unwrap(), expected);
    }

    #[rstest]
    fn should_parse_mixed_case_solar_tag_from_lower_case() {
        assert_eq!(
            parse_tag::<SolarApplication>("acs_risc_bassat_rete").unwrap(),
            SolarApplication::DomesticHotWaterAndLowTempHeating
        );
    }

    #[rstest]
    fn should_reject_unknown_tag() {
        assert_eq!(
            parse_tag::<BiomassDevice>("camino_aperto"),
            Err(CalculationError::UnknownCategory {
                category: "biomass device",
                value: "camino_aperto".to_string(),
            })
        );
    }

    #[rstest]
    fn tags_should_survive_display_and_parse() {
        for zone in Zone::iter() {
            assert_eq!(parse_tag::<Zone>(&zone.to_string()).unwrap(), zone);
        }
        for category in EvChargingCategory::iter() {
            assert_eq!(parse_tag::<EvChargingCategory>(category.tag()).unwrap(), category);
        }
    }

    #[rstest]
    fn should_convert_bonus_points() {
        assert_eq!(BonusPoints::try_from(10).unwrap(), BonusPoints::Ten);
        assert_eq!(BonusPoints::Fifteen.points(), 15.);
        assert!(matches!(
            BonusPoints::try_from(7),
            Err(CalculationError::UnknownCategory { .. })
        ));
    }

    #[rstest]
    fn should_deserialize_heat_pump_request_with_default_kp() {
        let request: CalculationRequest = serde_json::from_value(json!({
            "intervention": "heat_pump",
            "zone": "D",
            "heat_pump_type": "aria_acqua",
            "prated_kw": 10.0,
            "scop": 4.0,
            "cop35": null
        }))
        .unwrap();

        assert_eq!(
            request,
            CalculationRequest::HeatPump(HeatPumpInput {
                zone: Zone::D,
                heat_pump_type: HeatPumpType::AirToWater,
                prated_kw: 10.,
                scop: Some(4.),
                cop35: None,
                kp: 1.,
            })
        );
    }

    #[rstest]
    fn should_deserialize_add_on_with_embedded_primary_generator() {
        let request: CalculationRequest = serde_json::from_value(json!({
            "intervention": "ev_charging",
            "primary": {
                "intervention": "biomass",
                "zone": "E",
                "device": "caldaia",
                "pn_kw": 30.0,
                "reduction_pp_percent": 30.0
            },
            "ev_charging": {
                "eligible_cost_eur": 3000.0,
                "category": "a_tri",
                "power_kw": null
            }
        }))
        .unwrap();

        let CalculationRequest::EvCharging { primary, .. } = request else {
            panic!("expected an EV charging request");
        };
        assert!(matches!(
            primary,
            PrimaryIncentive::Generator(PrimaryGenerator::Biomass(_))
        ));
    }

    #[rstest]
    fn should_deserialize_add_on_with_plain_ceiling_and_defaults() {
        let request: CalculationRequest = serde_json::from_value(json!({
            "intervention": "pv_storage",
            "primary": 15000,
            "pv_storage": { "p_pv_kw": 6.0, "cost_pv_eur": 9000.0, "bonus_points": 5 }
        }))
        .unwrap();

        assert_eq!(
            request,
            CalculationRequest::PvStorage {
                primary: PrimaryIncentive::TotalIncentiveEur(15000.),
                pv_storage: PvStorageInput {
                    p_pv_kw: 6.,
                    cost_pv_eur: 9000.,
                    storage_kwh: 0.,
                    cost_storage_eur: 0.,
                    bonus_points: BonusPoints::Five,
                    public_building: false,
                },
            }
        );
    }

    #[rstest]
    fn should_refuse_unknown_tag_in_request() {
        let error = serde_json::from_value::<CalculationRequest>(json!({
            "intervention": "biomass",
            "zone": "E",
            "device": "camino_aperto",
            "pn_kw": 30.0,
            "reduction_pp_percent": 30.0
        }))
        .unwrap_err();

        assert!(error.to_string().contains("Unknown biomass device"));
    }

    #[rstest]
    fn should_keep_tag_error_of_embedded_primary_generator() {
        let error = serde_json::from_value::<CalculationRequest>(json!({
            "intervention": "ev_charging",
            "primary": {
                "intervention": "biomass",
                "zone": "E",
                "device": "camino_aperto",
                "pn_kw": 30.0,
                "reduction_pp_percent": 30.0
            },
            "ev_charging": {"eligible_cost_eur": 3000.0, "category": "a_tri"}
        }))
        .unwrap_err();

        assert!(error
            .to_string()
            .contains("Unknown biomass device: 'camino_aperto'"));
    }

    #[rstest]
    #[case(json!("3150"))]
    #[case(json!([3150.0]))]
    #[case(json!(null))]
    fn should_refuse_primary_that_is_neither_amount_nor_generator(#[case] primary: Value) {
        let error = serde_json::from_value::<PrimaryIncentive>(primary).unwrap_err();

        assert!(error
            .to_string()
            .starts_with("primary must be a total incentive in EUR or a primary generator request"));
    }

    #[rstest]
    fn should_refuse_unknown_fields() {
        let result = serde_json::from_value::<BiomassInput>(json!({
            "zone": "E",
            "device": "caldaia",
            "pn_kw": 30.0,
            "reduction_pp_percent": 30.0,
            "efficiency": 0.9
        }));

        assert!(result.is_err());
    }
}
