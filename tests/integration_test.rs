use approx::assert_relative_eq;
use conto_termico::input::ingest_request;
use conto_termico::output::{result_from_json, result_to_json, Output};
use conto_termico::{calculate, run_request, ContoTermicoError, Intervention};
use pretty_assertions::assert_eq;
use rstest::*;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
struct MemoryOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
    location_keys: Arc<Mutex<Vec<String>>>,
}

impl MemoryOutput {
    fn contents(&self) -> String {
        String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap()
    }
}

struct MemoryWriter(Arc<Mutex<Vec<u8>>>);

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Output for MemoryOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        self.location_keys
            .lock()
            .unwrap()
            .push(location_key.to_string());
        Ok(MemoryWriter(self.buffer.clone()))
    }
}

const HEAT_PUMP_REQUEST: &str = r#"{
    "intervention": "heat_pump",
    "zone": "D",
    "heat_pump_type": "aria_acqua",
    "prated_kw": 10.0,
    "scop": 4.0
}"#;

#[rstest]
fn should_export_result_that_reads_back_identically() {
    let output = MemoryOutput::default();

    let result = run_request(HEAT_PUMP_REQUEST.as_bytes(), output.clone()).unwrap();

    assert_eq!(*output.location_keys.lock().unwrap(), vec!["result".to_string()]);
    let exported = result_from_json(&output.contents()).unwrap();
    assert_eq!(exported, result);
    assert_eq!(result.intervention(), Intervention::HeatPump);
    assert_relative_eq!(result.total_incentive_eur(), 3150.);
    assert_eq!(result.installments(), 1);
}

#[rstest]
fn exported_json_should_preserve_detail_order() {
    let request = ingest_request(HEAT_PUMP_REQUEST.as_bytes()).unwrap();
    let result = calculate(&request).unwrap();

    let json = result_to_json(&result).unwrap();
    let reparsed = result_from_json(&json).unwrap();

    let keys: Vec<&String> = reparsed.details().keys().collect();
    let expected: Vec<&String> = result.details().keys().collect();
    assert_eq!(keys, expected);
    assert_eq!(keys.first().map(|k| k.as_str()), Some("zone"));
}

#[rstest]
fn add_on_should_calculate_embedded_primary_generator_first() {
    let json = r#"{
        "intervention": "pv_storage",
        "primary": {
            "intervention": "heat_pump",
            "zone": "D",
            "heat_pump_type": "aria_acqua",
            "prated_kw": 10.0,
            "scop": 4.0
        },
        "pv_storage": {
            "p_pv_kw": 6.0,
            "cost_pv_eur": 9000.0,
            "storage_kwh": 10.0,
            "cost_storage_eur": 6000.0,
            "public_building": true
        }
    }"#;

    let result = run_request(json.as_bytes(), MemoryOutput::default()).unwrap();

    // 1.0 * (1500 * 6 + 600 * 10) = 15000 clamped to the heat pump's 3150
    assert_eq!(result.intervention(), Intervention::PvStorage);
    assert_eq!(result.total_incentive_eur(), 3150.);
    assert_eq!(result.detail_f64("imax_primary"), Some(3150.));
    assert_eq!(
        result.notes().last().map(String::as_str),
        Some("Applied ceiling Imax = Itot of the primary generator.")
    );
}

#[rstest]
fn add_on_should_accept_plain_primary_total() {
    let json = r#"{
        "intervention": "ev_charging",
        "primary": 3150.0,
        "ev_charging": {
            "eligible_cost_eur": 3000.0,
            "category": "a_tri"
        }
    }"#;

    let result = run_request(json.as_bytes(), MemoryOutput::default()).unwrap();

    assert_eq!(result.intervention(), Intervention::EvCharging);
    assert_relative_eq!(result.total_incentive_eur(), 900.);
}

#[rstest]
#[case::unknown_field(r#"{"intervention": "biomass", "zone": "E", "device": "caldaia", "pn_kw": 30.0, "reduction_pp_percent": 30.0, "colour": "red"}"#)]
#[case::unknown_zone(r#"{"intervention": "biomass", "zone": "G", "device": "caldaia", "pn_kw": 30.0, "reduction_pp_percent": 30.0}"#)]
#[case::not_json("zone = E")]
fn should_reject_ill_formed_requests(#[case] json: &str) {
    let output = MemoryOutput::default();

    let result = run_request(json.as_bytes(), output.clone());

    assert!(matches!(result, Err(ContoTermicoError::InvalidRequest(_))));
    assert!(output.contents().is_empty());
}

#[rstest]
fn should_not_write_output_when_calculation_fails() {
    let json = r#"{
        "intervention": "biomass",
        "zone": "E",
        "device": "caldaia",
        "pn_kw": 0.0,
        "reduction_pp_percent": 30.0
    }"#;
    let output = MemoryOutput::default();

    let result = run_request(json.as_bytes(), output.clone());

    assert!(matches!(
        result,
        Err(ContoTermicoError::FailureInCalculation(_))
    ));
    assert!(output.location_keys.lock().unwrap().is_empty());
}
