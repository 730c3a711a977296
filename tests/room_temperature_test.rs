//! Manual hardware tests: 10k NTC behind a 10k series resistor on AIN0, board at room temperature.
//! Run on the Pi with `cargo test --features rpi -- --ignored`.
#![cfg(all(feature = "rpi", any(target_arch = "arm", target_arch = "aarch64")))]

use simple_ads1246::thermistor_reader::{PiConfig, ReadyStrategy, ThermistorReader};

const MIN_ROOM_C: f64 = 10.0;
const MAX_ROOM_C: f64 = 35.0;

fn setup_reader(ready: ReadyStrategy) -> ThermistorReader {
    let config = PiConfig {
        ready,
        ..PiConfig::default()
    };
    ThermistorReader::new(config).unwrap()
}

fn polling_reader() -> ThermistorReader {
    setup_reader(PiConfig::default().ready)
}

#[test]
#[ignore]
fn test_raw_data_not_railed_hardware() {
    let mut reader = polling_reader();

    let raw = reader.get_raw_data().unwrap().value();
    println!("Raw: {}", raw);
    assert!(raw > 0x00_0100 && raw < 0xFF_FF00, "Raw {} sits on a rail (open or shorted input?)", raw);
}

#[test]
#[ignore]
fn test_resistance_hardware() {
    let mut reader = polling_reader();

    let resistance = reader.get_resistance().unwrap();
    println!("Resistance: {:.2} Ohms", resistance);
    assert!(
        (5_000.0..=30_000.0).contains(&resistance),
        "Resistance {} out of the room temperature band of a 10k NTC",
        resistance
    );
}

#[test]
#[ignore]
fn test_temperature_hardware() {
    let mut reader = polling_reader();

    let temperature = reader.get_temperature().unwrap();
    println!("Temperature: {:.2} *C", temperature);
    assert!(
        (MIN_ROOM_C..=MAX_ROOM_C).contains(&temperature),
        "Temperature {} should be between {} and {}",
        temperature,
        MIN_ROOM_C,
        MAX_ROOM_C
    );
}

#[test]
#[ignore]
fn test_edge_ready_hardware() {
    let mut reader = setup_reader(ReadyStrategy::FallingEdge);

    for _ in 0..5 {
        let temperature = reader.get_temperature().unwrap();
        println!("Temperature (edge wait): {:.2} *C", temperature);
        assert!((MIN_ROOM_C..=MAX_ROOM_C).contains(&temperature));
    }
}
