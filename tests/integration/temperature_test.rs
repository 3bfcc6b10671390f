use hostscope::core::system_info::temperature::{
    is_mock, TemperatureDetector, TemperatureSource, MOCK_TEMPERATURE_LABEL,
};
use hostscope::core::system_info::types::TemperatureReading;
use hostscope::platform::sensors::ThermalZoneSource;
use hostscope::{HostscopeError, Result};
use std::fs;

struct Unavailable;

impl TemperatureSource for Unavailable {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        Err(HostscopeError::source_unavailable("not on this machine"))
    }
}

struct Fixed(Vec<TemperatureReading>);

impl TemperatureSource for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_mock_when_every_source_fails() {
    let detector = TemperatureDetector::new(vec![
        Box::new(Unavailable),
        Box::new(Fixed(vec![TemperatureReading::new("Core 0", 180.0)])),
    ]);

    for _ in 0..50 {
        let readings = detector.detect();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].label, MOCK_TEMPERATURE_LABEL);
        assert!(readings[0].current >= 35.0 && readings[0].current < 65.0);
    }
}

#[test]
fn test_thermal_zone_tree_feeds_detector() {
    let root = tempfile::tempdir().unwrap();
    for (zone, kind, temp) in [("thermal_zone0", "acpitz", "47000"), ("thermal_zone1", "x86_pkg_temp", "-5000")] {
        let dir = root.path().join(zone);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), kind).unwrap();
        fs::write(dir.join("temp"), temp).unwrap();
    }

    let detector = TemperatureDetector::new(vec![
        Box::new(Unavailable),
        Box::new(ThermalZoneSource::new(root.path())),
        Box::new(Fixed(vec![TemperatureReading::new("never", 50.0)])),
    ]);

    let readings = detector.detect();
    assert_eq!(readings, vec![TemperatureReading::new("acpitz", 47.0)]);
    assert!(!is_mock(&readings[0]));
}

#[test]
fn test_every_returned_reading_is_in_range() {
    let detector = TemperatureDetector::new(vec![Box::new(Fixed(vec![
        TemperatureReading::new("Tctl", 0.0),
        TemperatureReading::new("Tdie", 150.0),
        TemperatureReading::new("bogus", 150.5),
        TemperatureReading::new("cold", -1.0),
    ]))]);

    let readings = detector.detect();
    assert_eq!(readings.len(), 2);
    assert!(readings.iter().all(|r| (0.0..=150.0).contains(&r.current)));
}
