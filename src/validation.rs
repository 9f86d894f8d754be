use serde::Serialize;
use validator::Validate;

use crate::errors::ValidationError;
use crate::models::{Feature, RawFields, SoilSample};

pub const PH_MIN: f64 = 0.0;
pub const PH_MAX: f64 = 14.0;

// ==============================================================================
// SAMPLE PARSING
// ==============================================================================

/// Turns raw form input into a [`SoilSample`]. Fields are checked in
/// [`Feature::ALL`] order and the first problem found is returned.
pub fn parse_sample(raw: &RawFields) -> Result<SoilSample, ValidationError> {
    let mut values = [0.0_f64; 7];
    for (slot, feature) in values.iter_mut().zip(Feature::ALL) {
        *slot = parse_field(raw, feature)?;
    }

    let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall] = values;
    let sample = SoilSample {
        nitrogen,
        phosphorus,
        potassium,
        temperature,
        humidity,
        ph,
        rainfall,
    };

    sample.validate().map_err(|_| ValidationError::OutOfRange {
        feature: Feature::Ph,
        min: PH_MIN,
        max: PH_MAX,
    })?;

    Ok(sample)
}

fn parse_field(raw: &RawFields, feature: Feature) -> Result<f64, ValidationError> {
    let value = raw
        .get(feature.key())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing(feature))?;

    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(ValidationError::NotANumber(feature))
}

// ==============================================================================
// ADVISORY RANGES
// ==============================================================================

/// Typical agronomic range for a field. Only the pH bounds are enforced;
/// the others are hints shown on the form.
pub fn advisory_range(feature: Feature) -> (f64, f64) {
    match feature {
        Feature::Nitrogen | Feature::Phosphorus | Feature::Potassium => (0.0, 200.0),
        Feature::Temperature => (-10.0, 50.0),
        Feature::Humidity => (0.0, 100.0),
        Feature::Ph => (PH_MIN, PH_MAX),
        Feature::Rainfall => (0.0, 1000.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Advisory {
    pub feature: Feature,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Fields of an accepted sample that sit outside their advisory range.
pub fn advisories(sample: &SoilSample) -> Vec<Advisory> {
    Feature::ALL
        .into_iter()
        .filter_map(|feature| {
            let value = sample.value(feature);
            let (min, max) = advisory_range(feature);
            (value < min || value > max).then_some(Advisory { feature, value, min, max })
        })
        .collect()
}

/// Whether a raw value parses to a number outside the field's advisory range.
/// Unparseable input is left to [`parse_sample`] to report.
pub fn outside_advisory(feature: Feature, raw: &str) -> bool {
    let (min, max) = advisory_range(feature);
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v < min || v > max,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> RawFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid() -> RawFields {
        fields(&[
            ("N", "90"),
            ("P", "42"),
            ("K", "43"),
            ("temperature", "20.8"),
            ("humidity", "82"),
            ("ph", "6.5"),
            ("rainfall", "202.9"),
        ])
    }

    #[test]
    fn parses_reference_sample() {
        let sample = parse_sample(&valid()).unwrap();
        assert_eq!(sample.nitrogen, 90.0);
        assert_eq!(sample.temperature, 20.8);
        assert_eq!(sample.rainfall, 202.9);
    }

    #[test]
    fn every_blank_field_is_reported_as_missing() {
        for feature in Feature::ALL {
            let mut raw = valid();
            raw.insert(feature.key().to_string(), "   ".to_string());
            assert_eq!(parse_sample(&raw), Err(ValidationError::Missing(feature)));

            raw.remove(feature.key());
            assert_eq!(parse_sample(&raw), Err(ValidationError::Missing(feature)));
        }
    }

    #[test]
    fn every_non_numeric_field_is_rejected() {
        for feature in Feature::ALL {
            for bad in ["abc", "NaN", "inf", "-infinity", "1,5"] {
                let mut raw = valid();
                raw.insert(feature.key().to_string(), bad.to_string());
                assert_eq!(
                    parse_sample(&raw),
                    Err(ValidationError::NotANumber(feature)),
                    "{feature} = {bad:?}"
                );
            }
        }
    }

    #[test]
    fn first_error_wins_in_field_order() {
        let mut raw = valid();
        raw.insert("K".to_string(), "x".to_string());
        raw.remove("P");
        raw.insert("ph".to_string(), "20".to_string());
        assert_eq!(parse_sample(&raw), Err(ValidationError::Missing(Feature::Phosphorus)));
    }

    #[test]
    fn ph_bounds_are_inclusive() {
        for ok in ["0", "14", "0.0", "14.00"] {
            let mut raw = valid();
            raw.insert("ph".to_string(), ok.to_string());
            assert!(parse_sample(&raw).is_ok(), "ph {ok} should be accepted");
        }

        for bad in ["-0.01", "14.01"] {
            let mut raw = valid();
            raw.insert("ph".to_string(), bad.to_string());
            let err = parse_sample(&raw).unwrap_err();
            assert_eq!(
                err,
                ValidationError::OutOfRange { feature: Feature::Ph, min: 0.0, max: 14.0 }
            );
            assert_eq!(err.to_string(), "Soil pH must be between 0 and 14");
        }
    }

    #[test]
    fn advisory_ranges_flag_but_do_not_reject() {
        let mut raw = valid();
        raw.insert("rainfall".to_string(), "1500".to_string());
        raw.insert("temperature".to_string(), "-12".to_string());

        let sample = parse_sample(&raw).unwrap();
        let flagged: Vec<Feature> = advisories(&sample).iter().map(|a| a.feature).collect();
        assert_eq!(flagged, vec![Feature::Temperature, Feature::Rainfall]);
    }

    #[test]
    fn outside_advisory_ignores_garbage() {
        assert!(outside_advisory(Feature::Humidity, "101"));
        assert!(!outside_advisory(Feature::Humidity, "100"));
        assert!(!outside_advisory(Feature::Humidity, "wet"));
    }
}
