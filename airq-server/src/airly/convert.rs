//! Conversion from Airly wire types to domain types.

use crate::domain::{GeoPoint, Measurement, MeasurementValue, Provider, StationFields, ValueName};

use super::types::{Address, AveragedValues, Installation, MeasurementResponse};

/// Build the human-readable address with a fixed fallback order:
/// country + display address lines, then country + street, then country
/// alone, then empty. Empty strings count as missing.
pub(super) fn display_address(address: &Address) -> String {
    let Some(country) = non_empty(&address.country) else {
        return String::new();
    };

    let line1 = non_empty(&address.display_address1);
    let line2 = non_empty(&address.display_address2);
    let street = non_empty(&address.street);

    match (line1, line2, street) {
        (Some(line1), Some(line2), _) => format!("{country}, {line1}, {line2}"),
        (Some(line1), None, _) => format!("{country}, {line1}"),
        (None, _, Some(street)) => format!("{country}, {street}"),
        _ => country.to_string(),
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Map an Airly installation to the provider-owned station fields.
pub(super) fn installation_to_fields(installation: &Installation) -> StationFields {
    StationFields {
        provider: Provider::Airly,
        provider_id: installation.id.to_string(),
        elevation: installation.elevation,
        location: GeoPoint::from(installation.location),
        display_address: display_address(&installation.address),
    }
}

/// Map a measurement response to the domain measurement.
///
/// CAQI is read from the index entry named "CAQI" (absent or null both end
/// up as `None`); readings with names outside the known set are dropped.
pub(super) fn measurement_to_domain(response: MeasurementResponse) -> Measurement {
    let AveragedValues {
        from_date_time,
        till_date_time,
        values,
        indexes,
    } = response.current;

    let caqi = indexes
        .iter()
        .find(|index| index.name == "CAQI")
        .and_then(|index| index.value);

    let values = values
        .iter()
        .filter_map(|raw| {
            value_name(&raw.name).map(|name| MeasurementValue {
                name,
                value: raw.value,
            })
        })
        .collect();

    Measurement {
        from_date_time,
        till_date_time,
        values,
        caqi,
        approximated: false,
    }
}

fn value_name(name: &str) -> Option<ValueName> {
    match name {
        "PM1" => Some(ValueName::Pm1),
        "PM25" => Some(ValueName::Pm25),
        "PM10" => Some(ValueName::Pm10),
        "PRESSURE" => Some(ValueName::Pressure),
        "HUMIDITY" => Some(ValueName::Humidity),
        "TEMPERATURE" => Some(ValueName::Temperature),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;

    fn address(
        country: Option<&str>,
        street: Option<&str>,
        line1: Option<&str>,
        line2: Option<&str>,
    ) -> Address {
        Address {
            country: country.map(String::from),
            city: None,
            street: street.map(String::from),
            display_address1: line1.map(String::from),
            display_address2: line2.map(String::from),
        }
    }

    #[test]
    fn address_full_chain() {
        let addr = address(Some("Poland"), Some("Mogilska"), Some("Krakow"), Some("Mogilska 27"));
        assert_eq!(display_address(&addr), "Poland, Krakow, Mogilska 27");
    }

    #[test]
    fn address_first_line_only() {
        let addr = address(Some("Poland"), Some("Mogilska"), Some("Krakow"), None);
        assert_eq!(display_address(&addr), "Poland, Krakow");
    }

    #[test]
    fn address_falls_back_to_street() {
        let addr = address(Some("Poland"), Some("Mogilska"), None, None);
        assert_eq!(display_address(&addr), "Poland, Mogilska");
    }

    #[test]
    fn address_country_only() {
        let addr = address(Some("Poland"), None, None, None);
        assert_eq!(display_address(&addr), "Poland");
    }

    #[test]
    fn address_without_country_is_empty() {
        let addr = address(None, Some("Mogilska"), Some("Krakow"), Some("Mogilska 27"));
        assert_eq!(display_address(&addr), "");
    }

    #[test]
    fn address_empty_strings_count_as_missing() {
        let addr = address(Some("Poland"), None, Some(""), None);
        assert_eq!(display_address(&addr), "Poland");
        let addr = address(Some(""), None, Some("Krakow"), None);
        assert_eq!(display_address(&addr), "");
    }

    #[test]
    fn installation_maps_to_fields() {
        let installation = Installation {
            id: 8077,
            location: Coordinates {
                latitude: 50.062006,
                longitude: 19.940984,
            },
            address: address(Some("Poland"), None, Some("Krakow"), None),
            elevation: Some(220.38),
        };

        let fields = installation_to_fields(&installation);
        assert_eq!(fields.provider, Provider::Airly);
        assert_eq!(fields.provider_id, "8077");
        assert_eq!(fields.elevation, Some(220.38));
        assert_eq!(fields.location.coordinates, [19.940984, 50.062006]);
        assert_eq!(fields.display_address, "Poland, Krakow");
    }

    fn response(json: serde_json::Value) -> MeasurementResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn measurement_extracts_caqi_and_known_values() {
        let response = response(serde_json::json!({
            "current": {
                "fromDateTime": "2023-04-01T10:00:00Z",
                "tillDateTime": "2023-04-01T11:00:00Z",
                "values": [
                    {"name": "PM25", "value": 9.4},
                    {"name": "NO2", "value": 11.0},
                    {"name": "TEMPERATURE", "value": 14.7}
                ],
                "indexes": [
                    {"name": "AIRLY_CAQI", "value": 30.0},
                    {"name": "CAQI", "value": 17.2}
                ]
            }
        }));

        let measurement = measurement_to_domain(response);
        assert_eq!(measurement.caqi, Some(17.2));
        // the unknown NO2 reading is dropped
        assert_eq!(measurement.values.len(), 2);
        assert_eq!(measurement.values[0].name, ValueName::Pm25);
        assert_eq!(measurement.values[1].name, ValueName::Temperature);
        assert!(!measurement.approximated);
    }

    #[test]
    fn measurement_without_caqi_index() {
        let response = response(serde_json::json!({
            "current": {
                "fromDateTime": "2023-04-01T10:00:00Z",
                "tillDateTime": "2023-04-01T11:00:00Z",
                "values": [],
                "indexes": [{"name": "AIRLY_CAQI", "value": 30.0}]
            }
        }));

        assert_eq!(measurement_to_domain(response).caqi, None);
    }

    #[test]
    fn measurement_with_null_caqi_value() {
        let response = response(serde_json::json!({
            "current": {
                "fromDateTime": "2023-04-01T10:00:00Z",
                "tillDateTime": "2023-04-01T11:00:00Z",
                "values": [],
                "indexes": [{"name": "CAQI", "value": null}]
            }
        }));

        assert_eq!(measurement_to_domain(response).caqi, None);
    }
}
