use url::form_urlencoded;
use uxspeed_core::{Overrides, ParameterState, ParameterTable, RawValue};

/// Reads `name=value&...` pairs into overrides. A leading `?` is ignored and
/// later duplicates win.
pub fn parse_query(query: &str) -> Overrides {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(name, value)| (name.into_owned(), RawValue::Text(value.into_owned())))
        .collect()
}

/// Writes every serializable parameter's current value, in declared order.
pub fn serialize_query(table: &ParameterTable, state: &ParameterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for spec in table.iter().filter(|spec| spec.serialize) {
        if let Some(value) = state.value(&spec.name) {
            serializer.append_pair(&spec.name, &value.to_string());
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uxspeed_core::ParameterRegistry;

    #[test]
    fn parses_pairs_and_leading_question_mark() {
        let overrides = parse_query("?volume=50000&mu=1.2&empty=");
        assert_eq!(overrides.get("volume"), Some(&RawValue::Text("50000".into())));
        assert_eq!(overrides.get("mu").and_then(RawValue::parse), Some(1.2));
        assert_eq!(overrides.get("empty").and_then(RawValue::parse), None);
    }

    #[test]
    fn serializes_only_flagged_parameters() {
        let registry = ParameterRegistry::standard().unwrap();
        let state = registry.initialize(&Overrides::new());
        let query = serialize_query(registry.table(), &state);
        assert!(query.starts_with("bucketSize=0.5&volume=100000&mu=1.5"));
        assert!(query.contains("conversionPovertyLine=1.2"));
        assert!(query.ends_with("displayMax=15"));
        assert!(!query.contains("maxTime"));
    }

    #[test]
    fn query_round_trip_restores_state() {
        let registry = ParameterRegistry::standard().unwrap();
        let mut state = registry.initialize(&Overrides::new());
        registry.set_value(&mut state, "sigma", 1.25).unwrap();
        registry.set_value(&mut state, "averageValue", 42.5).unwrap();

        let query = serialize_query(registry.table(), &state);
        let restored = registry.initialize(&parse_query(&query));
        assert_eq!(restored, state);
    }
}
