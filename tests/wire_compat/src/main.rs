fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use endbug_protocol::{Level, LogEvent, Mode};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file captured from the original JS client.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON numbers so integer-valued floats compare equal.
    ///
    /// The JS client serializes `64.0` as `64`; Rust keeps the float
    /// notation. Both are semantically identical.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => {
                if let Some(f) = n.as_f64() {
                    serde_json::json!(f)
                } else {
                    v.clone()
                }
            }
            serde_json::Value::Object(map) => {
                let normalized: serde_json::Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect();
                serde_json::Value::Object(normalized)
            }
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture into [`LogEvent`], re-serializes it, and
    /// compares the JSON values (order-independent, float-normalized).
    fn roundtrip(name: &str) -> LogEvent {
        let fixture = load_fixture(name);
        let parsed: LogEvent = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  JS:   {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_log_event() {
        let event = roundtrip("log_event.json");
        assert_eq!(event.level, Level::Error);
        assert_eq!(event.meta.mode, Mode::External);
        assert_eq!(event.meta.from, "endbug");
        assert!(event.meta.ip.is_none());
    }

    #[test]
    fn fixture_log_event_say() {
        let event = roundtrip("log_event_say.json");
        assert_eq!(event.level, Level::Say);
        assert_eq!(event.tick, -1, "tick sentinel survives the wire");
        assert_eq!(event.context, serde_json::json!({}));
    }

    #[test]
    fn fixture_log_event_annotated() {
        // Server-side shape, after the client address was injected.
        let event = roundtrip("log_event_annotated.json");
        assert_eq!(event.meta.ip.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn context_missing_on_wire_defaults_to_empty() {
        let mut fixture = load_fixture("log_event.json");
        fixture.as_object_mut().unwrap().remove("context");
        let event: LogEvent = serde_json::from_value(fixture).unwrap();
        assert_eq!(event.context, serde_json::json!({}));
    }
}
