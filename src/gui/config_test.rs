#[cfg(test)]
mod tests {

    use crate::gui::ViewerConfig;

    #[test]
    fn test_viewer_config_default() {
        let config = ViewerConfig::default();
        assert!(config.last_uri.is_none());
        assert!(config.animate);
        assert!(config.can_load);
    }

    #[test]
    fn test_viewer_config_serialization() {
        let mut config = ViewerConfig::default();
        config.last_uri = Some("http://example.com/kitty.gif".to_string());
        config.animate = false;

        let serialized = serde_json::to_string(&config).expect("Failed to serialize config");
        let deserialized: ViewerConfig =
            serde_json::from_str(&serialized).expect("Failed to deserialize config");

        assert_eq!(config.last_uri, deserialized.last_uri);
        assert_eq!(config.animate, deserialized.animate);
        assert_eq!(config.can_load, deserialized.can_load);
    }

    #[test]
    fn test_viewer_config_rejects_partial_files() {
        // load() falls back to defaults when this fails; the parse itself
        // must report the problem.
        let deserialized = serde_json::from_str::<ViewerConfig>("{\"animate\": true}");
        assert!(deserialized.is_err());

        let config: ViewerConfig = serde_json::from_str(
            "{\"last_uri\": null, \"animate\": true, \"can_load\": true}",
        )
        .unwrap();
        assert!(config.animate);
    }
}
