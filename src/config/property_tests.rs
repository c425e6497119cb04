//! Property-based tests for configuration module
//!
//! These tests use proptest to generate random configurations and verify
//! validation invariants and serialization round trips.

use super::*;
use proptest::prelude::*;

prop_compose! {
    fn valid_output(index: usize)(
        x in -4000i32..4000,
        y in -4000i32..4000,
        width in 1u32..8000,
        height in 2u32..8000,
        top_share in 0.0f64..0.45,
        bottom_share in 0.0f64..0.45,
    ) -> OutputConfig {
        OutputConfig {
            name: format!("OUT-{}", index),
            x,
            y,
            width,
            height,
            reserved_top: (height as f64 * top_share) as u32,
            reserved_bottom: (height as f64 * bottom_share) as u32,
        }
    }
}

prop_compose! {
    fn valid_config()(
        debug in any::<bool>(),
        separate_raise in any::<bool>(),
        workspaces in 1u32..=MAX_WORKSPACES,
        kill_clients in any::<bool>(),
        a in valid_output(0),
        b in valid_output(1),
        seat_count in 1usize..4,
    ) -> OrbitConfig {
        OrbitConfig {
            general: GeneralConfig { debug },
            shell: ShellConfig { separate_raise, workspaces, kill_clients },
            outputs: vec![a, b],
            seats: (0..seat_count)
                .map(|i| SeatConfig { name: format!("seat{}", i) })
                .collect(),
        }
    }
}

proptest! {
    #[test]
    fn prop_valid_configs_validate(config in valid_config()) {
        prop_assert!(config.validate().is_ok());
    }

    #[test]
    fn prop_toml_round_trip(config in valid_config()) {
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: OrbitConfig = toml::from_str(&text).unwrap();
        prop_assert_eq!(parsed, config);
    }

    #[test]
    fn prop_available_geometry_inside_output(output in valid_output(0)) {
        let full = output.geometry();
        let available = output.available_geometry();
        prop_assert!(available.y >= full.y);
        prop_assert!(available.height <= full.height);
        prop_assert!(!available.is_empty());
        prop_assert_eq!(available.width, full.width);
    }

    #[test]
    fn prop_out_of_range_workspaces_rejected(workspaces in (MAX_WORKSPACES + 1)..10_000u32) {
        let mut config = OrbitConfig::default();
        config.shell.workspaces = workspaces;
        prop_assert!(config.validate().is_err());
    }
}
