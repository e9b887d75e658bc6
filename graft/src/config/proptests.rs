//! Property-based tests for configuration system.

use std::path::PathBuf;

use proptest::prelude::*;

use super::merger::ConfigMerger;
use super::schema::{Config, FileConfig, OutputFormat, SourceConfig};
use super::validator::ConfigValidator;

fn source_strategy() -> impl Strategy<Value = SourceConfig> {
    prop_oneof![
        "[a-z]{1,8}\\.json".prop_map(SourceConfig::file),
        prop::collection::vec("[a-z-]{1,8}", 1..4).prop_map(SourceConfig::command),
    ]
}

fn format_strategy() -> impl Strategy<Value = OutputFormat> {
    prop_oneof![
        Just(OutputFormat::Table),
        Just(OutputFormat::Json),
        Just(OutputFormat::Csv),
    ]
}

fn files_strategy() -> impl Strategy<Value = FileConfig> {
    (
        prop::option::of("[a-z]{1,8}\\.tf"),
        prop::option::of("\\.[a-z]{1,4}"),
        prop::option::of("\\.[a-z]{1,4}"),
    )
        .prop_map(|(default_filename, source_suffix, config_suffix)| FileConfig {
            default_filename: default_filename.map(PathBuf::from),
            source_suffix,
            config_suffix,
        })
}

// Strategy for generating valid configs
fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of("[a-z]{1,8}\\.yaml"),
        prop::option::of(source_strategy()),
        prop::option::of(source_strategy()),
        prop::option::of(prop::collection::vec("[a-z-]{1,8}", 1..4)),
        prop::option::of(files_strategy()),
        prop::option::of(format_strategy()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(
            |(declarations, state, schemas, import_command, files, output_format, auto_approve)| Config {
                declarations: declarations.map(PathBuf::from),
                state,
                schemas,
                import_command,
                files,
                output_format,
                auto_approve,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // Set fields of the higher-precedence config always win
    #[test]
    fn config_merge_higher_precedence_wins(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);

        prop_assert_eq!(result.declarations.clone(), high.declarations.clone().or(low.declarations.clone()));
        prop_assert_eq!(result.state.clone(), high.state.clone().or(low.state.clone()));
        prop_assert_eq!(result.schemas.clone(), high.schemas.clone().or(low.schemas.clone()));
        prop_assert_eq!(result.import_command.clone(), high.import_command.clone().or(low.import_command.clone()));
        prop_assert_eq!(result.output_format, high.output_format.or(low.output_format));
        prop_assert_eq!(result.auto_approve, high.auto_approve.or(low.auto_approve));
    }

    // Merging a config into itself changes nothing
    #[test]
    fn config_merge_idempotent(config in config_strategy()) {
        let mut result = config.clone();
        ConfigMerger::merge_into(&mut result, &config);
        prop_assert_eq!(result, config);
    }

    // Merging an empty config changes nothing
    #[test]
    fn config_merge_empty_is_identity(config in config_strategy()) {
        let mut result = config.clone();
        ConfigMerger::merge_into(&mut result, &Config::default());
        prop_assert_eq!(result, config);
    }

    // Generated configs pass validation, and merging keeps them valid
    #[test]
    fn merged_valid_configs_stay_valid(low in config_strategy(), high in config_strategy()) {
        prop_assert!(ConfigValidator::validate(&low).is_ok());
        let mut result = low;
        ConfigMerger::merge_into(&mut result, &high);
        prop_assert!(ConfigValidator::validate(&result).is_ok());
    }
}
