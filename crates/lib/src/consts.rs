//! Crate-wide constants.

pub const APP_NAME: &str = "modswap";

/// Properties file read from the workspace root.
pub const PROPERTIES_FILE: &str = "local.properties";

/// Declaration file read from the workspace root.
pub const WORKSPACE_FILE: &str = "modswap.toml";

/// Master switch. Absent or unparsable means disabled.
pub const ENABLE_KEY: &str = "modswap.enable";

/// Comma-separated module paths that are built from source.
pub const WORKSPACE_KEY: &str = "modswap.workspace";

/// Comma-separated grouping paths that are never built.
pub const SKIP_PARENTS_KEY: &str = "modswap.skipParents";

/// Classification applied when no workspace list is configured.
pub const DEFAULT_CLASSIFICATION_KEY: &str = "modswap.defaultClassification";

/// Artifact store root override.
pub const STORE_KEY: &str = "modswap.store";

/// Environment override for the artifact store root.
pub const STORE_ENV: &str = "MODSWAP_STORE";

pub const DEFAULT_SKIP_PARENT_PATHS: &[&str] = &[":feature", ":infra", ":ui"];

/// Separator between the components of an artifact file name.
pub const SEPARATOR: char = '-';

pub const DEFAULT_ARTIFACT_EXTENSION: &str = "aar";

/// Suffix of files still being written into a store or repository.
pub const PARTIAL_SUFFIX: &str = "part";

/// Versions ending with this marker are published to the snapshot repository.
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Default output location of an assemble step, relative to the module directory.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "build/outputs/{name}-{variant}.{ext}";
