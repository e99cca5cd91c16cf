/// Snapshot shape version. Bump only on breaking changes to the snapshot layout.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Major component readers accept.
pub const SNAPSHOT_MAJOR: u64 = 1;

pub const CONCEPT_PREFIX: &str = "CONCEPT_";
pub const VALUESET_PREFIX: &str = "VALUESET_";

/// Upper-snake-case remainder of a token after its namespace prefix.
pub const TOKEN_BODY_PATTERN: &str = "[A-Z0-9][A-Z0-9_]*";

/// Extensions of application source files (script + markup).
pub const SOURCE_EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

pub const DEFAULT_CONFIG_FILE: &str = "kernel-drift.toml";
pub const DEFAULT_SNAPSHOT_PATH: &str = "kernel/registry.snapshot.json";
pub const DEFAULT_PORTAL_SNAPSHOT_PATH: &str = "apps/portal/kernel/registry.snapshot.json";
pub const DEFAULT_ALLOWLIST_PATH: &str = ".kernel-drift-allowlist.json";
pub const DEFAULT_PROFILE: &str = "root";

pub const ENV_REGISTRY_URL: &str = "SUPABASE_URL";
pub const ENV_REGISTRY_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const ENV_LOG_FILTER: &str = "KERNEL_DRIFT_LOG";

pub const DEFAULT_CONCEPTS_TABLE: &str = "kernel_concept_registry";
pub const DEFAULT_VALUE_SETS_TABLE: &str = "kernel_value_set_registry";
pub const DEFAULT_VALUES_TABLE: &str = "kernel_value_set_values";

/// Rows requested per live fetch. Servers may cap lower; paging follows `Content-Range`.
pub const REGISTRY_PAGE_SIZE: usize = 1000;

pub const DEFAULT_EXCLUDE_DIRS: [&str; 9] = [
    "node_modules",
    ".next",
    "dist",
    "build",
    "out",
    "coverage",
    ".git",
    ".turbo",
    "target",
];

/// The drift scripts define the token patterns as literals; scanning them would flag themselves.
pub const DEFAULT_EXCLUDE_FILES: [&str; 3] = [
    "**/audit-kernel-drift.ts",
    "**/check-l0-drift*.ts",
    "**/kernel-drift.config.*",
];

pub const DEFAULT_TEST_FILES: [&str; 3] = ["**/*.test.*", "**/*.spec.*", "**/__tests__/**"];
