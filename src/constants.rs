/// 固定长度问卷的总题数
pub const FIXED_TOTAL_QUESTIONS: u32 = 10;

/// 可变长度问卷的总题数
pub const VARIABLE_TOTAL_QUESTIONS: u32 = 6;

/// `provincia_dificultad` 缺省时的取值（中等难度）
pub const DEFAULT_PROVINCIA_DIFICULTAD: i64 = 3;

/// Maximum request body size: 64 KiB.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

pub const CODE_MISSING_FIELDS: &str = "MISSING_FIELDS";
pub const CODE_INVALID_DATA_TYPES: &str = "INVALID_DATA_TYPES";
pub const CODE_INVALID_AGE: &str = "INVALID_AGE";
pub const CODE_INVALID_RANGE: &str = "INVALID_RANGE";
pub const CODE_UNKNOWN_CATEGORY: &str = "UNKNOWN_CATEGORY";
pub const CODE_MODEL_NOT_LOADED: &str = "MODEL_NOT_LOADED";
pub const CODE_INTERNAL_ERROR: &str = "INTERNAL_ERROR";
pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
pub const CODE_METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
pub const CODE_PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
