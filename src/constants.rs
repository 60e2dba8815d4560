/// Default prefix for backup artifact file names
pub const DEFAULT_BACKUP_FILE_PREFIX: &str = "zerofinanx";

/// File extension shared by every backup artifact
pub const BACKUP_EXTENSION: &str = "db";

/// Maximum accepted size of an uploaded backup (50MB)
pub const DEFAULT_MAX_IMPORT_SIZE_BYTES: usize = 52_428_800;

/// Number of backups returned by the status endpoint
pub const RECENT_BACKUPS_LIMIT: usize = 10;

/// Multipart field carrying the uploaded database file
pub const IMPORT_FILE_FIELD: &str = "backupFile";

/// Multipart field carrying the import strategy
pub const IMPORT_STRATEGY_FIELD: &str = "strategy";

/// Header used by admin clients to authenticate
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_EMAIL_REQUIRED: &str = "Email is required";

pub const ERR_INVALID_EMAIL: &str = "Invalid email format";

pub const ERR_CUSTOMER_FIELDS_REQUIRED: &str = "First name, last name, and email are required";

pub const ERR_INVALID_STRATEGY: &str = "Invalid strategy. Must be \"merge\" or \"replace\"";

pub const ERR_NO_BACKUP_FILE: &str = "No backup file provided";

pub const ERR_FILE_NAME_REQUIRED: &str = "File name is required";
