/// Customers (beta users), keyed by id, unique by normalized email
pub const USERS: &str = "users";

/// Calculator definitions shown on the dashboard
pub const CALCULATORS: &str = "calculators";

/// Lesson content
pub const LESSONS: &str = "lessons";

/// Waitlist signups, unique by normalized email
pub const WAITLIST: &str = "waitlist";

/// Tables every backup artifact must contain, in import order
pub const BACKUP_TABLES: [&str; 3] = [USERS, CALCULATORS, LESSONS];
