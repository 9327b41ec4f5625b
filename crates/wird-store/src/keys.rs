//! Logical keys of the persisted collections

/// Array of challenge plans
pub const CHALLENGES_KEY: &str = "quran_app_challenges";

/// Single challenge object written by releases before multi-plan support
pub const LEGACY_CHALLENGE_KEY: &str = "quran_app_custom_challenge";

/// Array of habit plans
pub const HABIT_PLANS_KEY: &str = "quran_app_habit_plans";

/// Array of cumulative goals
pub const GOALS_KEY: &str = "quran_app_goals";

/// Global streak count
pub const STREAK_COUNT_KEY: &str = "quran_app_streak";

/// Calendar date of the last streak activity
pub const STREAK_DATE_KEY: &str = "quran_app_last_streak_date";
