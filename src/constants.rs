// Game timing constants
pub const TICK_INTERVAL_MS: u64 = 100;
pub const MAX_TICK_DT_MS: u64 = 500;
pub const FEEDBACK_DELAY_MS: u64 = 1000;

// Countdown constants
pub const MAX_TIME: f64 = 100.0;
pub const BASE_DECREMENT: f64 = 0.5; // per tick interval
pub const DECAY_RATE: f64 = 0.01; // per elapsed session second
pub const PRESSURE_RATE: f64 = 0.02; // per elapsed session second, must exceed DECAY_RATE
pub const TIME_BONUS: f64 = 15.0;

// Scoring and leveling constants
pub const CORRECT_REWARD: u32 = 10;
pub const STREAK_FOR_LEVEL_UP: u32 = 5;
pub const MAX_GENERATOR_LEVEL: u32 = 4;

// Runner minigame
pub const RUNNER_GRID_SIZE: i16 = 5;

// Coach constants
pub const COACH_REFRESH_SECONDS: u64 = 10;
pub const COACH_SLOW_RESPONSE_SECS: f64 = 5.0;
pub const COACH_LOW_ACCURACY_PERCENT: f64 = 70.0;
pub const COACH_WEAK_OPERATION_RATIO: f64 = 0.6;
pub const COACH_LOW_TIME: f64 = 25.0;

// Dashboard constants
pub const RECENT_GAMES_LIMIT: usize = 10;

// Persistence constants
pub const SAVE_VERSION: u32 = 1;
pub const DATA_DIR_NAME: &str = ".math-runner";
pub const DATA_DIR_ENV: &str = "MATH_RUNNER_HOME";
pub const CONFIG_FILENAME: &str = "config.json";
pub const LOG_FILENAME: &str = "math-runner.log";
