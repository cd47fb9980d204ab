//! Match constants shared by producer, validator, and guest.
//!
//! These are hardcoded on every side of the protocol and must match exactly:
//! changing one value changes the physics and therefore the meaning of every
//! existing log.

/// Board width (pixels)
pub const WIDTH: i32 = 800;

/// Board height (pixels)
pub const HEIGHT: i32 = 480;

/// Paddle height (pixels)
pub const PADDLE_HEIGHT: i32 = 80;

/// Paddle width (pixels)
pub const PADDLE_WIDTH: i32 = 10;

/// Paddle margin from the board edge (pixels)
pub const PADDLE_MARGIN: i32 = 16;

/// Ball radius (pixels)
pub const BALL_RADIUS: i32 = 6;

/// Maximum paddle speed (pixels/second)
pub const PADDLE_MAX_SPEED: i32 = 200;

/// Ball speed at serve (pixels/second)
pub const SERVE_SPEED: i32 = 500;

/// Ball speed gained per paddle bounce (pixels/second)
pub const SPEED_INCREMENT: i32 = 50;

/// Maximum rebound angle off a paddle (degrees)
pub const MAX_BOUNCE_ANGLE_DEG: i32 = 60;

/// Width of the serve-angle lattice in degrees (spans -60..=+60)
pub const ANGLE_RANGE: i32 = 121;

/// Multiplier mixing the serve index into the serve angle
pub const SERVE_ANGLE_MULTIPLIER: i32 = 37;

/// Points needed to win the match
pub const POINTS_TO_WIN: u32 = 3;

/// Initial serve direction: 1 = toward the right paddle, -1 = toward the left
pub const INITIAL_SERVE_DIRECTION: i32 = 1;

/// Maximum number of log entries (individual paddle positions, not pairs)
pub const MAX_EVENTS: u32 = 10000;

/// CompactLog schema version
pub const LOG_VERSION: u32 = 1;
